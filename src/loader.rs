//! # Corpus Loader Module
//!
//! ## Purpose
//! Parses corpus JSON into normalized [`Document`]s. Source records are
//! loosely shaped (`text` vs `definition`, `example_case` vs `example`,
//! sometimes no act name); all of that is collapsed here, exactly once, so
//! nothing downstream needs fallback chains at query time.
//!
//! ## Input/Output Specification
//! - **Input**: JSON array of section records (one combined corpus file, or
//!   one file per act with a default act name)
//! - **Output**: Ordered `Vec<Document>` in file order
//! - **Failure**: Unreadable/unparsable files error; individual records
//!   without a section number are skipped with a warning

use crate::errors::{Result, SearchError};
use crate::Document;
use serde::Deserialize;
use std::path::Path;

/// Loads and normalizes corpus files
pub struct CorpusLoader;

/// A section record as it appears on disk, before normalization
#[derive(Debug, Deserialize)]
struct RawSection {
    #[serde(default)]
    section_number: Option<String>,
    /// Some data files label the section number just "section"
    #[serde(default)]
    section: Option<String>,
    #[serde(default)]
    act_name: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    definition: Option<String>,
    #[serde(default)]
    punishment: Option<String>,
    #[serde(default)]
    example_case: Option<String>,
    #[serde(default)]
    example: Option<String>,
}

impl CorpusLoader {
    /// Load a combined corpus file whose records each carry an act name
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Vec<Document>> {
        Self::load_act_file(path, None)
    }

    /// Load a per-act data file, applying `default_act` to records that do
    /// not name their act
    pub fn load_act_file<P: AsRef<Path>>(
        path: P,
        default_act: Option<&str>,
    ) -> Result<Vec<Document>> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let documents = Self::from_json_str(&content, &path.display().to_string(), default_act)?;
        tracing::info!(
            file = %path.display(),
            documents = documents.len(),
            "corpus file loaded"
        );
        Ok(documents)
    }

    /// Parse corpus JSON from a string
    pub fn from_json_str(
        json: &str,
        source_name: &str,
        default_act: Option<&str>,
    ) -> Result<Vec<Document>> {
        let raw: Vec<RawSection> =
            serde_json::from_str(json).map_err(|e| SearchError::CorpusParsing {
                file: source_name.to_string(),
                details: e.to_string(),
            })?;

        let mut documents = Vec::with_capacity(raw.len());
        for (position, record) in raw.into_iter().enumerate() {
            match normalize(record, default_act) {
                Some(document) => documents.push(document),
                None => {
                    tracing::warn!(
                        file = source_name,
                        position,
                        "skipping record without a section number"
                    );
                }
            }
        }

        if documents.is_empty() {
            tracing::warn!(file = source_name, "corpus file produced no documents");
        }
        Ok(documents)
    }
}

/// Collapse a raw record into a normalized document.
///
/// `text`/`definition` merge into `body_text`, `example_case`/`example` into
/// `example_text`; empty strings become `None`. Returns `None` when the
/// record has no usable section number.
fn normalize(raw: RawSection, default_act: Option<&str>) -> Option<Document> {
    let section_number = non_empty(raw.section_number.or(raw.section))?;
    let act_name = non_empty(raw.act_name)
        .or_else(|| default_act.map(str::to_string))
        .unwrap_or_else(|| "Unknown Act".to_string());

    Some(Document {
        id: format!("{}-{}", act_name, section_number),
        section_number,
        act_name,
        title: non_empty(raw.title).unwrap_or_default(),
        body_text: non_empty(raw.text).or_else(|| non_empty(raw.definition)),
        penalty_text: non_empty(raw.punishment),
        example_text: non_empty(raw.example_case).or_else(|| non_empty(raw.example)),
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_field_aliases_once_at_ingestion() {
        let json = r#"[
            {
                "section_number": "420",
                "act_name": "IPC",
                "title": "Cheating",
                "definition": "cheating dishonestly inducing delivery of property",
                "punishment": "imprisonment up to seven years",
                "example": "inducing delivery of a cheque by deception"
            }
        ]"#;
        let documents = CorpusLoader::from_json_str(json, "test.json", None).unwrap();
        assert_eq!(documents.len(), 1);

        let doc = &documents[0];
        assert_eq!(doc.id, "IPC-420");
        assert_eq!(
            doc.body_text.as_deref(),
            Some("cheating dishonestly inducing delivery of property")
        );
        assert_eq!(
            doc.example_text.as_deref(),
            Some("inducing delivery of a cheque by deception")
        );
        assert_eq!(doc.penalty_text.as_deref(), Some("imprisonment up to seven years"));
    }

    #[test]
    fn text_wins_over_definition_and_example_case_over_example() {
        let json = r#"[
            {
                "section": "66A",
                "title": "Offensive messages",
                "text": "primary text",
                "definition": "secondary definition",
                "example_case": "primary example",
                "example": "secondary example"
            }
        ]"#;
        let documents =
            CorpusLoader::from_json_str(json, "it_act.json", Some("Information Technology Act, 2000"))
                .unwrap();
        let doc = &documents[0];
        assert_eq!(doc.section_number, "66A");
        assert_eq!(doc.act_name, "Information Technology Act, 2000");
        assert_eq!(doc.body_text.as_deref(), Some("primary text"));
        assert_eq!(doc.example_text.as_deref(), Some("primary example"));
    }

    #[test]
    fn records_without_section_number_are_skipped() {
        let json = r#"[
            { "title": "Orphan record" },
            { "section_number": "302", "act_name": "IPC", "title": "Murder" }
        ]"#;
        let documents = CorpusLoader::from_json_str(json, "ipc.json", None).unwrap();
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].section_number, "302");
    }

    #[test]
    fn empty_strings_normalize_to_none() {
        let json = r#"[
            { "section_number": "1", "act_name": "IPC", "title": "Short title", "punishment": "  " }
        ]"#;
        let documents = CorpusLoader::from_json_str(json, "ipc.json", None).unwrap();
        assert_eq!(documents[0].penalty_text, None);
    }

    #[test]
    fn malformed_json_maps_to_corpus_parsing_error() {
        let err = CorpusLoader::from_json_str("{not json", "broken.json", None).unwrap_err();
        assert!(matches!(err, SearchError::CorpusParsing { .. }));
        assert_eq!(err.category(), "corpus");
    }
}
