//! # Statute Search Driver
//!
//! ## Purpose
//! Command-line entry point: loads configuration, restores the index from the
//! persistence cache (or rebuilds it from the corpus JSON), then answers a
//! single query, prints index statistics, or runs an interactive prompt.
//!
//! ## Architecture Flow
//! 1. Parse command line arguments and load configuration
//! 2. Initialize logging
//! 3. Restore the index from cache, falling back to a full rebuild
//! 4. Refresh the cache after a rebuild
//! 5. Serve the requested query mode

use anyhow::Context;
use clap::{Arg, ArgAction, Command};
use std::io::{BufRead, Write};
use tracing::{info, warn};

use statute_search::{
    Config, CorpusLoader, IndexCache, SearchEngine, SearchResult,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = Command::new("statute-search")
        .version("0.1.0")
        .author("Legal Search Team")
        .about("TF-IDF search over statute sections with exact and semantic lookup")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("config.toml"),
        )
        .arg(
            Arg::new("corpus")
                .long("corpus")
                .value_name("FILE")
                .help("Corpus JSON file, overriding the configured path"),
        )
        .arg(
            Arg::new("max-results")
                .short('n')
                .long("max-results")
                .value_name("N")
                .help("Maximum results per query")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("rebuild")
                .long("rebuild")
                .help("Ignore any cached index, rebuild from the corpus, refresh the cache")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("no-cache")
                .long("no-cache")
                .help("Run without the persistence cache entirely")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("stats")
                .long("stats")
                .help("Print index statistics and exit")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Emit results as JSON")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("query")
                .value_name("QUERY")
                .help("Free-text query or section number; omit for an interactive prompt")
                .num_args(0..)
                .trailing_var_arg(true),
        )
        .get_matches();

    let config_path = matches
        .get_one::<String>("config")
        .map(String::as_str)
        .unwrap_or("config.toml");
    let mut config = Config::from_file(config_path)?;
    if let Some(corpus) = matches.get_one::<String>("corpus") {
        config.corpus.path = corpus.into();
    }

    init_logging(&config)?;
    info!("starting statute-search v0.1.0");

    let engine = initialize_engine(
        &config,
        matches.get_flag("no-cache"),
        matches.get_flag("rebuild"),
    )
    .await?;

    let as_json = matches.get_flag("json");
    let max_results = matches
        .get_one::<usize>("max-results")
        .copied()
        .unwrap_or_else(|| engine.default_max_results());

    if matches.get_flag("stats") {
        let stats = engine.stats();
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    let query: Vec<String> = matches
        .get_many::<String>("query")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();

    if query.is_empty() {
        run_prompt(&engine, max_results, as_json)
    } else {
        let results = engine.search(&query.join(" "), max_results)?;
        print_results(&results, as_json)?;
        Ok(())
    }
}

/// Initialize logging from configuration
fn init_logging(config: &Config) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if config.logging.json_format {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}

/// Build the engine from cache or corpus.
///
/// Cache trouble is never fatal: an unavailable or corrupt cache is logged
/// and the engine rebuilds from the corpus, refreshing the cache afterwards.
async fn initialize_engine(
    config: &Config,
    no_cache: bool,
    force_rebuild: bool,
) -> anyhow::Result<SearchEngine> {
    let engine = SearchEngine::new(config)?;

    let cache = if config.cache.enabled && !no_cache {
        match IndexCache::open(&config.cache) {
            Ok(cache) => Some(cache),
            Err(e) => {
                warn!(category = e.category(), "index cache disabled: {}", e);
                None
            }
        }
    } else {
        None
    };

    if !force_rebuild {
        if let Some(cache) = &cache {
            match cache.load() {
                Ok(Some(snapshot)) => match engine.restore(snapshot) {
                    Ok(stats) => {
                        info!(
                            documents = stats.total_documents,
                            vocabulary = stats.vocabulary_size,
                            "index restored from cache"
                        );
                        return Ok(engine);
                    }
                    Err(e) => warn!(category = e.category(), "cached snapshot rejected: {}", e),
                },
                Ok(None) => info!("no cached index, building from corpus"),
                Err(e) => warn!(category = e.category(), "cache load failed: {}", e),
            }
        }
    }

    let documents = CorpusLoader::load_from_file(&config.corpus.path)
        .with_context(|| format!("loading corpus from {:?}", config.corpus.path))?;
    let stats = engine
        .rebuild(documents)
        .await
        .context("building search index")?;
    info!(
        documents = stats.total_documents,
        vocabulary = stats.vocabulary_size,
        "index built from corpus"
    );

    if let Some(cache) = &cache {
        match engine.snapshot().and_then(|snapshot| cache.save(&snapshot)) {
            Ok(()) => info!("index cache refreshed"),
            Err(e) => warn!(category = e.category(), "cache refresh failed: {}", e),
        }
    }

    Ok(engine)
}

/// Interactive query prompt over stdin
fn run_prompt(engine: &SearchEngine, max_results: usize, as_json: bool) -> anyhow::Result<()> {
    let stats = engine.stats();
    println!(
        "{} sections across {} acts indexed. Enter a query (blank line to exit).",
        stats.total_documents,
        stats.acts_covered.len()
    );

    let stdin = std::io::stdin();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let query = line.trim();
        if query.is_empty() {
            break;
        }

        let results = engine.search(query, max_results)?;
        print_results(&results, as_json)?;
    }
    Ok(())
}

/// Print a result list as text lines or JSON
fn print_results(results: &[SearchResult], as_json: bool) -> anyhow::Result<()> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(results)?);
        return Ok(());
    }

    if results.is_empty() {
        println!("no matches");
        return Ok(());
    }
    for result in results {
        println!(
            "{:>2}. [{}] {:.3}  {} s.{} — {}",
            result.rank,
            match result.match_type {
                statute_search::MatchType::Exact => "exact",
                statute_search::MatchType::Semantic => "semantic",
                statute_search::MatchType::Keyword => "keyword",
            },
            result.score,
            result.document.act_name,
            result.document.section_number,
            result.document.title,
        );
        if let Some(penalty) = &result.document.penalty_text {
            println!("      punishment: {}", penalty);
        }
    }
    Ok(())
}
