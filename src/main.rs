//! StreamSeek command-line entry point
//!
//! Thin collaborator around the core: wires settings, transport,
//! providers, aggregator, and orchestrator, then runs a one-shot
//! search or trending listing and prints the outcome.

use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use streamseek::{
    cache::ResponseCache,
    config::Settings,
    providers::{TmdbProvider, WatchmodeProvider},
    results::Movie,
    search::{HistoryStore, MovieAggregator, SearchOrchestrator},
    suggest,
    transport::ApiClient,
};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        print_usage();
        return Ok(());
    }

    info!("StreamSeek v{}", streamseek::VERSION);

    let settings = load_settings()?;

    let client = ApiClient::with_settings(&settings.transport)?;
    let watchmode = WatchmodeProvider::new(client.clone(), &settings.providers.watchmode);
    let tmdb = TmdbProvider::new(client, &settings.providers.tmdb);
    let aggregator = Arc::new(MovieAggregator::new(
        watchmode,
        tmdb,
        ResponseCache::new(&settings.cache),
    ));

    if let Some(position) = args.iter().position(|a| a == "--trending") {
        let page = args
            .get(position + 1)
            .and_then(|p| p.parse().ok())
            .unwrap_or(1);
        match aggregator.trending(page).await {
            Ok(result) => print_movies(&result.movies),
            Err(err) => eprintln!("trending failed: {}", err),
        }
        return Ok(());
    }

    let query = args.join(" ");
    if query.trim().is_empty() {
        print_usage();
        return Ok(());
    }

    let history = HistoryStore::load(
        settings.history.resolved_path(),
        settings.history.max_entries,
    );
    let orchestrator = SearchOrchestrator::new(aggregator, history, &settings.search);

    let suggestions = suggest::suggest(&query);
    if !suggestions.is_empty() {
        println!("Suggestions: {}", suggestions.join(" | "));
    }

    orchestrator.submit(&query).await;

    let snapshot = orchestrator.snapshot();
    if let Some(err) = snapshot.error {
        eprintln!("search failed: {}", err);
    } else if let Some(result) = snapshot.results {
        println!(
            "{} results (page {} of {}):",
            result.total_results, result.page, result.total_pages
        );
        print_movies(&result.movies);
    }

    Ok(())
}

fn print_movies(movies: &[Movie]) {
    for movie in movies {
        let sources = movie
            .streaming_sources
            .iter()
            .map(|s| s.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        println!(
            "  {} ({})  rating {:.1}  [{}]",
            movie.title,
            movie.year,
            movie.rating,
            if sources.is_empty() { "no sources" } else { sources.as_str() }
        );
    }
}

/// Load settings from file or use defaults
fn load_settings() -> Result<Settings> {
    if let Ok(path) = std::env::var("STREAMSEEK_SETTINGS_PATH") {
        let path = PathBuf::from(path);
        if path.exists() {
            info!("Loading settings from: {}", path.display());
            let mut settings = Settings::from_file(&path)?;
            settings.merge_env();
            return Ok(settings);
        }
    }

    let paths = [
        PathBuf::from("settings.yml"),
        PathBuf::from("config/settings.yml"),
        dirs::config_dir()
            .map(|p| p.join("streamseek/settings.yml"))
            .unwrap_or_default(),
    ];

    for path in paths.iter() {
        if path.exists() {
            info!("Loading settings from: {}", path.display());
            let mut settings = Settings::from_file(path)?;
            settings.merge_env();
            return Ok(settings);
        }
    }

    info!("No settings file found, using defaults");
    let mut settings = Settings::default();
    settings.merge_env();
    Ok(settings)
}

fn print_usage() {
    println!(
        r#"
StreamSeek v{}
Search movies across a title/availability provider and a metadata provider

USAGE:
    streamseek <QUERY>...
    streamseek --trending [PAGE]

ENVIRONMENT VARIABLES:
    STREAMSEEK_SETTINGS_PATH  Path to settings.yml
    WATCHMODE_API_KEY         Availability provider API key
    TMDB_API_KEY              Metadata provider API key
    STREAMSEEK_HISTORY_PATH   Search history file location
"#,
        streamseek::VERSION
    );
}
