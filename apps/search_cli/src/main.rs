use std::{path::PathBuf, sync::Arc};

use anyhow::Result;
use clap::Parser;
use futures::StreamExt;
use screen_core::{
    memory::{FixedQuery, FlagLedger, InMemoryCatalog, SelectedMovieSlot},
    MovieListController, ScreenDependencies,
};
use shared::domain::MovieId;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;

use config::{load_catalog, load_settings, DEFAULT_CONFIG_PATH};

#[derive(Parser, Debug)]
#[command(about = "Runs the movie list screen against a local JSON catalog")]
struct Args {
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    #[arg(long)]
    catalog: Option<PathBuf>,
    #[arg(long)]
    query: Option<String>,
    #[arg(long = "watch-later")]
    watch_later: Vec<String>,
    #[arg(long)]
    watched: Vec<String>,
    #[arg(long)]
    unwatch: Vec<String>,
    #[arg(long)]
    details: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut settings = load_settings(&args.config)?;
    if let Some(catalog) = args.catalog.clone() {
        settings.catalog_path = catalog;
    }
    if let Some(query) = args.query.clone() {
        settings.query = query;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.log_filter.as_str()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let records = load_catalog(&settings.catalog_path)?;
    info!(
        catalog = %settings.catalog_path.display(),
        records = records.len(),
        query = %settings.query,
        "movie catalog loaded"
    );

    let ledger = FlagLedger::new();
    let selected = SelectedMovieSlot::new();
    let screen = MovieListController::start(ScreenDependencies {
        search: Arc::new(InMemoryCatalog::new(records).with_ledger(ledger.clone())),
        watch_later: Arc::new(ledger.watch_later_mutator()),
        watched: Arc::new(ledger.watched_mutator()),
        query: Arc::new(FixedQuery::new(settings.query.clone())),
        id_sink: Arc::new(selected.clone()),
    })?;

    let mut states = screen.observe();
    let printer = tokio::spawn(async move {
        while let Some(state) = states.next().await {
            match serde_json::to_string(&state) {
                Ok(line) => println!("{line}"),
                Err(err) => tracing::error!(error = %err, "failed to encode screen state"),
            }
        }
    });

    screen.search_finished().await;

    for id in &args.watch_later {
        screen.toggle_watch_later(&MovieId::from(id.as_str()), true);
    }
    for id in &args.watched {
        screen.toggle_watched(&MovieId::from(id.as_str()), true);
    }
    for id in &args.unwatch {
        screen.toggle_watched(&MovieId::from(id.as_str()), false);
    }
    if let Some(id) = &args.details {
        screen.go_to_details(&MovieId::from(id.as_str()));
    }

    if let Some(id) = selected.selected() {
        eprintln!("selected movie: {id}");
    }

    screen.teardown();
    printer.await?;
    Ok(())
}
