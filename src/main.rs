use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;

use jetx_watcher::data::HistoryStore;
use jetx_watcher::{Cli, MemoryStore, ReplaySource, SqliteStore, WatcherConfig, WatcherEngine, build_strategy};

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Setup Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // 2. Configuration. Config problems are the only fatal errors; past
    // this point everything degrades and retries.
    let args = Cli::parse();
    let mut config = match &args.config {
        Some(path) => WatcherConfig::load(path)
            .with_context(|| format!("loading config '{}'", path.display()))?,
        None => WatcherConfig::default(),
    };
    args.apply(&mut config)?;

    log::info!(
        "Strategy: {} (margin factor {})",
        config.strategy,
        config.margin_factor
    );

    // 3. Storage. An unreachable database is not fatal: run with the
    // in-memory store and keep predicting.
    let store: Box<dyn HistoryStore> = match &config.db_path {
        Some(path) => match SqliteStore::new(path).await {
            Ok(store) => {
                log::info!("SQLite ready: {}", path);
                Box::new(store)
            }
            Err(e) => {
                log::warn!("Cannot open database '{}': {}", path, e);
                log::warn!("Running without persistence.");
                Box::new(MemoryStore::new())
            }
        },
        None => {
            log::warn!("No database configured. Running without persistence.");
            Box::new(MemoryStore::new())
        }
    };

    // 4. Observation source. The live scraper is external; this binary
    // replays a recorded feed through the same boundary.
    let feed_path = config
        .feed_path
        .clone()
        .context("no observation feed configured: pass --feed or set feed_path in the config")?;
    let source = ReplaySource::from_file(Path::new(&feed_path))
        .with_context(|| format!("opening feed '{}'", feed_path))?;
    log::info!("Replaying {} recorded rounds from {}", source.len(), feed_path);

    // 5. Run until killed
    let strategy = build_strategy(config.strategy, config.margin_factor);
    let engine = WatcherEngine::new(Box::new(source), store, strategy);
    engine.run(config.poll_interval()).await;

    Ok(())
}
