#![allow(clippy::collapsible_if)]
#![allow(clippy::float_cmp)] // value-change detection compares multipliers bitwise

// Core modules
pub mod config;
pub mod data;
pub mod domain;
pub mod engine;
pub mod strategy;
pub mod utils;

// Re-export commonly used types outside of crate (for the binaries)
pub use config::{ConfigError, StrategyKind, WatcherConfig};
pub use data::{HistoryStore, MemoryStore, ObservationSource, ReplaySource, SqliteStore};
pub use domain::PredictionResult;
pub use engine::WatcherEngine;
pub use strategy::build_strategy;

// CLI argument parsing
use clap::Parser;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the JSON config file. Defaults apply when omitted.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override the configured strategy ("statistical" | "martingale")
    #[arg(long)]
    pub strategy: Option<String>,

    /// Override the statistical band width multiplier
    #[arg(long)]
    pub margin_factor: Option<f64>,

    /// Override the SQLite database path
    #[arg(long)]
    pub db: Option<String>,

    /// Replay feed: JSON array of recorded round multipliers
    #[arg(long)]
    pub feed: Option<PathBuf>,

    /// Override the poll interval in seconds
    #[arg(long)]
    pub poll_interval: Option<f64>,
}

impl Cli {
    /// Layer CLI overrides on top of the file config, then re-validate.
    pub fn apply(&self, config: &mut WatcherConfig) -> Result<(), ConfigError> {
        if let Some(raw) = &self.strategy {
            config.strategy = StrategyKind::from_str(raw).map_err(|_| {
                ConfigError::Invalid(format!(
                    "unknown strategy '{}' (expected 'statistical' or 'martingale')",
                    raw
                ))
            })?;
        }
        if let Some(margin_factor) = self.margin_factor {
            config.margin_factor = margin_factor;
        }
        if let Some(db) = &self.db {
            config.db_path = Some(db.clone());
        }
        if let Some(feed) = &self.feed {
            config.feed_path = Some(feed.display().to_string());
        }
        if let Some(poll_interval) = self.poll_interval {
            config.poll_interval_secs = poll_interval;
        }
        config.validate()
    }
}
