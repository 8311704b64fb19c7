//! Configuration module for the watcher application.

// Can be private because we have a public re-export.
mod types;

// Public
pub mod constants;

// Re-export commonly used items
pub use types::{ConfigError, StrategyKind, WatcherConfig};
