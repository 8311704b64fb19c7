//! Runtime configuration for the watcher process.

use serde::{Deserialize, Serialize};
use std::path::Path;
use strum_macros::{Display, EnumString};
use thiserror::Error;

use crate::config::constants;

/// Which forecasting strategy the process runs with.
/// Picked once at start-up, fixed for the process lifetime.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    #[default]
    Statistical,
    Martingale,
}

/// Start-up configuration errors. These are the only errors allowed to
/// abort the process; everything past start-up degrades instead.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file '{path}': {source}")]
    Unreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed config: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Deserialized contents of the config file. Every field has a default so a
/// missing file (no `--config` given) still yields a runnable process.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WatcherConfig {
    pub strategy: StrategyKind,

    /// Width multiplier for the statistical cash-out band.
    pub margin_factor: f64,

    /// Seconds between polling ticks.
    pub poll_interval_secs: f64,

    /// SQLite database path. None runs the in-memory degraded mode.
    pub db_path: Option<String>,

    /// JSON file of recorded round multipliers for the replay source.
    pub feed_path: Option<String>,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::Statistical,
            margin_factor: constants::statistical::DEFAULT_MARGIN_FACTOR,
            poll_interval_secs: constants::DEFAULT_POLL_INTERVAL.as_secs_f64(),
            db_path: Some("jetx_logs.sqlite".to_string()),
            feed_path: None,
        }
    }
}

impl WatcherConfig {
    /// Load and validate a config file. A file that exists but cannot be
    /// read or parsed is fatal; we never start half-configured.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
            path: path.display().to_string(),
            source,
        })?;

        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.margin_factor.is_finite() && self.margin_factor > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "margin_factor must be a positive number, got {}",
                self.margin_factor
            )));
        }
        if !(self.poll_interval_secs.is_finite() && self.poll_interval_secs > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "poll_interval_secs must be a positive number, got {}",
                self.poll_interval_secs
            )));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f64(self.poll_interval_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn strategy_kind_parses_config_strings() {
        assert_eq!(
            StrategyKind::from_str("statistical").unwrap(),
            StrategyKind::Statistical
        );
        assert_eq!(
            StrategyKind::from_str("martingale").unwrap(),
            StrategyKind::Martingale
        );
        assert!(StrategyKind::from_str("fibonacci").is_err());
    }

    #[test]
    fn default_config_is_valid() {
        assert!(WatcherConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_non_positive_margin_factor() {
        let config = WatcherConfig {
            margin_factor: 0.0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_non_positive_poll_interval() {
        let config = WatcherConfig {
            poll_interval_secs: -1.0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn parses_partial_json() {
        let config: WatcherConfig =
            serde_json::from_str(r#"{ "strategy": "martingale", "margin_factor": 2.0 }"#).unwrap();
        assert_eq!(config.strategy, StrategyKind::Martingale);
        assert_eq!(config.margin_factor, 2.0);
        // Untouched fields keep their defaults
        assert_eq!(config.poll_interval_secs, 3.0);
    }
}
