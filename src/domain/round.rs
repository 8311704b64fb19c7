use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// What a single reading from the observation source represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ObservationKind {
    /// In-flight multiplier, still climbing. Ephemeral, never the unit of record.
    Live,
    /// Finalized round value.
    Result,
}

/// One raw reading from the observation source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub multiplier: f64,
    pub kind: ObservationKind,
}

/// A row of `jetx_logs` as read back from storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundRecord {
    pub id: i64,
    /// UTC unix milliseconds.
    pub timestamp_ms: i64,
    pub multiplier: f64,
    pub kind: ObservationKind,
    /// The forecast made for this round from strictly earlier history.
    /// Never a forecast that saw this round's own value.
    pub prediction: Option<f64>,
}

/// A row of `jetx_logs` ready to be inserted (no id yet).
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp_ms: i64,
    pub multiplier: f64,
    pub kind: ObservationKind,
    pub prediction: Option<f64>,
}

/// Timestamped result multiplier. Input to the hour-of-day analysis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundSample {
    pub timestamp_ms: i64,
    pub multiplier: f64,
}

/// Forecast for the next round.
///
/// `lower`/`upper` form the suggested cash-out band, `next` is the point
/// estimate. All three are None (and confidence 0) when a strategy declines
/// to predict.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredictionResult {
    pub lower: Option<f64>,
    pub upper: Option<f64>,
    /// Percent. 10..=95 for a real forecast, exactly 0 for the sentinel.
    pub confidence: f64,
    pub next: Option<f64>,
}

impl PredictionResult {
    /// The "not enough history" sentinel.
    pub const fn none() -> Self {
        Self {
            lower: None,
            upper: None,
            confidence: 0.0,
            next: None,
        }
    }

    pub fn is_none(&self) -> bool {
        self.next.is_none()
    }
}

impl Default for PredictionResult {
    fn default() -> Self {
        Self::none()
    }
}
