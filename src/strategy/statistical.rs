use chrono::{DateTime, Timelike};

use crate::config::constants::{MIN_MULTIPLIER, statistical::*};
use crate::domain::{PredictionResult, RoundSample};
use crate::strategy::Strategy;
use crate::utils::maths_utils::{ewma, mean, mean_and_stddev};

/// Blends a recency-weighted average with a short-term trend factor and an
/// hour-of-day factor, then derives a cash-out band from the global spread.
///
/// Deterministic: identical inputs (including `current_hour`) give
/// bit-identical output.
pub struct StatisticalStrategy {
    margin_factor: f64,
}

impl StatisticalStrategy {
    pub fn new(margin_factor: f64) -> Self {
        Self { margin_factor }
    }
}

fn sample_hour(timestamp_ms: i64) -> Option<u32> {
    DateTime::from_timestamp_millis(timestamp_ms).map(|dt| dt.hour())
}

impl Strategy for StatisticalStrategy {
    fn predict(
        &self,
        history: &[f64],
        samples: &[RoundSample],
        current_hour: u32,
    ) -> PredictionResult {
        // Never extrapolate from a handful of rounds.
        if history.len() < MIN_HISTORY {
            return PredictionResult::none();
        }

        let (global_mean, global_std) = mean_and_stddev(history);
        let ema = ewma(history, EMA_ALPHA).unwrap_or(global_mean);

        // Hour-of-day factor, only once this hour has enough samples to mean
        // anything.
        let mut hour_factor = 1.0;
        if global_mean > 0.0 {
            let hour_values: Vec<f64> = samples
                .iter()
                .filter(|s| sample_hour(s.timestamp_ms) == Some(current_hour))
                .map(|s| s.multiplier)
                .collect();
            if hour_values.len() >= HOUR_MIN_SAMPLES {
                hour_factor = mean(&hour_values) / global_mean;
            }
        }

        // Short-term trend against the global mean.
        let window = history.len().min(TREND_WINDOW);
        let recent_mean = mean(&history[history.len() - window..]);
        let trend_factor = if global_mean > 0.0 {
            recent_mean / global_mean
        } else {
            1.0
        };

        let next = ema * WEIGHT_EMA
            + global_mean * trend_factor * WEIGHT_TREND
            + global_mean * hour_factor * WEIGHT_HOUR;

        let margin = self.margin_factor * global_std * BAND_STD_SCALE;
        let lower = (next - margin).max(MIN_MULTIPLIER);
        let upper = next + margin;

        let volatility = if global_mean > 0.0 {
            global_std / global_mean
        } else {
            1.0
        };
        let confidence =
            (100.0 - volatility * VOLATILITY_PENALTY).clamp(CONFIDENCE_MIN, CONFIDENCE_MAX);

        PredictionResult {
            lower: Some(lower),
            upper: Some(upper),
            confidence,
            next: Some(next),
        }
    }
}
