use crate::config::constants::martingale::{LOW_CUTOFF, LOW_TRIGGER, WINDOW};
use crate::domain::{PredictionResult, RoundSample};
use crate::strategy::Strategy;

/// Rule-based alternative to the statistical model: after a streak of low
/// rounds, bet tight and assume a correction is due; otherwise aim wider.
pub struct MartingaleStrategy;

fn fixed(lower: f64, upper: f64, confidence: f64, next: f64) -> PredictionResult {
    PredictionResult {
        lower: Some(lower),
        upper: Some(upper),
        confidence,
        next: Some(next),
    }
}

impl Strategy for MartingaleStrategy {
    fn predict(
        &self,
        history: &[f64],
        _samples: &[RoundSample],
        _current_hour: u32,
    ) -> PredictionResult {
        if history.is_empty() {
            return fixed(1.2, 2.0, 50.0, 1.5);
        }

        let window_start = history.len().saturating_sub(WINDOW);
        let recent_lows = history[window_start..]
            .iter()
            .filter(|&&x| x < LOW_CUTOFF)
            .count();

        if recent_lows >= LOW_TRIGGER {
            fixed(1.1, 1.4, 75.0, 1.25)
        } else {
            fixed(1.5, 3.0, 40.0, 2.1)
        }
    }
}
