//! Forecasting strategies.
//!
//! A strategy is a pure function of the observed result history (plus the
//! timestamped sample table and the current UTC hour, both passed in
//! explicitly so nothing reads a global clock). The active strategy is
//! chosen once at start-up and never swapped.

mod martingale;
mod statistical;

pub use martingale::MartingaleStrategy;
pub use statistical::StatisticalStrategy;

use crate::config::StrategyKind;
use crate::domain::{PredictionResult, RoundSample};

pub trait Strategy: Send + Sync {
    /// Forecast the next round from past results.
    ///
    /// `history` is every finalized multiplier oldest-first; `samples` is
    /// the timestamped version of the same series; `current_hour` is the
    /// UTC hour of day (0..=23) at prediction time.
    fn predict(
        &self,
        history: &[f64],
        samples: &[RoundSample],
        current_hour: u32,
    ) -> PredictionResult;
}

/// Resolve the configured strategy once, at construction time.
pub fn build_strategy(kind: StrategyKind, margin_factor: f64) -> Box<dyn Strategy> {
    match kind {
        StrategyKind::Statistical => Box::new(StatisticalStrategy::new(margin_factor)),
        StrategyKind::Martingale => Box::new(MartingaleStrategy),
    }
}
