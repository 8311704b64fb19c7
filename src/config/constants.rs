use std::time::Duration;

// Top Level Constants
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Domain floor: a round can never pay out below 1.0x.
pub const MIN_MULTIPLIER: f64 = 1.0;

/// Tuning knobs for the statistical strategy.
pub mod statistical {
    /// Below this many observed rounds the strategy refuses to predict.
    pub const MIN_HISTORY: usize = 5;

    /// Smoothing factor for the recency-weighted average.
    pub const EMA_ALPHA: f64 = 0.1;

    /// Short-term trend looks at the last min(TREND_WINDOW, n) rounds.
    pub const TREND_WINDOW: usize = 10;

    /// Hour-of-day factor only kicks in with this many samples in the hour.
    pub const HOUR_MIN_SAMPLES: usize = 10;

    // Blend weights for the point forecast. Must sum to 1.
    pub const WEIGHT_EMA: f64 = 0.7;
    pub const WEIGHT_TREND: f64 = 0.2;
    pub const WEIGHT_HOUR: f64 = 0.1;

    /// Fraction of sigma contributing to each side of the cash-out band,
    /// before the user-tunable margin factor is applied.
    pub const BAND_STD_SCALE: f64 = 0.4;
    pub const DEFAULT_MARGIN_FACTOR: f64 = 1.5;

    /// Confidence drops by this much per unit of relative volatility.
    pub const VOLATILITY_PENALTY: f64 = 45.0;
    pub const CONFIDENCE_MIN: f64 = 10.0;
    pub const CONFIDENCE_MAX: f64 = 95.0;
}

/// Tuning knobs for the martingale strategy.
pub mod martingale {
    /// A round below this is a "low" round.
    pub const LOW_CUTOFF: f64 = 1.5;

    /// How many trailing rounds the low-streak count looks at.
    pub const WINDOW: usize = 5;

    /// Low rounds in the window needed to call a correction "due".
    pub const LOW_TRIGGER: usize = 3;
}
