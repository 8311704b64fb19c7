// Domain types and value objects
mod round;

// Re-export commonly used types to the world
pub use round::{
    LogEntry, Observation, ObservationKind, PredictionResult, RoundRecord, RoundSample,
};
