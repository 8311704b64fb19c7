mod core;
mod dedup;

pub use core::WatcherEngine;
pub use dedup::RoundDeduplicator;
