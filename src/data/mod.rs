mod source;
mod storage;

pub use {
    source::{ObservationSource, ReplaySource, ScriptedSource, ScriptedTick, SourceError},
    storage::{HistoryStore, MemoryStore, SqliteStore, StorageError},
};
