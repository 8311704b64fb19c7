use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::Path;
use thiserror::Error;

/// How many finalized rounds the replay source exposes in its tail,
/// mimicking the visible history strip of the real game.
const TAIL_WINDOW: usize = 10;

/// Transient observation failures. The engine logs and treats these as
/// "no data this tick"; they never terminate the loop.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("observation source unavailable: {0}")]
    Unavailable(String),
    #[error("unreadable feed file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed feed: {0}")]
    Malformed(String),
}

/// The boundary to whatever is watching the game.
///
/// The real observer is a browser-automation scraper and lives outside this
/// crate; the core only ever sees these two reads. Both may fail or come
/// back empty on any given tick.
#[async_trait]
pub trait ObservationSource: Send {
    /// The in-flight multiplier, if a round is currently running.
    async fn live_multiplier(&mut self) -> Result<Option<f64>, SourceError>;

    /// Recently finalized round values, most-recent-last.
    async fn finalized_tail(&mut self) -> Result<Vec<f64>, SourceError>;
}

/// Replays a recorded JSON array of round multipliers, surfacing one new
/// finalized round per tick. Once the recording runs out it keeps returning
/// the same tail, which the deduplicator reads as "no new information".
pub struct ReplaySource {
    rounds: Vec<f64>,
    cursor: usize,
}

impl ReplaySource {
    pub fn from_file(path: &Path) -> Result<Self, SourceError> {
        let raw = std::fs::read_to_string(path).map_err(|source| SourceError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let rounds: Vec<f64> =
            serde_json::from_str(&raw).map_err(|e| SourceError::Malformed(e.to_string()))?;

        for &value in &rounds {
            if !value.is_finite() || value < 1.0 {
                return Err(SourceError::Malformed(format!(
                    "round multiplier {} is below the domain floor of 1.0",
                    value
                )));
            }
        }

        Ok(Self { rounds, cursor: 0 })
    }

    pub fn len(&self) -> usize {
        self.rounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }
}

#[async_trait]
impl ObservationSource for ReplaySource {
    async fn live_multiplier(&mut self) -> Result<Option<f64>, SourceError> {
        // Recordings only carry finalized rounds.
        Ok(None)
    }

    async fn finalized_tail(&mut self) -> Result<Vec<f64>, SourceError> {
        if self.cursor < self.rounds.len() {
            self.cursor += 1;
        }

        let start = self.cursor.saturating_sub(TAIL_WINDOW);
        Ok(self.rounds[start..self.cursor].to_vec())
    }
}

/// What a [`ScriptedSource`] serves on one tick.
#[derive(Debug, Clone)]
pub enum ScriptedTick {
    Tail(Vec<f64>),
    Fail,
}

/// Deterministic source fed from a fixed script. Used by the engine tests;
/// exhausting the script yields empty reads.
#[derive(Default)]
pub struct ScriptedSource {
    ticks: VecDeque<ScriptedTick>,
    lives: VecDeque<Option<f64>>,
}

impl ScriptedSource {
    pub fn new(ticks: Vec<ScriptedTick>) -> Self {
        Self {
            ticks: ticks.into(),
            lives: VecDeque::new(),
        }
    }

    pub fn with_lives(mut self, lives: Vec<Option<f64>>) -> Self {
        self.lives = lives.into();
        self
    }
}

#[async_trait]
impl ObservationSource for ScriptedSource {
    async fn live_multiplier(&mut self) -> Result<Option<f64>, SourceError> {
        Ok(self.lives.pop_front().flatten())
    }

    async fn finalized_tail(&mut self) -> Result<Vec<f64>, SourceError> {
        match self.ticks.pop_front() {
            Some(ScriptedTick::Tail(tail)) => Ok(tail),
            Some(ScriptedTick::Fail) => {
                Err(SourceError::Unavailable("scripted failure".to_string()))
            }
            None => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replay_surfaces_one_round_per_tick() {
        let mut source = ReplaySource {
            rounds: vec![1.5, 2.0, 4.2],
            cursor: 0,
        };

        assert_eq!(source.finalized_tail().await.unwrap(), vec![1.5]);
        assert_eq!(source.finalized_tail().await.unwrap(), vec![1.5, 2.0]);
        assert_eq!(source.finalized_tail().await.unwrap(), vec![1.5, 2.0, 4.2]);
        // Exhausted: same tail again, i.e. no new information
        assert_eq!(source.finalized_tail().await.unwrap(), vec![1.5, 2.0, 4.2]);
    }

    #[tokio::test]
    async fn replay_tail_is_windowed() {
        let rounds: Vec<f64> = (0..25).map(|i| 1.0 + i as f64).collect();
        let mut source = ReplaySource { rounds, cursor: 0 };

        let mut tail = Vec::new();
        for _ in 0..25 {
            tail = source.finalized_tail().await.unwrap();
        }
        assert_eq!(tail.len(), TAIL_WINDOW);
        assert_eq!(*tail.last().unwrap(), 25.0);
    }

    #[tokio::test]
    async fn scripted_source_fails_on_cue() {
        let mut source = ScriptedSource::new(vec![
            ScriptedTick::Tail(vec![2.0]),
            ScriptedTick::Fail,
        ]);

        assert!(source.finalized_tail().await.is_ok());
        assert!(matches!(
            source.finalized_tail().await,
            Err(SourceError::Unavailable(_))
        ));
        // Script exhausted: empty, not an error
        assert!(source.finalized_tail().await.unwrap().is_empty());
    }
}
