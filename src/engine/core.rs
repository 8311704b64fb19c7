use std::time::Duration;

use chrono::{Timelike, Utc};

use crate::data::{HistoryStore, ObservationSource};
use crate::domain::{LogEntry, ObservationKind, PredictionResult, RoundSample};
use crate::strategy::Strategy;

use super::dedup::RoundDeduplicator;

/// The per-process session: source, store, strategy and the in-memory view
/// of everything observed so far. One instance, one logical thread; the
/// store may be read concurrently by an external dashboard but is only ever
/// written from here.
pub struct WatcherEngine {
    source: Box<dyn ObservationSource>,
    store: Box<dyn HistoryStore>,
    strategy: Box<dyn Strategy>,
    dedup: RoundDeduplicator,

    /// Every finalized multiplier seen (or bootstrapped), oldest first.
    /// Authoritative for prediction even when persistence fails.
    history: Vec<f64>,
    samples: Vec<RoundSample>,

    /// The forecast for the round currently in flight, i.e. the one that
    /// gets written onto that round's row when it completes. Always computed
    /// from strictly earlier history.
    current_prediction: PredictionResult,
}

impl WatcherEngine {
    pub fn new(
        source: Box<dyn ObservationSource>,
        store: Box<dyn HistoryStore>,
        strategy: Box<dyn Strategy>,
    ) -> Self {
        Self {
            source,
            store,
            strategy,
            dedup: RoundDeduplicator::new(),
            history: Vec::new(),
            samples: Vec::new(),
            current_prediction: PredictionResult::none(),
        }
    }

    /// Pull persisted history into memory so prediction quality survives a
    /// restart. A store failure here degrades to an empty series with a
    /// warning; it never aborts start-up.
    pub async fn bootstrap(&mut self, current_hour: u32) {
        match self.store.load_result_samples(None).await {
            Ok(samples) => {
                self.history = samples.iter().map(|s| s.multiplier).collect();
                self.samples = samples;
                log::info!("Storage ready. History: {} rounds.", self.history.len());
            }
            Err(e) => {
                log::warn!("Could not load persisted history: {} (starting empty)", e);
            }
        }

        // Never re-emit the round we already know about
        self.dedup = RoundDeduplicator::seeded(self.history.last().copied());
        self.current_prediction = self
            .strategy
            .predict(&self.history, &self.samples, current_hour);
    }

    pub fn history(&self) -> &[f64] {
        &self.history
    }

    pub fn current_prediction(&self) -> &PredictionResult {
        &self.current_prediction
    }

    /// One polling iteration. Every failure inside is logged and swallowed;
    /// the loop must outlive any transient source or storage trouble.
    /// Returns the newly completed round value, if this tick produced one.
    pub async fn tick(&mut self, now_ms: i64, current_hour: u32) -> Option<f64> {
        let tail = match self.source.finalized_tail().await {
            Ok(tail) => tail,
            Err(e) => {
                log::warn!("Source read failed: {} (no data this tick)", e);
                Vec::new()
            }
        };

        let mut new_round = None;
        if let Some(value) = self.dedup.observe(&tail) {
            new_round = Some(value);
            self.record_round(value, now_ms, current_hour).await;
        }

        // The live value only drives the cash-out signal; it is never the
        // unit of record.
        match self.source.live_multiplier().await {
            Ok(Some(live)) => {
                if let Some(upper) = self.current_prediction.upper {
                    if live >= upper {
                        log::info!("SIGNAL: CASH OUT! {:.2}x (band top {:.2}x)", live, upper);
                    }
                }
            }
            Ok(None) => {}
            Err(e) => log::warn!("Live read failed: {}", e),
        }

        new_round
    }

    async fn record_round(&mut self, value: f64, now_ms: i64, current_hour: u32) {
        // The row carries the forecast made before this value was known.
        let entry = LogEntry {
            timestamp_ms: now_ms,
            multiplier: value,
            kind: ObservationKind::Result,
            prediction: self.current_prediction.next,
        };

        if let Err(e) = self.store.append(&entry).await {
            log::warn!(
                "Failed to persist round {:.2}x: {} (keeping in-memory series)",
                value,
                e
            );
        }

        // In-memory series stays authoritative either way
        self.history.push(value);
        self.samples.push(RoundSample {
            timestamp_ms: now_ms,
            multiplier: value,
        });

        // Roll the forecast forward for the next round
        self.current_prediction = self
            .strategy
            .predict(&self.history, &self.samples, current_hour);

        match self.current_prediction.next {
            Some(next) => log::info!(
                "ROUND: {:.2}x | NEXT: {:.2}x ({:.0}% confidence)",
                value,
                next,
                self.current_prediction.confidence
            ),
            None => log::info!("ROUND: {:.2}x | waiting for more history", value),
        }
    }

    /// The polling loop. Runs until the process dies; there is no other
    /// cancellation signal.
    pub async fn run(mut self, poll_interval: Duration) {
        let now = Utc::now();
        self.bootstrap(now.hour()).await;
        log::info!(
            "Watching for rounds (poll interval {:.1}s)...",
            poll_interval.as_secs_f64()
        );

        loop {
            let now = Utc::now();
            self.tick(now.timestamp_millis(), now.hour()).await;
            tokio::time::sleep(poll_interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StrategyKind;
    use crate::data::{MemoryStore, ScriptedSource, ScriptedTick, StorageError};
    use crate::strategy::build_strategy;
    use async_trait::async_trait;
    use std::sync::Arc;

    const HOUR: u32 = 12;

    fn engine_with(
        ticks: Vec<ScriptedTick>,
        store: Box<dyn HistoryStore>,
        kind: StrategyKind,
    ) -> WatcherEngine {
        WatcherEngine::new(
            Box::new(ScriptedSource::new(ticks)),
            store,
            build_strategy(kind, 1.5),
        )
    }

    #[tokio::test]
    async fn emits_one_event_per_actual_round() {
        let store = Arc::new(MemoryStore::new());
        let mut engine = WatcherEngine::new(
            Box::new(ScriptedSource::new(vec![
                ScriptedTick::Tail(vec![5.0, 3.0, 2.0]),
                ScriptedTick::Tail(vec![5.0, 3.0, 2.0]),
                ScriptedTick::Tail(vec![5.0, 3.0, 2.0, 4.5]),
            ])),
            Box::new(SharedStore(store.clone())),
            build_strategy(StrategyKind::Martingale, 1.5),
        );
        engine.bootstrap(HOUR).await;

        assert_eq!(engine.tick(1_000, HOUR).await, Some(2.0));
        assert_eq!(engine.tick(2_000, HOUR).await, None);
        assert_eq!(engine.tick(3_000, HOUR).await, Some(4.5));

        assert_eq!(
            store.load_result_history(None).await.unwrap(),
            vec![2.0, 4.5]
        );
    }

    #[tokio::test]
    async fn recorded_prediction_never_sees_its_own_round() {
        let store = Arc::new(MemoryStore::new());
        let rounds = [1.2, 1.5, 3.0, 1.1, 2.8, 1.9];
        let ticks: Vec<ScriptedTick> = (0..rounds.len())
            .map(|i| ScriptedTick::Tail(rounds[..=i].to_vec()))
            .collect();

        let mut engine = WatcherEngine::new(
            Box::new(ScriptedSource::new(ticks)),
            Box::new(SharedStore(store.clone())),
            build_strategy(StrategyKind::Statistical, 1.5),
        );
        engine.bootstrap(HOUR).await;

        for i in 0..rounds.len() {
            engine.tick(1_000 * (i as i64 + 1), HOUR).await;
        }

        let mut records = store.recent_records(10).await.unwrap();
        records.reverse(); // oldest first

        // Rounds 1..=5 complete while fewer than 5 rounds of history existed
        for record in &records[..5] {
            assert_eq!(record.prediction, None);
        }

        // Round 6's stored prediction was computed from exactly rounds 1..=5
        let strategy = build_strategy(StrategyKind::Statistical, 1.5);
        let samples: Vec<RoundSample> = (0..5)
            .map(|i| RoundSample {
                timestamp_ms: 1_000 * (i as i64 + 1),
                multiplier: rounds[i],
            })
            .collect();
        let expected = strategy.predict(&rounds[..5], &samples, HOUR);
        assert_eq!(records[5].prediction, expected.next);
        assert!(records[5].prediction.is_some());
    }

    #[tokio::test]
    async fn source_failure_skips_the_tick_without_dying() {
        let mut engine = engine_with(
            vec![
                ScriptedTick::Tail(vec![2.0]),
                ScriptedTick::Fail,
                ScriptedTick::Tail(vec![2.0, 3.5]),
            ],
            Box::new(MemoryStore::new()),
            StrategyKind::Martingale,
        );
        engine.bootstrap(HOUR).await;

        assert_eq!(engine.tick(1, HOUR).await, Some(2.0));
        assert_eq!(engine.tick(2, HOUR).await, None);
        assert_eq!(engine.tick(3, HOUR).await, Some(3.5));
        assert_eq!(engine.history(), &[2.0, 3.5]);
    }

    #[tokio::test]
    async fn storage_failure_keeps_in_memory_series_authoritative() {
        let mut engine = engine_with(
            vec![
                ScriptedTick::Tail(vec![1.4]),
                ScriptedTick::Tail(vec![1.4, 1.2]),
                ScriptedTick::Tail(vec![1.4, 1.2, 1.1]),
            ],
            Box::new(BrokenStore),
            StrategyKind::Martingale,
        );
        engine.bootstrap(HOUR).await;

        for i in 0..3 {
            engine.tick(i, HOUR).await;
        }

        // Nothing persisted, but prediction continuity is intact: three lows
        // in the window flip the martingale to its tight band.
        assert_eq!(engine.history(), &[1.4, 1.2, 1.1]);
        assert_eq!(engine.current_prediction().next, Some(1.25));
    }

    #[tokio::test]
    async fn bootstrap_does_not_re_emit_the_last_persisted_round() {
        let store = Arc::new(MemoryStore::new());
        store
            .append(&LogEntry {
                timestamp_ms: 500,
                multiplier: 2.2,
                kind: ObservationKind::Result,
                prediction: None,
            })
            .await
            .unwrap();

        let mut engine = WatcherEngine::new(
            Box::new(ScriptedSource::new(vec![
                ScriptedTick::Tail(vec![2.2]),
                ScriptedTick::Tail(vec![2.2, 6.1]),
            ])),
            Box::new(SharedStore(store.clone())),
            build_strategy(StrategyKind::Martingale, 1.5),
        );
        engine.bootstrap(HOUR).await;
        assert_eq!(engine.history(), &[2.2]);

        // The persisted round resurfaces in the tail: not a new event
        assert_eq!(engine.tick(1_000, HOUR).await, None);
        assert_eq!(engine.tick(2_000, HOUR).await, Some(6.1));
        assert_eq!(store.load_result_history(None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn live_reading_is_never_recorded() {
        let store = Arc::new(MemoryStore::new());
        let mut engine = WatcherEngine::new(
            Box::new(
                ScriptedSource::new(vec![ScriptedTick::Tail(vec![2.0])])
                    .with_lives(vec![Some(1.8)]),
            ),
            Box::new(SharedStore(store.clone())),
            build_strategy(StrategyKind::Martingale, 1.5),
        );
        engine.bootstrap(HOUR).await;
        engine.tick(1, HOUR).await;

        let records = store.recent_records(10).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].kind, ObservationKind::Result);
    }

    /// Delegating wrapper so tests can keep an Arc handle to a MemoryStore
    /// that the engine owns as a Box.
    struct SharedStore(Arc<MemoryStore>);

    #[async_trait]
    impl HistoryStore for SharedStore {
        async fn initialize(&self) -> Result<(), StorageError> {
            self.0.initialize().await
        }
        async fn append(&self, entry: &LogEntry) -> Result<i64, StorageError> {
            self.0.append(entry).await
        }
        async fn load_result_history(
            &self,
            limit: Option<u32>,
        ) -> Result<Vec<f64>, StorageError> {
            self.0.load_result_history(limit).await
        }
        async fn load_result_samples(
            &self,
            limit: Option<u32>,
        ) -> Result<Vec<RoundSample>, StorageError> {
            self.0.load_result_samples(limit).await
        }
        async fn recent_records(
            &self,
            limit: u32,
        ) -> Result<Vec<crate::domain::RoundRecord>, StorageError> {
            self.0.recent_records(limit).await
        }
    }

    /// A store whose every write fails, for the degraded-persistence path.
    struct BrokenStore;

    #[async_trait]
    impl HistoryStore for BrokenStore {
        async fn initialize(&self) -> Result<(), StorageError> {
            Ok(())
        }
        async fn append(&self, _entry: &LogEntry) -> Result<i64, StorageError> {
            Err(StorageError::Corrupt("disk on fire".to_string()))
        }
        async fn load_result_history(
            &self,
            _limit: Option<u32>,
        ) -> Result<Vec<f64>, StorageError> {
            Ok(Vec::new())
        }
        async fn load_result_samples(
            &self,
            _limit: Option<u32>,
        ) -> Result<Vec<RoundSample>, StorageError> {
            Ok(Vec::new())
        }
        async fn recent_records(
            &self,
            _limit: u32,
        ) -> Result<Vec<crate::domain::RoundRecord>, StorageError> {
            Ok(Vec::new())
        }
    }
}
