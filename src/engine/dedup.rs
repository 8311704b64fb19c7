/// Collapses the source's re-sampled view of "the most recent finalized
/// rounds" into discrete round-completion events, one per actual round.
///
/// Value change is the only event signal: the source exposes no reliable
/// round id, so two consecutive rounds finishing on the same multiplier are
/// coalesced into one event. Known limitation, left as-is on purpose.
#[derive(Debug, Default)]
pub struct RoundDeduplicator {
    last_emitted: Option<f64>,
}

impl RoundDeduplicator {
    pub fn new() -> Self {
        Self { last_emitted: None }
    }

    /// Start from a known last round, e.g. the newest value of persisted
    /// history, so a process restart does not re-emit it.
    pub fn seeded(last_emitted: Option<f64>) -> Self {
        Self { last_emitted }
    }

    /// Feed one sampled tail (finalized values, most-recent-last). Returns
    /// the newly completed round value, or None when the tail is empty or
    /// carries nothing new. An empty or repeated read is not an error, just
    /// "no new information this tick".
    pub fn observe(&mut self, tail: &[f64]) -> Option<f64> {
        let newest = *tail.last()?;
        if self.last_emitted == Some(newest) {
            return None;
        }
        self.last_emitted = Some(newest);
        Some(newest)
    }

    pub fn last_emitted(&self) -> Option<f64> {
        self.last_emitted
    }
}
