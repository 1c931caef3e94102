use crate::frame::FrameBatch;
use chrono::{DateTime, Utc};
use std::collections::VecDeque;

/// Bounded store of recently captured batches not yet known to be needed,
/// oldest first. Insertion evicts from the front once `max_batches` is
/// reached; eviction is silent and expected. Time relevance is enforced at
/// scan time, not eviction time, so a still-open window is never starved by
/// an early eviction sweep.
#[derive(Debug)]
pub struct FrameRing {
    entries: VecDeque<FrameBatch>,
    max_batches: usize,
}

impl FrameRing {
    pub fn new(max_batches: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(max_batches),
            max_batches,
        }
    }

    pub fn max_batches(&self) -> usize {
        self.max_batches
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append a batch, evicting the oldest entries while over capacity.
    /// Returns how many batches were evicted.
    pub fn push(&mut self, batch: FrameBatch) -> usize {
        self.entries.push_back(batch);

        let mut evicted = 0;
        while self.entries.len() > self.max_batches {
            self.entries.pop_front();
            evicted += 1;
        }
        evicted
    }

    /// All stored batches with `from <= captured_at <= till`, in ascending
    /// capture order. Read-only: backfill copies entries out, eviction is
    /// left to FIFO overflow.
    pub fn scan(&self, from: DateTime<Utc>, till: DateTime<Utc>) -> Vec<FrameBatch> {
        let mut hits: Vec<FrameBatch> = self
            .entries
            .iter()
            .filter(|b| from <= b.captured_at && b.captured_at <= till)
            .cloned()
            .collect();
        hits.sort_by_key(|b| b.captured_at);
        hits
    }
}
