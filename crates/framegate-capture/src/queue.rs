use crate::frame::FrameBatch;
use chrono::{DateTime, Utc};
use std::collections::{HashSet, VecDeque};

/// FIFO queue of batches selected for delivery, deduplicated by capture
/// timestamp.
///
/// The `seen` set outlives the queued entries: backfill re-scans the ring on
/// window extension and on overlapping re-opens, and ring entries are read,
/// not removed, so a timestamp that was already delivered must stay
/// unacceptable until it can no longer fall inside any new window. Callers
/// prune the set once timestamps age out of trigger reach.
#[derive(Debug, Default)]
pub struct SendQueue {
    entries: VecDeque<FrameBatch>,
    seen: HashSet<DateTime<Utc>>,
}

impl SendQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append unless a batch with the same `captured_at` was already
    /// accepted. Returns whether the batch was enqueued.
    pub fn push(&mut self, batch: FrameBatch) -> bool {
        if !self.seen.insert(batch.captured_at) {
            return false;
        }
        self.entries.push_back(batch);
        true
    }

    /// Remove and return the oldest batch.
    pub fn pop_front(&mut self) -> Option<FrameBatch> {
        self.entries.pop_front()
    }

    /// Remove and return everything, oldest first.
    pub fn drain_all(&mut self) -> Vec<FrameBatch> {
        self.entries.drain(..).collect()
    }

    /// Forget delivered timestamps older than `cutoff`. Timestamps still
    /// queued are kept regardless.
    pub fn prune_seen(&mut self, cutoff: DateTime<Utc>) {
        let queued: HashSet<DateTime<Utc>> =
            self.entries.iter().map(|b| b.captured_at).collect();
        self.seen
            .retain(|ts| *ts >= cutoff || queued.contains(ts));
    }

    #[cfg(test)]
    pub(crate) fn seen_len(&self) -> usize {
        self.seen.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Frame;
    use chrono::Duration;

    fn batch_at(base: DateTime<Utc>, offset_secs: i64) -> FrameBatch {
        FrameBatch::new(
            vec![Frame::new("color", "image/jpeg", vec![0u8; 4])],
            base + Duration::seconds(offset_secs),
        )
    }

    #[test]
    fn rejects_duplicate_timestamps() {
        let base = Utc::now();
        let mut queue = SendQueue::new();

        assert!(queue.push(batch_at(base, 1)));
        assert!(!queue.push(batch_at(base, 1)));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn dedup_survives_pop() {
        let base = Utc::now();
        let mut queue = SendQueue::new();

        assert!(queue.push(batch_at(base, 1)));
        assert!(queue.pop_front().is_some());
        // A window re-scan offering the same timestamp again is refused.
        assert!(!queue.push(batch_at(base, 1)));
        assert!(queue.is_empty());
    }

    #[test]
    fn drains_in_fifo_order() {
        let base = Utc::now();
        let mut queue = SendQueue::new();
        for i in [3, 1, 2] {
            queue.push(batch_at(base, i));
        }

        let offsets: Vec<i64> = queue
            .drain_all()
            .iter()
            .map(|b| (b.captured_at - base).num_seconds())
            .collect();
        // Insertion order, not timestamp order: callers sort backfills.
        assert_eq!(offsets, vec![3, 1, 2]);
        assert!(queue.is_empty());
    }

    #[test]
    fn prune_drops_old_delivered_timestamps_only() {
        let base = Utc::now();
        let mut queue = SendQueue::new();
        queue.push(batch_at(base, 1));
        queue.push(batch_at(base, 100));
        queue.pop_front(); // deliver t=1
        assert_eq!(queue.seen_len(), 2);

        queue.prune_seen(base + Duration::seconds(50));
        assert_eq!(queue.seen_len(), 1);
        // t=1 is forgotten, t=100 still queued and still deduplicated.
        assert!(queue.push(batch_at(base, 1)));
        assert!(!queue.push(batch_at(base, 100)));
    }

    #[test]
    fn prune_keeps_queued_entries_behind_cutoff() {
        let base = Utc::now();
        let mut queue = SendQueue::new();
        queue.push(batch_at(base, 1));

        queue.prune_seen(base + Duration::seconds(50));
        // Still queued, so still deduplicated.
        assert!(!queue.push(batch_at(base, 1)));
    }
}
