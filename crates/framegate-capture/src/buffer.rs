use crate::frame::FrameBatch;
use crate::queue::SendQueue;
use crate::ring::FrameRing;
use crate::window::{CaptureWindow, WindowSpan};
use chrono::{DateTime, Utc};
use framegate_foundation::SharedClock;
use framegate_telemetry::{CaptureMetrics, TriggerStats};
use parking_lot::Mutex;
use std::sync::atomic::Ordering;

/// Everything guarded by the single capture-buffer lock. The lock is held
/// only for placement and drain operations; predicate evaluation happens in
/// the camera component before calling in.
struct Inner {
    ring: FrameRing,
    window: CaptureWindow,
    queue: SendQueue,
    stats: TriggerStats,
}

/// Composition root of the trigger-windowed capture pipeline: a bounded ring
/// of candidate batches, the active capture window, and the deduplicated
/// send queue, under one mutex.
///
/// Producer API: [`store`](Self::store) from the background ticker.
/// Trigger API: [`record_trigger`](Self::record_trigger) from the camera's
/// pull path. Consumer API: [`pop_next`](Self::pop_next) /
/// [`pop_all`](Self::pop_all).
pub struct CaptureBuffer {
    inner: Mutex<Inner>,
    span: WindowSpan,
    max_batches: usize,
    queue_warn_threshold: usize,
    clock: SharedClock,
    metrics: CaptureMetrics,
}

impl CaptureBuffer {
    pub fn new(
        span: WindowSpan,
        frequency_hz: f64,
        clock: SharedClock,
        metrics: CaptureMetrics,
    ) -> Self {
        // Capacity derived from the window span: a symmetric W-second window
        // holds 2*W*frequency batches, an asymmetric one (before+after)*frequency.
        let max_batches = ((span.total_seconds() * frequency_hz).ceil() as usize).max(1);
        let started_at = clock.now();

        Self {
            inner: Mutex::new(Inner {
                ring: FrameRing::new(max_batches),
                window: CaptureWindow::new(),
                queue: SendQueue::new(),
                stats: TriggerStats::new(started_at),
            }),
            span,
            max_batches,
            queue_warn_threshold: max_batches * 2,
            clock,
            metrics,
        }
    }

    pub fn max_batches(&self) -> usize {
        self.max_batches
    }

    pub fn metrics(&self) -> &CaptureMetrics {
        &self.metrics
    }

    /// Place one captured batch: into the send queue if its timestamp falls
    /// inside the active window (no predicate cost for open windows), into
    /// the ring otherwise. Never fails; ring eviction is silent.
    pub fn store(&self, batch: FrameBatch) {
        let mut inner = self.inner.lock();

        // Delivered timestamps older than two window spans can no longer be
        // re-selected by any trigger; forget them.
        let prune_cutoff = self.clock.now() - (self.span.before + self.span.after) * 2;
        inner.queue.prune_seen(prune_cutoff);

        self.metrics.batches_stored.fetch_add(1, Ordering::Relaxed);

        if inner.window.is_active(batch.captured_at) {
            if inner.queue.push(batch) {
                self.metrics.batches_queued.fetch_add(1, Ordering::Relaxed);
            } else {
                self.metrics.duplicates_skipped.fetch_add(1, Ordering::Relaxed);
            }
            if inner.queue.len() > self.queue_warn_threshold {
                tracing::warn!(
                    queue_len = inner.queue.len(),
                    threshold = self.queue_warn_threshold,
                    "send queue exceeds expected steady-state size, consumer is falling behind"
                );
            }
        } else {
            let evicted = inner.ring.push(batch);
            self.metrics.batches_ringed.fetch_add(1, Ordering::Relaxed);
            if evicted > 0 {
                self.metrics
                    .batches_evicted
                    .fetch_add(evicted as u64, Ordering::Relaxed);
            }
        }

        self.update_gauges(&inner);
    }

    /// Absorb a trigger: open or extend the window around `trigger_time`,
    /// then backfill the send queue with every ring batch inside the
    /// (possibly extended) window that has not been enqueued before, in
    /// ascending capture order.
    pub fn record_trigger(&self, trigger_time: DateTime<Utc>) {
        let mut inner = self.inner.lock();

        inner.window.open_or_extend(trigger_time, self.span);
        self.metrics.record_trigger(trigger_time);

        if let Some((from, till)) = inner.window.bounds() {
            for batch in inner.ring.scan(from, till) {
                if inner.queue.push(batch) {
                    self.metrics.batches_queued.fetch_add(1, Ordering::Relaxed);
                } else {
                    self.metrics.duplicates_skipped.fetch_add(1, Ordering::Relaxed);
                }
            }
        }

        self.update_gauges(&inner);
    }

    /// Record the outcome of a trigger evaluation under the buffer lock.
    pub fn record_accept(&self, label: &str) {
        self.inner.lock().stats.record_accept(label);
    }

    pub fn record_reject(&self, label: &str) {
        self.inner.lock().stats.record_reject(label);
    }

    /// Snapshot of the accept/reject breakdowns.
    pub fn stats(&self) -> TriggerStats {
        self.inner.lock().stats.clone()
    }

    /// Remove and return the oldest queued batch, frames renamed for
    /// delivery. `None` means nothing to deliver right now, not an error.
    pub fn pop_next(&self) -> Option<FrameBatch> {
        let mut inner = self.inner.lock();
        let batch = inner.queue.pop_front().map(|b| b.stamped());
        if batch.is_some() {
            self.metrics.batches_delivered.fetch_add(1, Ordering::Relaxed);
        }
        self.update_gauges(&inner);
        batch
    }

    /// Remove and return all queued batches in FIFO order, frames renamed
    /// for delivery.
    pub fn pop_all(&self) -> Vec<FrameBatch> {
        let mut inner = self.inner.lock();
        let batches: Vec<FrameBatch> = inner
            .queue
            .drain_all()
            .iter()
            .map(|b| b.stamped())
            .collect();
        self.metrics
            .batches_delivered
            .fetch_add(batches.len() as u64, Ordering::Relaxed);
        self.update_gauges(&inner);
        batches
    }

    pub fn is_within_window(&self, at: DateTime<Utc>) -> bool {
        self.inner.lock().window.is_active(at)
    }

    pub fn window_bounds(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        self.inner.lock().window.bounds()
    }

    /// Direct window override, test/debug seam only.
    pub fn set_window(&self, from: DateTime<Utc>, till: DateTime<Utc>) {
        self.inner.lock().window.set(from, till);
    }

    pub fn queue_len(&self) -> usize {
        self.inner.lock().queue.len()
    }

    pub fn ring_len(&self) -> usize {
        self.inner.lock().ring.len()
    }

    fn update_gauges(&self, inner: &Inner) {
        self.metrics.set_depths(inner.ring.len(), inner.queue.len());
        self.metrics
            .set_window_open(inner.window.is_active(self.clock.now()));
    }
}
