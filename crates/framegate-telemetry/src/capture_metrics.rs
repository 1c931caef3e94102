use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

/// Shared metrics for cross-task pipeline monitoring
#[derive(Clone)]
pub struct CaptureMetrics {
    // Producer side
    pub batches_stored: Arc<AtomicU64>,    // Batches handed to the capture buffer
    pub batches_ringed: Arc<AtomicU64>,    // Batches placed in the ring (outside window)
    pub batches_queued: Arc<AtomicU64>,    // Batches placed in the send queue
    pub batches_evicted: Arc<AtomicU64>,   // Batches dropped by ring overflow
    pub duplicates_skipped: Arc<AtomicU64>, // Queue insertions rejected by dedup

    // Consumer side
    pub batches_delivered: Arc<AtomicU64>, // Batches popped by a consumer
    pub empty_pulls: Arc<AtomicU64>,       // Pulls answered with the no-data sentinel

    // Trigger activity
    pub triggers: Arc<AtomicU64>,
    pub window_open: Arc<AtomicBool>,
    pub last_trigger_time: Arc<RwLock<Option<DateTime<Utc>>>>,

    // Depth gauges
    pub ring_depth: Arc<AtomicUsize>,
    pub queue_depth: Arc<AtomicUsize>,

    // Error tracking
    pub source_errors: Arc<AtomicU64>,
    pub predicate_errors: Arc<AtomicU64>,
}

impl Default for CaptureMetrics {
    fn default() -> Self {
        Self {
            batches_stored: Arc::new(AtomicU64::new(0)),
            batches_ringed: Arc::new(AtomicU64::new(0)),
            batches_queued: Arc::new(AtomicU64::new(0)),
            batches_evicted: Arc::new(AtomicU64::new(0)),
            duplicates_skipped: Arc::new(AtomicU64::new(0)),

            batches_delivered: Arc::new(AtomicU64::new(0)),
            empty_pulls: Arc::new(AtomicU64::new(0)),

            triggers: Arc::new(AtomicU64::new(0)),
            window_open: Arc::new(AtomicBool::new(false)),
            last_trigger_time: Arc::new(RwLock::new(None)),

            ring_depth: Arc::new(AtomicUsize::new(0)),
            queue_depth: Arc::new(AtomicUsize::new(0)),

            source_errors: Arc::new(AtomicU64::new(0)),
            predicate_errors: Arc::new(AtomicU64::new(0)),
        }
    }
}

impl CaptureMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_trigger(&self, at: DateTime<Utc>) {
        self.triggers.fetch_add(1, Ordering::Relaxed);
        *self.last_trigger_time.write() = Some(at);
    }

    pub fn set_depths(&self, ring: usize, queue: usize) {
        self.ring_depth.store(ring, Ordering::Relaxed);
        self.queue_depth.store(queue, Ordering::Relaxed);
    }

    pub fn set_window_open(&self, open: bool) {
        self.window_open.store(open, Ordering::Relaxed);
    }

    pub fn increment_source_errors(&self) {
        self.source_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_predicate_errors(&self) {
        self.predicate_errors.fetch_add(1, Ordering::Relaxed);
    }
}
