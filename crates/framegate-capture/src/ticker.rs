use crate::buffer::CaptureBuffer;
use crate::source::FrameSource;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

/// Background producer: pulls the frame source on a fixed period derived
/// from the configured capture frequency and feeds the capture buffer.
///
/// A failed capture aborts that tick without touching buffer state; the
/// error is logged and counted, never propagated.
pub struct CaptureTicker {
    source: Arc<dyn FrameSource>,
    buffer: Arc<CaptureBuffer>,
    period: Duration,
    running: Arc<AtomicBool>,
}

impl CaptureTicker {
    pub fn new(source: Arc<dyn FrameSource>, buffer: Arc<CaptureBuffer>, frequency_hz: f64) -> Self {
        Self {
            source,
            buffer,
            period: Duration::from_secs_f64(1.0 / frequency_hz),
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn spawn(self) -> TickerHandle {
        self.running.store(true, Ordering::SeqCst);
        let running = self.running.clone();

        let handle = tokio::spawn(async move {
            tracing::info!(period_ms = self.period.as_millis() as u64, "capture ticker started");

            let mut ticker = interval(self.period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            while self.running.load(Ordering::SeqCst) {
                ticker.tick().await;
                if !self.running.load(Ordering::SeqCst) {
                    break;
                }

                match self.source.capture().await {
                    Ok(batch) => {
                        tracing::trace!(
                            frames = batch.frames.len(),
                            captured_at = %batch.captured_at,
                            "tick captured"
                        );
                        self.buffer.store(batch);
                    }
                    Err(e) => {
                        tracing::debug!("error capturing frames in background: {}", e);
                        self.buffer.metrics().increment_source_errors();
                    }
                }
            }

            tracing::info!("capture ticker stopped");
        });

        TickerHandle { running, handle }
    }
}

/// Handle to a running ticker task. Dropping the handle does not stop the
/// task; call [`stop`](Self::stop) (and optionally [`join`](Self::join))
/// for a graceful shutdown that lets an in-flight store complete.
pub struct TickerHandle {
    running: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl TickerHandle {
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub async fn join(self) {
        self.stop();
        if let Err(e) = self.handle.await {
            if !e.is_cancelled() {
                tracing::warn!("capture ticker task ended abnormally: {}", e);
            }
        }
    }
}
