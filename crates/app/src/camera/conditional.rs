use crate::config::ConditionalCameraConfig;
use framegate_capture::{CaptureBuffer, CaptureMetadata, Frame, FrameBatch, FrameSource};
use framegate_foundation::{AppError, CaptureError, SharedClock};
use framegate_telemetry::{CaptureMetrics, TriggerStats};
use framegate_vision::FilterOracle;
use std::sync::atomic::Ordering;
use std::sync::Arc;

/// Sibling of [`FilteredCamera`](crate::camera::FilteredCamera) that asks an
/// opaque boolean oracle instead of matching label thresholds. All windowing
/// and buffering behavior is shared through `CaptureBuffer`.
pub struct ConditionalCamera {
    name: String,
    source: Arc<dyn FrameSource>,
    oracle: Arc<dyn FilterOracle>,
    buffer: Arc<CaptureBuffer>,
}

impl ConditionalCamera {
    pub fn new(
        config: &ConditionalCameraConfig,
        source: Arc<dyn FrameSource>,
        oracle: Arc<dyn FilterOracle>,
        clock: SharedClock,
        metrics: CaptureMetrics,
    ) -> Result<Self, AppError> {
        config.validate()?;

        let buffer = Arc::new(CaptureBuffer::new(
            config.window_span(),
            config.frequency_hz(),
            clock,
            metrics,
        ));

        Ok(Self {
            name: config.camera.clone(),
            source,
            oracle,
            buffer,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn buffer(&self) -> Arc<CaptureBuffer> {
        Arc::clone(&self.buffer)
    }

    pub fn stats(&self) -> TriggerStats {
        self.buffer.stats()
    }

    pub async fn pull_batch(&self) -> Result<(Vec<Frame>, CaptureMetadata), CaptureError> {
        let batch = self.source.capture().await?;
        let was_in_window = self.buffer.is_within_window(batch.captured_at);

        self.consult_oracle(&batch).await?;

        let popped = self.buffer.pop_all();
        if let Some(newest) = popped.last() {
            let meta = CaptureMetadata {
                captured_at: newest.captured_at,
            };
            let frames = popped.iter().flat_map(|b| b.frames.clone()).collect();
            return Ok((frames, meta));
        }

        if was_in_window {
            let stamped = batch.stamped();
            return Ok((
                stamped.frames,
                CaptureMetadata {
                    captured_at: batch.captured_at,
                },
            ));
        }

        self.buffer
            .metrics()
            .empty_pulls
            .fetch_add(1, Ordering::Relaxed);
        Err(CaptureError::NoFrameReady)
    }

    pub async fn pull_single(&self) -> Result<(Frame, CaptureMetadata), CaptureError> {
        let batch = self.source.capture().await?;
        let was_in_window = self.buffer.is_within_window(batch.captured_at);

        self.consult_oracle(&batch).await?;

        if let Some(popped) = self.buffer.pop_next() {
            if let Some(frame) = popped.frames.into_iter().next() {
                return Ok((
                    frame,
                    CaptureMetadata {
                        captured_at: popped.captured_at,
                    },
                ));
            }
        }

        if was_in_window {
            let stamped = batch.stamped();
            if let Some(frame) = stamped.frames.into_iter().next() {
                return Ok((
                    frame,
                    CaptureMetadata {
                        captured_at: batch.captured_at,
                    },
                ));
            }
        }

        self.buffer
            .metrics()
            .empty_pulls
            .fetch_add(1, Ordering::Relaxed);
        Err(CaptureError::NoFrameReady)
    }

    async fn consult_oracle(&self, batch: &FrameBatch) -> Result<(), CaptureError> {
        match self.oracle.evaluate().await {
            Ok(true) => {
                tracing::debug!(camera = %self.name, oracle = self.oracle.name(), "oracle triggered");
                self.buffer.record_accept(self.oracle.name());
                self.buffer.record_trigger(batch.captured_at);
            }
            Ok(false) => {
                self.buffer.record_reject(self.oracle.name());
            }
            Err(e) => {
                self.buffer.metrics().increment_predicate_errors();
                return Err(e);
            }
        }
        Ok(())
    }
}
