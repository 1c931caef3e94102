use crate::config::FilteredCameraConfig;
use framegate_capture::{CaptureBuffer, CaptureMetadata, Frame, FrameBatch, FrameSource};
use framegate_foundation::{AppError, CaptureError, ConfigError, SharedClock};
use framegate_telemetry::{CaptureMetrics, TriggerStats};
use framegate_vision::{
    PredicateBinding, ThresholdMap, TriggerPolicy, Verdict, VisionProvider, NO_PROVIDER_LABEL,
};
use std::collections::HashMap;
use std::sync::atomic::Ordering;
use std::sync::Arc;

/// Camera that forwards frames only around moments a vision predicate found
/// interesting.
///
/// The background ticker feeds every captured batch into the buffer; the
/// pull path evaluates a fresh batch against the trigger policy (outside the
/// buffer lock, since providers may block on network I/O), opens or extends
/// the capture window on an accepted frame, and drains the send queue.
pub struct FilteredCamera {
    name: String,
    source: Arc<dyn FrameSource>,
    policy: TriggerPolicy,
    buffer: Arc<CaptureBuffer>,
}

impl FilteredCamera {
    pub fn new(
        config: &FilteredCameraConfig,
        source: Arc<dyn FrameSource>,
        providers: &HashMap<String, Arc<dyn VisionProvider>>,
        clock: SharedClock,
        metrics: CaptureMetrics,
    ) -> Result<Self, AppError> {
        config.validate()?;

        let mut inhibitors = Vec::new();
        let mut acceptors = Vec::new();
        for vs in &config.vision_services {
            let provider = providers
                .get(&vs.vision)
                .cloned()
                .ok_or_else(|| ConfigError::UnknownProvider {
                    name: vs.vision.clone(),
                })?;
            let binding = PredicateBinding::new(
                provider,
                ThresholdMap::new(vs.classifications.clone()),
                ThresholdMap::new(vs.objects.clone()),
            );
            if vs.inhibit {
                inhibitors.push(binding);
            } else {
                acceptors.push(binding);
            }
        }

        let buffer = Arc::new(CaptureBuffer::new(
            config.window_span(),
            config.frequency_hz(),
            clock,
            metrics,
        ));

        Ok(Self {
            name: config.camera.clone(),
            source,
            policy: TriggerPolicy::new(inhibitors, acceptors),
            buffer,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The shared buffer, for wiring up the background ticker.
    pub fn buffer(&self) -> Arc<CaptureBuffer> {
        Arc::clone(&self.buffer)
    }

    /// Accept/reject breakdown snapshot for diagnostics.
    pub fn stats(&self) -> TriggerStats {
        self.buffer.stats()
    }

    /// Drain every queued batch, flattened into one chronological frame
    /// sequence. Falls back to the just-captured batch when the queue is
    /// empty but the batch arrived inside an already-open window.
    pub async fn pull_batch(&self) -> Result<(Vec<Frame>, CaptureMetadata), CaptureError> {
        let batch = self.source.capture().await?;
        let was_in_window = self.buffer.is_within_window(batch.captured_at);

        self.evaluate_and_mark(&batch).await?;

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

    /// Single-frame variant of [`pull_batch`](Self::pull_batch): the oldest
    /// queued batch's first frame.
    pub async fn pull_single(&self) -> Result<(Frame, CaptureMetadata), CaptureError> {
        let batch = self.source.capture().await?;
        let was_in_window = self.buffer.is_within_window(batch.captured_at);

        self.evaluate_and_mark(&batch).await?;

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

    /// Run the trigger policy over the batch, frame by frame, recording
    /// outcomes. The first accepted frame opens or extends the window;
    /// inhibition or abstention on one frame does not stop later frames in
    /// the batch from triggering.
    async fn evaluate_and_mark(&self, batch: &FrameBatch) -> Result<(), CaptureError> {
        for frame in &batch.frames {
            match self.policy.evaluate(&frame.data).await {
                Ok(Verdict::Accepted { label }) => {
                    tracing::debug!(camera = %self.name, %label, "trigger accepted");
                    self.buffer.record_accept(&label);
                    self.buffer.record_trigger(batch.captured_at);
                    return Ok(());
                }
                Ok(Verdict::Inhibited { label }) => {
                    tracing::debug!(camera = %self.name, %label, "frame inhibited");
                    self.buffer.record_reject(&label);
                }
                Ok(Verdict::Abstained) => {
                    self.buffer.record_reject(NO_PROVIDER_LABEL);
                }
                Err(e) => {
                    self.buffer.metrics().increment_predicate_errors();
                    return Err(e);
                }
            }
        }
        Ok(())
    }
}
