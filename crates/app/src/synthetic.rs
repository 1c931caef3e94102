//! In-process sources and predicates for the demo binary and the scenario
//! tests. No hardware, no network: frames are fabricated byte payloads and
//! scores come from a script or a random draw.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use framegate_capture::{Frame, FrameBatch, FrameSource};
use framegate_foundation::{CaptureError, SharedClock};
use framegate_vision::{Classification, Detection, FilterOracle, VisionProvider};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

/// Frame source that fabricates one small frame per capture, stamped with
/// the shared clock's current time.
pub struct SyntheticSource {
    name: String,
    frame_name: String,
    clock: SharedClock,
}

impl SyntheticSource {
    pub fn new(name: impl Into<String>, frame_name: impl Into<String>, clock: SharedClock) -> Self {
        Self {
            name: name.into(),
            frame_name: frame_name.into(),
            clock,
        }
    }
}

#[async_trait]
impl FrameSource for SyntheticSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn capture(&self) -> Result<FrameBatch, CaptureError> {
        let captured_at = self.clock.now();
        let payload = captured_at.timestamp_millis().to_be_bytes().to_vec();
        Ok(FrameBatch::new(
            vec![Frame::new(self.frame_name.clone(), "image/jpeg", payload)],
            captured_at,
        ))
    }
}

/// Frame source advancing virtual time one second per capture, so scenario
/// tests can reason about exact timestamps: capture N is at `base + N` s and
/// is named `img_N`.
pub struct SteppedSource {
    name: String,
    base: DateTime<Utc>,
    tick: AtomicI64,
}

impl SteppedSource {
    pub fn new(name: impl Into<String>, base: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            base,
            tick: AtomicI64::new(0),
        }
    }

    pub fn last_tick(&self) -> i64 {
        self.tick.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FrameSource for SteppedSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn capture(&self) -> Result<FrameBatch, CaptureError> {
        let tick = self.tick.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(FrameBatch::new(
            vec![Frame::new(format!("img_{tick}"), "image/jpeg", vec![0u8; 16])],
            self.base + Duration::seconds(tick),
        ))
    }
}

/// Classifier that pops the next scripted score per call, falling back to a
/// default once the script runs dry. Detections are always empty.
pub struct ScriptedProvider {
    name: String,
    label: String,
    scores: Mutex<VecDeque<f64>>,
    default_score: f64,
}

impl ScriptedProvider {
    pub fn new(name: impl Into<String>, label: impl Into<String>, default_score: f64) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            scores: Mutex::new(VecDeque::new()),
            default_score,
        }
    }

    /// Queue scores for upcoming classify calls, in order.
    pub fn script(&self, scores: impl IntoIterator<Item = f64>) {
        self.scores.lock().extend(scores);
    }
}

#[async_trait]
impl VisionProvider for ScriptedProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn classify(
        &self,
        _image: &[u8],
        _max_results: usize,
    ) -> Result<Vec<Classification>, CaptureError> {
        let score = self
            .scores
            .lock()
            .pop_front()
            .unwrap_or(self.default_score);
        Ok(vec![Classification::new(self.label.clone(), score)])
    }

    async fn detect(&self, _image: &[u8]) -> Result<Vec<Detection>, CaptureError> {
        Ok(Vec::new())
    }
}

/// Classifier producing uniformly random confidence for one label. With an
/// acceptor threshold close to 1.0 this yields occasional organic triggers,
/// which is all the demo pipeline needs.
pub struct RandomScoreProvider {
    name: String,
    label: String,
}

impl RandomScoreProvider {
    pub fn new(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
        }
    }
}

#[async_trait]
impl VisionProvider for RandomScoreProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn classify(
        &self,
        _image: &[u8],
        _max_results: usize,
    ) -> Result<Vec<Classification>, CaptureError> {
        Ok(vec![Classification::new(
            self.label.clone(),
            rand::random::<f64>(),
        )])
    }

    async fn detect(&self, _image: &[u8]) -> Result<Vec<Detection>, CaptureError> {
        Ok(Vec::new())
    }
}

/// Oracle answering from a shared flag.
pub struct ScriptedOracle {
    name: String,
    verdict: AtomicBool,
}

impl ScriptedOracle {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            verdict: AtomicBool::new(false),
        }
    }

    pub fn set_verdict(&self, verdict: bool) {
        self.verdict.store(verdict, Ordering::SeqCst);
    }
}

#[async_trait]
impl FilterOracle for ScriptedOracle {
    fn name(&self) -> &str {
        &self.name
    }

    async fn evaluate(&self) -> Result<bool, CaptureError> {
        Ok(self.verdict.load(Ordering::SeqCst))
    }
}
