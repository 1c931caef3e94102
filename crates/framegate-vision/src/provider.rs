use crate::types::{Classification, Detection};
use async_trait::async_trait;
use framegate_foundation::CaptureError;

/// A vision service that scores frames. Implementations are expected to be
/// stateless from the caller's perspective and may block on network I/O;
/// they are never invoked while the capture-buffer lock is held.
#[async_trait]
pub trait VisionProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Classify the encoded image, returning up to `max_results` labeled
    /// confidences.
    async fn classify(
        &self,
        image: &[u8],
        max_results: usize,
    ) -> Result<Vec<Classification>, CaptureError>;

    /// Detect objects in the encoded image.
    async fn detect(&self, image: &[u8]) -> Result<Vec<Detection>, CaptureError>;
}

/// The simpler predicate shape used by the conditional camera: an opaque
/// boolean verdict replaces label/threshold matching entirely.
#[async_trait]
pub trait FilterOracle: Send + Sync {
    fn name(&self) -> &str;

    async fn evaluate(&self) -> Result<bool, CaptureError>;
}
