use crate::frame::FrameBatch;
use async_trait::async_trait;
use framegate_foundation::CaptureError;

/// Pull-based frame producer. One capture call may yield multiple named
/// frames (e.g. a color and a depth sensor) sharing one timestamp.
///
/// Implementations may block on device or network I/O; callers never invoke
/// this while holding buffer state.
#[async_trait]
pub trait FrameSource: Send + Sync {
    fn name(&self) -> &str;

    async fn capture(&self) -> Result<FrameBatch, CaptureError>;
}
