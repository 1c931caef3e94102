pub mod buffer;
pub mod frame;
pub mod queue;
pub mod ring;
pub mod source;
pub mod ticker;
pub mod window;

// Public API
pub use buffer::CaptureBuffer;
pub use frame::{CaptureMetadata, Frame, FrameBatch};
pub use queue::SendQueue;
pub use ring::FrameRing;
pub use source::FrameSource;
pub use ticker::{CaptureTicker, TickerHandle};
pub use window::{CaptureWindow, WindowSpan};
