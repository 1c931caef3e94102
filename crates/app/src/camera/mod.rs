pub mod conditional;
pub mod filtered;

pub use conditional::ConditionalCamera;
pub use filtered::FilteredCamera;
