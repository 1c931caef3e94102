use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Capture subsystem error: {0}")]
    Capture(#[from] CaptureError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Component failed health check: {component}")]
    HealthCheckFailed { component: String },

    #[error("Shutdown requested")]
    ShutdownRequested,

    #[error("Fatal error, cannot recover: {0}")]
    Fatal(String),
}

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Frame source '{source_name}' failed: {message}")]
    Source { source_name: String, message: String },

    #[error("Vision provider '{provider}' failed: {message}")]
    Predicate { provider: String, message: String },

    #[error("Filter oracle '{service}' failed: {message}")]
    Oracle { service: String, message: String },

    #[error("Oracle '{service}' returned a malformed verdict")]
    MalformedVerdict { service: String },

    /// Not a failure: the send queue is empty and no window fallback applies.
    /// Callers should treat this as "try again on the next pull".
    #[error("No frames ready to deliver")]
    NoFrameReady,
}

impl CaptureError {
    pub fn is_no_data(&self) -> bool {
        matches!(self, CaptureError::NoFrameReady)
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("\"{field}\" is required")]
    FieldRequired { field: &'static str },

    #[error("cannot specify both window_seconds and window_seconds_before/after")]
    WindowModeConflict,

    #[error("window_seconds, window_seconds_before, and window_seconds_after cannot all be zero")]
    WindowUnset,

    #[error("image_frequency must be greater than 0, got {value}")]
    FrequencyOutOfRange { value: f64 },

    #[error("unknown vision provider '{name}' referenced by config")]
    UnknownProvider { name: String },

    #[error("unknown filter service '{name}' referenced by config")]
    UnknownOracle { name: String },
}

#[derive(Debug, Clone)]
pub enum RecoveryStrategy {
    Retry { max_attempts: u32, delay: Duration },
    Restart,
    Ignore,
    Fatal,
}

impl AppError {
    pub fn recovery_strategy(&self) -> RecoveryStrategy {
        match self {
            AppError::Capture(CaptureError::Source { .. }) => RecoveryStrategy::Retry {
                max_attempts: 5,
                delay: Duration::from_secs(2),
            },
            AppError::Capture(CaptureError::NoFrameReady) => RecoveryStrategy::Ignore,
            AppError::Config(_) | AppError::Fatal(_) | AppError::ShutdownRequested => {
                RecoveryStrategy::Fatal
            }
            _ => RecoveryStrategy::Restart,
        }
    }
}
