pub mod capture_metrics;
pub mod trigger_stats;

pub use capture_metrics::*;
pub use trigger_stats::*;
