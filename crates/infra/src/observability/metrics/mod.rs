//! Metrics collection modules
//!
//! Thread-safe metrics for the decorated API clients.

pub mod api;

// Re-export metric types for convenience
pub use api::{ApiCallContext, ApiCategoryMetrics, ApiMetricsController, ApiMetricsSnapshot, ApiTimer};
