//! Observability infrastructure for logging and API call metrics
//!
//! - [`logging`] installs the global `tracing` subscriber
//! - [`metrics`] records per-category call timing and outcomes
//!
//! ## Memory Ordering
//! The in-flight gauge uses SeqCst so snapshots taken by tests and health
//! endpoints agree with start/finish pairs. Independent counters use Relaxed.

pub mod logging;
pub mod metrics;

pub use logging::init_logging;
pub use metrics::ApiMetricsController;
