//! Per-category API call metrics
//!
//! Each [`ApiCategory`] gets a timer plus success and failure counters,
//! created on first use and kept for the life of the controller. A single
//! gauge tracks calls currently in flight.
//!
//! ## Design
//! - **DashMap** keyed by category, values behind `Arc` so recording never
//!   holds a map guard
//! - **Atomics only** on the hot path
//! - **Drop-safe contexts**: a call context dropped without being finished
//!   is recorded as a failure and still releases the gauge

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use bridgekit_domain::ApiCategory;
use dashmap::DashMap;

/// Call duration accumulator.
#[derive(Debug, Default)]
pub struct ApiTimer {
    count: AtomicU64,
    total_nanos: AtomicU64,
    max_nanos: AtomicU64,
}

impl ApiTimer {
    pub fn record(&self, duration: Duration) {
        let nanos = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
        self.count.fetch_add(1, Ordering::Relaxed);
        self.total_nanos.fetch_add(nanos, Ordering::Relaxed);
        self.max_nanos.fetch_max(nanos, Ordering::Relaxed);
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn total(&self) -> Duration {
        Duration::from_nanos(self.total_nanos.load(Ordering::Relaxed))
    }

    pub fn max(&self) -> Duration {
        Duration::from_nanos(self.max_nanos.load(Ordering::Relaxed))
    }

    /// Mean duration, zero before the first sample.
    pub fn mean(&self) -> Duration {
        let count = self.count();
        if count == 0 {
            return Duration::ZERO;
        }
        Duration::from_nanos(self.total_nanos.load(Ordering::Relaxed) / count)
    }
}

/// Timer and outcome counters of one category.
#[derive(Debug, Default)]
pub struct ApiCategoryMetrics {
    pub timer: ApiTimer,
    success: AtomicU64,
    failure: AtomicU64,
}

impl ApiCategoryMetrics {
    pub fn success_count(&self) -> u64 {
        self.success.load(Ordering::Relaxed)
    }

    pub fn failure_count(&self) -> u64 {
        self.failure.load(Ordering::Relaxed)
    }

    fn record(&self, elapsed: Duration, success: bool) {
        self.timer.record(elapsed);
        let counter = if success { &self.success } else { &self.failure };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// Point-in-time copy of a category's metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiMetricsSnapshot {
    pub category: ApiCategory,
    pub count: u64,
    pub success: u64,
    pub failure: u64,
    pub total_time: Duration,
    pub max_time: Duration,
}

/// An in-flight call started with [`ApiMetricsController::start_api_call`].
#[derive(Debug)]
pub struct ApiCallContext {
    category: ApiCategory,
    started: Instant,
    metrics: Arc<ApiCategoryMetrics>,
    active_calls: Arc<AtomicI64>,
    finished: bool,
}

impl ApiCallContext {
    pub const fn category(&self) -> ApiCategory {
        self.category
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    fn finish(&mut self, success: bool) {
        if self.finished {
            return;
        }
        self.finished = true;
        self.metrics.record(self.started.elapsed(), success);
        self.active_calls.fetch_sub(1, Ordering::SeqCst);
    }
}

impl Drop for ApiCallContext {
    fn drop(&mut self) {
        if !self.finished {
            tracing::debug!(category = %self.category, "API call dropped before completion");
            self.finish(false);
        }
    }
}

/// Metrics recorder for decorated API clients.
#[derive(Debug, Default)]
pub struct ApiMetricsController {
    categories: DashMap<ApiCategory, Arc<ApiCategoryMetrics>>,
    active_calls: Arc<AtomicI64>,
}

impl ApiMetricsController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the category of `path`, start its timer and bump the gauge.
    pub fn start_api_call(&self, path: &str) -> ApiCallContext {
        let category = ApiCategory::from_path(path);
        let metrics = self.category_metrics(category);
        self.active_calls.fetch_add(1, Ordering::SeqCst);

        ApiCallContext {
            category,
            started: Instant::now(),
            metrics,
            active_calls: Arc::clone(&self.active_calls),
            finished: false,
        }
    }

    /// Stop the timer, release the gauge and count the outcome.
    pub fn finish_api_call(&self, mut context: ApiCallContext, success: bool) {
        context.finish(success);
    }

    /// Calls currently in flight.
    pub fn active_calls(&self) -> i64 {
        self.active_calls.load(Ordering::SeqCst)
    }

    /// Metrics of `category`, if any call was observed for it.
    pub fn category(&self, category: ApiCategory) -> Option<Arc<ApiCategoryMetrics>> {
        self.categories.get(&category).map(|entry| Arc::clone(entry.value()))
    }

    /// Number of timed calls for `category`.
    pub fn timer_count(&self, category: ApiCategory) -> u64 {
        self.category(category).map_or(0, |metrics| metrics.timer.count())
    }

    pub fn snapshot(&self, category: ApiCategory) -> Option<ApiMetricsSnapshot> {
        self.category(category).map(|metrics| ApiMetricsSnapshot {
            category,
            count: metrics.timer.count(),
            success: metrics.success_count(),
            failure: metrics.failure_count(),
            total_time: metrics.timer.total(),
            max_time: metrics.timer.max(),
        })
    }

    /// Snapshots of every observed category, in declaration order.
    pub fn snapshots(&self) -> Vec<ApiMetricsSnapshot> {
        ApiCategory::ALL.iter().filter_map(|category| self.snapshot(*category)).collect()
    }

    fn category_metrics(&self, category: ApiCategory) -> Arc<ApiCategoryMetrics> {
        Arc::clone(self.categories.entry(category).or_default().value())
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    #[test]
    fn categories_are_created_lazily() {
        let controller = ApiMetricsController::new();
        assert!(controller.snapshots().is_empty());

        let ctx = controller.start_api_call("/v1/configuration/abc");
        controller.finish_api_call(ctx, true);

        assert!(controller.category(ApiCategory::Configuration).is_some());
        assert!(controller.category(ApiCategory::Other).is_none());
    }

    #[test]
    fn finish_counts_exactly_one_outcome() {
        let controller = ApiMetricsController::new();

        let ok = controller.start_api_call("/v1/user/42");
        let failed = controller.start_api_call("/v1/user/43");
        assert_eq!(controller.active_calls(), 2);

        controller.finish_api_call(ok, true);
        controller.finish_api_call(failed, false);

        let snapshot = controller.snapshot(ApiCategory::User).unwrap();
        assert_eq!(snapshot.count, 2);
        assert_eq!(snapshot.success, 1);
        assert_eq!(snapshot.failure, 1);
        assert_eq!(controller.active_calls(), 0);
    }

    #[test]
    fn dropped_context_counts_as_failure() {
        let controller = ApiMetricsController::new();

        drop(controller.start_api_call("/v1/instance/1"));

        assert_eq!(controller.active_calls(), 0);
        assert_eq!(controller.snapshot(ApiCategory::Instance).unwrap().failure, 1);
    }

    #[test]
    fn concurrent_recording_is_consistent() {
        let controller = Arc::new(ApiMetricsController::new());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let controller = Arc::clone(&controller);
                thread::spawn(move || {
                    for _ in 0..100 {
                        let ctx = controller.start_api_call("/other/xyz");
                        controller.finish_api_call(ctx, i % 2 == 0);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = controller.snapshot(ApiCategory::Other).unwrap();
        assert_eq!(snapshot.count, 800);
        assert_eq!(snapshot.success + snapshot.failure, 800);
        assert_eq!(controller.active_calls(), 0);
    }
}
