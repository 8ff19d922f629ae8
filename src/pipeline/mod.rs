// src/pipeline/mod.rs
pub mod disasters;
pub mod news;

use metrics::{describe_counter, describe_gauge, describe_histogram};
use once_cell::sync::OnceCell;

/// How a single collector invocation ended. Nothing past secret loading
/// raises; every failure mode lands in one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Batch accepted by the API server; count of submitted records.
    Published(usize),
    /// Nothing newer than the high-water mark; no write was attempted.
    NoNewRecords,
    /// Mark unavailable and the pipeline is fail-closed; upstream not fetched.
    SkippedNoMark,
    /// Batch write failed; logged, not retried.
    PublishFailed,
}

/// One-time metrics registration (so series show up on an exporter).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("collector_runs_total", "Collector invocations started.");
        describe_counter!("collector_fetched_total", "Records parsed from upstream sources.");
        describe_counter!(
            "collector_published_total",
            "Records accepted by the API server."
        );
        describe_counter!(
            "collector_dropped_total",
            "Fetched records at or below the high-water mark."
        );
        describe_counter!(
            "collector_source_errors_total",
            "Upstream fetch/parse errors."
        );
        describe_counter!(
            "collector_api_errors_total",
            "API server errors (mark reads and batch writes)."
        );
        describe_histogram!("collector_fetch_ms", "Source fetch/parse time in milliseconds.");
        describe_gauge!(
            "collector_last_run_ts",
            "Unix ts when a collector pipeline last ran."
        );
    });
}
