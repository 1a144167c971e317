//! Observability metrics for deployment runs.
//!
//! Exposed via the `metrics` crate facade; exporting (e.g. to Prometheus)
//! is the embedder's choice and not wired here.
//!
//! ## Metrics Exported
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `wright_deploy_units_total` | Counter | `outcome` | Unit deploy attempts by outcome |
//! | `wright_deploy_unit_duration_seconds` | Histogram | `outcome` | Per-unit deploy latency |
//! | `wright_deploy_runs_total` | Counter | `state` | Completed runs by terminal state |
//! | `wright_deploy_active_runs` | Gauge | - | Currently executing runs |

use metrics::{counter, gauge, histogram};

/// Metric names as constants for consistency.
pub mod names {
    /// Counter: unit deploy attempts by outcome.
    pub const UNITS_TOTAL: &str = "wright_deploy_units_total";
    /// Histogram: per-unit deploy latency in seconds.
    pub const UNIT_DURATION_SECONDS: &str = "wright_deploy_unit_duration_seconds";
    /// Counter: completed runs by terminal state.
    pub const RUNS_TOTAL: &str = "wright_deploy_runs_total";
    /// Gauge: currently executing runs.
    pub const ACTIVE_RUNS: &str = "wright_deploy_active_runs";
}

/// Handle for recording deployment metrics.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeployMetrics;

impl DeployMetrics {
    /// Creates a new metrics handle.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Records the outcome and latency of one unit deploy attempt.
    pub fn record_unit(&self, outcome: &'static str, duration_secs: f64) {
        counter!(names::UNITS_TOTAL, "outcome" => outcome).increment(1);
        histogram!(names::UNIT_DURATION_SECONDS, "outcome" => outcome).record(duration_secs);
    }

    /// Records a completed run's terminal state.
    pub fn record_run(&self, state: &'static str) {
        counter!(names::RUNS_TOTAL, "state" => state).increment(1);
    }

    /// Marks a run as started.
    pub fn run_started(&self) {
        gauge!(names::ACTIVE_RUNS).increment(1.0);
    }

    /// Marks a run as finished.
    pub fn run_finished(&self) {
        gauge!(names::ACTIVE_RUNS).decrement(1.0);
    }
}
