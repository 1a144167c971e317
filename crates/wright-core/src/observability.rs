//! Observability infrastructure for Wright.
//!
//! Structured logging with consistent spans. This module provides
//! initialization helpers and span constructors shared by the orchestration
//! engine and the CLI.

use std::sync::Once;
use tracing::Span;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

static INIT: Once = Once::new();

/// Log output format.
#[derive(Debug, Clone, Copy, Default)]
pub enum LogFormat {
    /// JSON structured logs (for CI and machine consumption).
    Json,
    /// Pretty-printed logs (for interactive use).
    #[default]
    Pretty,
}

/// Initializes the logging subsystem.
///
/// Call once at application startup. Safe to call multiple times;
/// subsequent calls are no-ops.
///
/// # Environment Variables
///
/// - `RUST_LOG`: Controls log levels (e.g., `info`, `wright_deploy=debug`)
pub fn init_logging(format: LogFormat) {
    INIT.call_once(|| {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        match format {
            LogFormat::Json => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(fmt::layer().json())
                    .init();
            }
            LogFormat::Pretty => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(fmt::layer().pretty())
                    .init();
            }
        }
    });
}

/// Creates a span for deployment operations with standard fields.
///
/// # Example
///
/// ```rust
/// use wright_core::observability::deploy_span;
///
/// let span = deploy_span("deploy_unit", "run_abc", "RoleController");
/// let _guard = span.enter();
/// // ... deploy the unit
/// ```
#[must_use]
pub fn deploy_span(operation: &str, run_id: &str, unit: &str) -> Span {
    tracing::info_span!(
        "deploy",
        op = operation,
        run_id = run_id,
        unit = unit,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_logging_is_idempotent() {
        init_logging(LogFormat::Pretty);
        init_logging(LogFormat::Pretty);
    }

    #[test]
    fn deploy_span_carries_fields() {
        let span = deploy_span("deploy_unit", "run_123", "RoleController");
        let _guard = span.enter();
        tracing::info!("message in span");
    }
}
