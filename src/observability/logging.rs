//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber for the binary
//! - Define the `Logger` capability handed to probes
//! - Provide a `tracing`-backed `Logger`
//!
//! # Design Decisions
//! - JSON format for production, pretty format for development
//! - `RUST_LOG` wins over the configured level
//! - Logging never fails the caller; sinks swallow their own problems

use std::error::Error;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::schema::{LogFormat, ObservabilityConfig};

/// Prefix attached to every traced statement.
pub const SQL_TRACE_PREFIX: &str = "[sql]";

/// Sink for non-fatal diagnostic errors and per-statement traces.
pub trait Logger: Send + Sync {
    /// Report an error that does not change the outcome of the operation.
    fn error(&self, err: &(dyn Error + 'static));

    /// Receive a copy of a statement about to run on a traced connection.
    fn trace(&self, prefix: &str, statement: &str) {
        tracing::trace!(target: "db_balancer::sql", "{} {}", prefix, statement);
    }
}

/// `Logger` that forwards to `tracing` events.
#[derive(Debug, Default, Clone)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn error(&self, err: &(dyn Error + 'static)) {
        tracing::error!(error = %err, "Database diagnostic error");
    }

    fn trace(&self, prefix: &str, statement: &str) {
        tracing::debug!(target: "db_balancer::sql", statement = %statement, "{}", prefix);
    }
}

/// Install the global tracing subscriber.
pub fn init_logging(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("db_balancer={}", config.log_level).into());

    let registry = tracing_subscriber::registry().with(filter);
    match config.log_format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}
