//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! ServerNode probes produce:
//!     → logging.rs (structured events, Logger sink, SQL trace)
//!     → metrics.rs (per-server gauges and counters)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → whatever metrics recorder the host process installs
//! ```

pub mod logging;
pub mod metrics;

pub use logging::{Logger, TracingLogger};
