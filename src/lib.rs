//! Database load balancer health subsystem.
//!
//! Keeps a concurrency-safe, continuously refreshed view of every backend
//! database server: whether it is reachable, how far it lags behind its
//! primary and how many connections it holds. Routing logic reads that view
//! while probes refresh it.

pub mod config;
pub mod health;
pub mod observability;
pub mod server;

pub use config::BalancerConfig;
pub use health::{HealthRecord, HealthSnapshot};
pub use observability::{Logger, TracingLogger};
pub use server::{ServerNode, ServerPool};
