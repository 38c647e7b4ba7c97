//! Health tracking subsystem.
//!
//! # Data Flow
//! ```text
//! External caller (scheduler, CLI, ServerPool::check_all)
//!     → ServerNode::check_health
//!         → ensure_connected (lazy, once per node)
//!         → SHOW SLAVE STATUS          (best effort, probe.rs)
//!         → SHOW STATUS Threads_connected (mandatory, probe.rs)
//!     → record.rs (HealthRecord, lock-protected)
//!
//! Routing logic (external):
//!     → HealthRecord accessors / snapshot, concurrently with probes
//! ```
//!
//! # State machine
//! ```text
//! Unprobed → Up | Down
//! Up ↔ Down, re-evaluated on every probe, no terminal state
//! ```
//!
//! # Design Decisions
//! - Lag probe failures never affect up/down
//! - Mandatory probe failures always short-circuit to Down
//! - The probe itself never returns an error; failures live in the record

pub mod probe;
pub mod record;

pub use record::{HealthRecord, HealthSnapshot};
