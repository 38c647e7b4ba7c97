//! Per-server health record.
//!
//! # States
//! - Unprobed: `up = false`, no error recorded yet
//! - Up: last probe reached the server and read its connection count
//! - Down: last probe failed, `last_error` holds the cause
//!
//! # Design Decisions
//! - One private lock guards every field; it is never held across I/O
//! - Accessors return copies, never references into the locked state
//! - `open_connections` is stale while down and is kept, not reset
//! - `record_up` applies count + up flag in one critical section

use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;

use crate::server::types::ProbeError;

#[derive(Debug, Default)]
struct HealthState {
    up: bool,
    last_error: Option<Arc<ProbeError>>,
    seconds_behind_master: Option<i64>,
    open_connections: i64,
}

/// Lock-protected view of whether one server is usable for routing.
#[derive(Debug, Default)]
pub struct HealthRecord {
    state: Mutex<HealthState>,
}

/// Consistent copy of a `HealthRecord`, taken under a single lock acquisition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthSnapshot {
    pub up: bool,
    pub last_error: Option<String>,
    pub seconds_behind_master: Option<i64>,
    pub open_connections: i64,
}

impl HealthRecord {
    /// Create a record in the unprobed state (`up = false`).
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the server down. Lag and connection count are left as they were.
    pub fn mark_down(&self, err: impl Into<ProbeError>) {
        let mut state = self.state.lock();
        state.up = false;
        state.last_error = Some(Arc::new(err.into()));
    }

    /// Mark the server up and clear the last error.
    pub fn mark_up(&self) {
        let mut state = self.state.lock();
        state.up = true;
        state.last_error = None;
    }

    /// Set the connection count, mark up and clear the last error atomically.
    pub fn record_up(&self, open_connections: i64) {
        let mut state = self.state.lock();
        state.open_connections = open_connections;
        state.up = true;
        state.last_error = None;
    }

    pub fn set_replication_lag(&self, seconds: Option<i64>) {
        self.state.lock().seconds_behind_master = seconds;
    }

    pub fn set_open_connections(&self, n: i64) {
        self.state.lock().open_connections = n;
    }

    pub fn is_up(&self) -> bool {
        self.state.lock().up
    }

    /// Replication lag in seconds; `None` when not a replica or unknown.
    pub fn lag(&self) -> Option<i64> {
        self.state.lock().seconds_behind_master
    }

    /// Last observed connection count. Only meaningful while `is_up()`.
    pub fn connection_count(&self) -> i64 {
        self.state.lock().open_connections
    }

    pub fn last_error(&self) -> Option<Arc<ProbeError>> {
        self.state.lock().last_error.clone()
    }

    pub fn snapshot(&self) -> HealthSnapshot {
        let state = self.state.lock();
        HealthSnapshot {
            up: state.up,
            last_error: state.last_error.as_ref().map(|e| e.to_string()),
            seconds_behind_master: state.seconds_behind_master,
            open_connections: state.open_connections,
        }
    }
}
