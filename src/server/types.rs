//! Server-level types and error taxonomy.

use std::collections::HashMap;
use std::num::ParseIntError;
use thiserror::Error;

/// Error surfaced by a database driver across the `Connector`/`Connection` boundary.
pub type DriverError = Box<dyn std::error::Error + Send + Sync>;

/// First row of a diagnostic statement, keyed by column name.
pub type Row = HashMap<String, String>;

/// Failure to open a connection or to verify it is alive.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("failed to open connection to {server}: {source}")]
    Open {
        server: String,
        #[source]
        source: DriverError,
    },

    #[error("liveness check against {server} failed: {source}")]
    Ping {
        server: String,
        #[source]
        source: DriverError,
    },
}

/// Failure while running a raw diagnostic statement.
#[derive(Debug, Error)]
pub enum QueryError {
    /// `raw_query` was called before `ensure_connected` succeeded.
    #[error("no connection established for {0}")]
    NotConnected(String),

    #[error("statement `{statement}` failed: {source}")]
    Execute {
        statement: String,
        #[source]
        source: DriverError,
    },

    #[error("statement `{statement}` returned no rows")]
    NoRows { statement: String },

    #[error("failed to decode row of `{statement}`: {reason}")]
    Decode { statement: String, reason: String },
}

/// A numeric status field that did not hold an integer.
#[derive(Debug, Error)]
#[error("field `{field}` is not an integer: {value:?}")]
pub struct ParseError {
    pub field: &'static str,
    pub value: String,
    #[source]
    pub source: ParseIntError,
}

/// Cause of a down transition, as kept in a `HealthRecord`.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}
