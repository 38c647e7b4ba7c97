//! Diagnostic statements and the parsing of their results.
//!
//! # Responsibilities
//! - Name the two statements a probe issues
//! - Turn their first rows into replication lag and connection count

use crate::server::types::{ParseError, Row};

/// Best-effort replication status; fails or returns nothing on non-replicas.
pub const SLAVE_STATUS_QUERY: &str = "SHOW SLAVE STATUS";

/// Mandatory load probe.
pub const THREADS_CONNECTED_QUERY: &str = "SHOW STATUS LIKE 'Threads_connected'";

pub const SECONDS_BEHIND_MASTER: &str = "Seconds_Behind_Master";
pub const VALUE: &str = "Value";

/// Extract `Seconds_Behind_Master` from a `SHOW SLAVE STATUS` row.
///
/// Returns `None` when the field is missing, empty, `NULL` or not an integer,
/// in which case the previously recorded lag must be kept.
pub fn parse_replication_lag(row: &Row) -> Option<i64> {
    row.get(SECONDS_BEHIND_MASTER)
        .map(String::as_str)
        .filter(|v| !v.is_empty() && *v != "NULL")
        .and_then(|v| v.parse().ok())
}

/// Extract the `Value` column of the `Threads_connected` status row.
pub fn parse_threads_connected(row: &Row) -> Result<i64, ParseError> {
    let value = row.get(VALUE).map(String::as_str).unwrap_or_default();
    value.parse().map_err(|source| ParseError {
        field: VALUE,
        value: value.to_string(),
        source,
    })
}
