//! Database driver boundary.
//!
//! # Responsibilities
//! - Open a pooled connection handle from `ServerSettings`
//! - Run a liveness check
//! - Execute raw statements, exposing named columns and raw row bytes
//! - Decorate a connection with a per-statement trace sink
//!
//! # Design Decisions
//! - Traits are object safe so nodes hold `Arc<dyn Connection>`
//! - Pool sizing is the driver's job; nodes never close the handle
//! - Result sets are closed explicitly so release failures can be reported

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::ServerSettings;
use crate::observability::logging::{Logger, SQL_TRACE_PREFIX};
use crate::server::types::DriverError;

/// One row of raw column values; `None` is SQL NULL.
pub type RawRow = Vec<Option<Vec<u8>>>;

/// Opens connection handles. Shared by every node in a pool.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Build a handle with the settings' pool limits applied.
    async fn open(&self, settings: &ServerSettings) -> Result<Arc<dyn Connection>, DriverError>;
}

/// An established, internally pooled connection to one server.
#[async_trait]
pub trait Connection: Send + Sync {
    async fn ping(&self) -> Result<(), DriverError>;

    async fn query(&self, statement: &str) -> Result<Box<dyn ResultSet>, DriverError>;
}

/// Tabular result of a raw statement.
#[async_trait]
pub trait ResultSet: Send {
    /// Column names in driver order.
    fn columns(&self) -> &[String];

    async fn next_row(&mut self) -> Result<Option<RawRow>, DriverError>;

    /// Release the result set. Must be called on every path.
    async fn close(&mut self) -> Result<(), DriverError>;
}

/// Result set whose rows were already read from the wire.
#[derive(Debug, Default, Clone)]
pub struct BufferedResultSet {
    columns: Vec<String>,
    rows: VecDeque<RawRow>,
}

impl BufferedResultSet {
    pub fn new(columns: Vec<String>, rows: Vec<RawRow>) -> Self {
        Self {
            columns,
            rows: rows.into(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ResultSet for BufferedResultSet {
    fn columns(&self) -> &[String] {
        &self.columns
    }

    async fn next_row(&mut self) -> Result<Option<RawRow>, DriverError> {
        Ok(self.rows.pop_front())
    }

    async fn close(&mut self) -> Result<(), DriverError> {
        self.rows.clear();
        Ok(())
    }
}

/// Connection that reports every statement to a `Logger` before running it.
pub struct TracedConnection {
    inner: Arc<dyn Connection>,
    sink: Arc<dyn Logger>,
}

impl TracedConnection {
    pub fn new(inner: Arc<dyn Connection>, sink: Arc<dyn Logger>) -> Self {
        Self { inner, sink }
    }
}

#[async_trait]
impl Connection for TracedConnection {
    async fn ping(&self) -> Result<(), DriverError> {
        self.inner.ping().await
    }

    async fn query(&self, statement: &str) -> Result<Box<dyn ResultSet>, DriverError> {
        self.sink.trace(SQL_TRACE_PREFIX, statement);
        self.inner.query(statement).await
    }
}
