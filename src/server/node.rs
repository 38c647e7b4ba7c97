//! A single backend database server.
//!
//! # Responsibilities
//! - Own the lazily established connection handle
//! - Run raw diagnostic statements against it
//! - Probe the server and record the outcome in its `HealthRecord`
//!
//! # Design Decisions
//! - Establishment goes through a `OnceCell`: concurrent first callers wait
//!   for one winner, a failure leaves the cell empty for the next attempt
//! - Nothing here enforces a timeout; callers bound probes themselves
//! - Probes never return errors; failures are recorded as Down

use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::config::ServerSettings;
use crate::health::probe::{self, SLAVE_STATUS_QUERY, THREADS_CONNECTED_QUERY};
use crate::health::HealthRecord;
use crate::observability::logging::Logger;
use crate::observability::metrics;
use crate::server::connection::{Connection, Connector, ResultSet, TracedConnection};
use crate::server::types::{ConnectionError, ProbeError, QueryError, Row};

/// One monitored database server.
pub struct ServerNode {
    /// Stable unique identifier.
    name: String,
    /// Connection parameters applied at open time.
    settings: ServerSettings,
    /// Whether query tracing is configured for this server.
    trace_enabled: bool,
    connector: Arc<dyn Connector>,
    connection: OnceCell<Arc<dyn Connection>>,
    health: HealthRecord,
}

impl ServerNode {
    pub fn new(
        name: impl Into<String>,
        settings: ServerSettings,
        connector: Arc<dyn Connector>,
        trace_enabled: bool,
    ) -> Self {
        Self {
            name: name.into(),
            settings,
            trace_enabled,
            connector,
            connection: OnceCell::new(),
            health: HealthRecord::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn settings(&self) -> &ServerSettings {
        &self.settings
    }

    pub fn trace_enabled(&self) -> bool {
        self.trace_enabled
    }

    pub fn health(&self) -> &HealthRecord {
        &self.health
    }

    /// The established connection, if any, for issuing queries through the same pool.
    pub fn connection(&self) -> Option<Arc<dyn Connection>> {
        self.connection.get().cloned()
    }

    /// Open and ping a connection unless one is already established.
    ///
    /// When `trace_enabled` is set and a logger is supplied, every statement
    /// run on the connection is reported to the logger for its lifetime.
    pub async fn ensure_connected(
        &self,
        trace_enabled: bool,
        logger: Option<&Arc<dyn Logger>>,
    ) -> Result<(), ConnectionError> {
        self.connection
            .get_or_try_init(|| self.establish(trace_enabled, logger))
            .await?;
        Ok(())
    }

    async fn establish(
        &self,
        trace_enabled: bool,
        logger: Option<&Arc<dyn Logger>>,
    ) -> Result<Arc<dyn Connection>, ConnectionError> {
        let conn = self
            .connector
            .open(&self.settings)
            .await
            .map_err(|source| ConnectionError::Open {
                server: self.name.clone(),
                source,
            })?;

        conn.ping().await.map_err(|source| ConnectionError::Ping {
            server: self.name.clone(),
            source,
        })?;

        tracing::info!(
            server = %self.name,
            dsn = %self.settings.redacted_dsn(),
            traced = trace_enabled && logger.is_some(),
            "Connection established"
        );

        Ok(match logger {
            Some(sink) if trace_enabled => {
                Arc::new(TracedConnection::new(conn, sink.clone())) as Arc<dyn Connection>
            }
            _ => conn,
        })
    }

    /// Run `statement` and return its first row keyed by column name.
    ///
    /// Does not connect lazily; `ensure_connected` must have succeeded.
    /// The result set is closed on every path and a close failure is only
    /// reported to `logger`.
    pub async fn raw_query(
        &self,
        statement: &str,
        logger: Option<&Arc<dyn Logger>>,
    ) -> Result<Row, QueryError> {
        let conn = self
            .connection()
            .ok_or_else(|| QueryError::NotConnected(self.name.clone()))?;

        let mut rows = conn
            .query(statement)
            .await
            .map_err(|source| QueryError::Execute {
                statement: statement.to_string(),
                source,
            })?;

        let result = read_first_row(rows.as_mut(), statement).await;

        if let Err(err) = rows.close().await {
            if let Some(logger) = logger {
                logger.error(&*err);
            }
        }

        result
    }

    /// Probe the server and record the outcome. Never fails; see `health()`.
    pub async fn check_health(&self, trace_enabled: bool, logger: Option<&Arc<dyn Logger>>) {
        let was_up = self.health.is_up();

        match self.probe(trace_enabled, logger).await {
            Ok(open_connections) => {
                self.health.record_up(open_connections);
                if !was_up {
                    tracing::info!(server = %self.name, open_connections, "Server is up");
                }
            }
            Err(err) => {
                if was_up {
                    tracing::warn!(server = %self.name, error = %err, "Server went down");
                } else {
                    tracing::debug!(server = %self.name, error = %err, "Server still down");
                }
                self.health.mark_down(err);
            }
        }

        metrics::record_server_health(&self.name, &self.health.snapshot());
    }

    async fn probe(
        &self,
        trace_enabled: bool,
        logger: Option<&Arc<dyn Logger>>,
    ) -> Result<i64, ProbeError> {
        self.ensure_connected(trace_enabled, logger).await?;

        // Not every server is a replica; this never decides up/down.
        match self.raw_query(SLAVE_STATUS_QUERY, logger).await {
            Ok(status) => {
                if let Some(lag) = probe::parse_replication_lag(&status) {
                    self.health.set_replication_lag(Some(lag));
                }
            }
            Err(err) => {
                tracing::debug!(server = %self.name, error = %err, "Replication status unavailable");
            }
        }

        let status = self.raw_query(THREADS_CONNECTED_QUERY, logger).await?;
        Ok(probe::parse_threads_connected(&status)?)
    }
}

impl std::fmt::Debug for ServerNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerNode")
            .field("name", &self.name)
            .field("settings", &self.settings)
            .field("trace_enabled", &self.trace_enabled)
            .field("connected", &self.connection.initialized())
            .field("health", &self.health.snapshot())
            .finish()
    }
}

async fn read_first_row(rows: &mut dyn ResultSet, statement: &str) -> Result<Row, QueryError> {
    let values = rows
        .next_row()
        .await
        .map_err(|source| QueryError::Execute {
            statement: statement.to_string(),
            source,
        })?
        .ok_or_else(|| QueryError::NoRows {
            statement: statement.to_string(),
        })?;

    let columns = rows.columns();
    if columns.len() != values.len() {
        return Err(QueryError::Decode {
            statement: statement.to_string(),
            reason: format!("{} columns but {} values", columns.len(), values.len()),
        });
    }

    Ok(columns
        .iter()
        .zip(values)
        .map(|(name, raw)| {
            let text = raw
                .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
                .unwrap_or_default();
            (name.clone(), text)
        })
        .collect())
}
