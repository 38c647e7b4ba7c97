//! MySQL driver backed by `sqlx`.
//!
//! # Responsibilities
//! - Translate `ServerSettings` into a lazily connecting `MySqlPool`
//! - Check liveness over a dedicated connection
//! - Run diagnostic statements over the text protocol
//!
//! # Design Decisions
//! - `open` does not touch the network; `ping` makes the first round trip
//! - `ping` bypasses the pool, whose acquire loop retries refused
//!   connections and would report only `PoolTimedOut`
//! - Every network wait is bounded by `connect_timeout_secs`, which
//!   validation keeps below `health_check.timeout_secs`
//! - sqlx has no idle cap, so `max_idle_connections` becomes the warm minimum

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::TryStreamExt;
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions};
use sqlx::{Column, ConnectOptions, Connection as _, Row as _};
use tokio::time;
use url::Url;

use crate::config::ServerSettings;
use crate::server::connection::{BufferedResultSet, Connection, Connector, RawRow, ResultSet};
use crate::server::types::DriverError;

const SCHEME: &str = "mysql";

/// `Connector` for MySQL-compatible servers.
#[derive(Debug, Default, Clone)]
pub struct MySqlConnector;

impl MySqlConnector {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Connector for MySqlConnector {
    async fn open(&self, settings: &ServerSettings) -> Result<Arc<dyn Connection>, DriverError> {
        // sqlx parses any URL; the scheme is not checked there.
        let url = Url::parse(&settings.dsn)?;
        if url.scheme() != SCHEME {
            return Err(format!("unsupported dsn scheme `{}`", url.scheme()).into());
        }

        let options: MySqlConnectOptions = settings.dsn.parse()?;
        let max_open = settings.max_open_connections.max(1);
        let connect_timeout = settings.connect_timeout();

        let pool = MySqlPoolOptions::new()
            .max_connections(max_open)
            .min_connections(settings.max_idle_connections.min(max_open))
            .acquire_timeout(connect_timeout)
            .connect_lazy_with(options.clone());

        tracing::debug!(
            dsn = %settings.redacted_dsn(),
            max_open = max_open,
            connect_timeout_secs = settings.connect_timeout_secs,
            "MySQL pool created"
        );

        Ok(Arc::new(MySqlHandle {
            pool,
            options,
            connect_timeout,
        }))
    }
}

/// Pooled MySQL connection handle.
#[derive(Debug, Clone)]
struct MySqlHandle {
    pool: MySqlPool,
    options: MySqlConnectOptions,
    connect_timeout: Duration,
}

#[async_trait]
impl Connection for MySqlHandle {
    async fn ping(&self) -> Result<(), DriverError> {
        let check = async {
            let mut conn = self.options.connect().await?;
            conn.ping().await?;
            conn.close().await
        };

        match time::timeout(self.connect_timeout, check).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(format!("no response within {:?}", self.connect_timeout).into()),
        }
    }

    async fn query(&self, statement: &str) -> Result<Box<dyn ResultSet>, DriverError> {
        let mut stream = sqlx::raw_sql(statement).fetch(&self.pool);

        let mut columns = Vec::new();
        let mut rows: Vec<RawRow> = Vec::new();
        while let Some(row) = stream.try_next().await? {
            if rows.is_empty() {
                columns = row.columns().iter().map(|c| c.name().to_string()).collect();
            }
            let values = (0..row.len())
                .map(|i| row.try_get_unchecked::<Option<Vec<u8>>, _>(i))
                .collect::<Result<RawRow, _>>()?;
            rows.push(values);
        }

        if rows.is_empty() {
            return Ok(Box::new(BufferedResultSet::empty()));
        }
        Ok(Box::new(BufferedResultSet::new(columns, rows)))
    }
}
