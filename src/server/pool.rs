//! Server pool management.
//!
//! # Responsibilities
//! - Build one `ServerNode` per configured server
//! - Look servers up by name for routing collaborators
//! - Run a single round of probes across all servers

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use serde::Serialize;
use tokio::time;

use crate::config::BalancerConfig;
use crate::health::HealthSnapshot;
use crate::observability::logging::Logger;
use crate::server::connection::Connector;
use crate::server::node::ServerNode;

/// Name plus health of one server, as handed to reporting code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerReport {
    pub name: String,
    #[serde(flatten)]
    pub health: HealthSnapshot,
}

/// The set of monitored servers.
#[derive(Debug)]
pub struct ServerPool {
    servers: Vec<Arc<ServerNode>>,
    probe_timeout: Duration,
}

impl ServerPool {
    pub fn new(servers: Vec<Arc<ServerNode>>, probe_timeout: Duration) -> Self {
        Self {
            servers,
            probe_timeout,
        }
    }

    /// Create a pool from validated configuration, sharing one connector.
    pub fn from_config(config: &BalancerConfig, connector: Arc<dyn Connector>) -> Self {
        let servers = config
            .servers
            .iter()
            .map(|server| {
                Arc::new(ServerNode::new(
                    server.name.clone(),
                    server.settings.clone(),
                    connector.clone(),
                    server.trace_queries,
                ))
            })
            .collect();

        Self::new(servers, Duration::from_secs(config.health_check.timeout_secs))
    }

    pub fn get(&self, name: &str) -> Option<Arc<ServerNode>> {
        self.servers.iter().find(|s| s.name() == name).cloned()
    }

    pub fn all_servers(&self) -> &[Arc<ServerNode>] {
        &self.servers
    }

    /// Servers whose last probe succeeded.
    pub fn up_servers(&self) -> Vec<Arc<ServerNode>> {
        self.servers
            .iter()
            .filter(|s| s.health().is_up())
            .cloned()
            .collect()
    }

    /// Probe every server once, concurrently.
    ///
    /// Each probe is bounded by the pool's timeout; a server whose probe
    /// times out keeps its last known state.
    pub async fn check_all(&self, logger: Option<Arc<dyn Logger>>) {
        let logger = logger.as_ref();
        let timeout = self.probe_timeout;

        let probes = self.servers.iter().map(move |server| async move {
            let probe = server.check_health(server.trace_enabled(), logger);
            if time::timeout(timeout, probe).await.is_err() {
                tracing::warn!(
                    server = %server.name(),
                    timeout_secs = timeout.as_secs_f64(),
                    "Health probe timed out, keeping last known state"
                );
            }
        });

        join_all(probes).await;

        tracing::debug!(
            total = self.servers.len(),
            up = self.up_servers().len(),
            "Health check round complete"
        );
    }

    pub fn reports(&self) -> Vec<ServerReport> {
        self.servers
            .iter()
            .map(|s| ServerReport {
                name: s.name().to_string(),
                health: s.health().snapshot(),
            })
            .collect()
    }
}
