//! Database load balancer health check (v1)
//!
//! Loads the server list, probes every server once and prints what the
//! routing layer would see.
//!
//! # Architecture Overview
//!
//! ```text
//!   db-balancer.toml
//!         │
//!         ▼
//!   ┌───────────┐     ┌────────────┐     ┌──────────────────────────┐
//!   │  config   │────▶│ ServerPool │────▶│ ServerNode (per server)  │
//!   │ loader    │     │ check_all  │     │  ensure_connected        │
//!   └───────────┘     └─────┬──────┘     │  SHOW SLAVE STATUS       │──▶ MySQL
//!                           │            │  SHOW STATUS Threads_... │
//!                           │            └────────────┬─────────────┘
//!                           │                         ▼
//!                           │                 ┌───────────────┐
//!                           └────────────────▶│ HealthRecord  │──▶ report
//!                                             └───────────────┘
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use db_balancer::config::{self, BalancerConfig};
use db_balancer::observability::logging::init_logging;
use db_balancer::server::{MySqlConnector, ServerPool, ServerReport};
use db_balancer::{Logger, TracingLogger};

#[derive(Parser)]
#[command(name = "db-balancer")]
#[command(about = "Probe backend database servers and report their health", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "db-balancer.toml")]
    config: PathBuf,

    /// Trace every diagnostic statement, regardless of per-server settings.
    #[arg(long)]
    trace: bool,

    /// Print reports as JSON.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config: BalancerConfig = config::load_config(&cli.config)?;
    if cli.trace {
        for server in &mut config.servers {
            server.trace_queries = true;
        }
    }

    init_logging(&config.observability);

    tracing::info!(
        config = %cli.config.display(),
        servers = config.servers.len(),
        probe_timeout_secs = config.health_check.timeout_secs,
        "Configuration loaded"
    );

    let pool = ServerPool::from_config(&config, Arc::new(MySqlConnector::new()));
    let logger: Arc<dyn Logger> = Arc::new(TracingLogger);
    pool.check_all(Some(logger)).await;

    let reports = pool.reports();
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for report in &reports {
            println!("{}", format_report(report));
        }
    }

    if pool.up_servers().is_empty() {
        tracing::error!("No server is up");
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn format_report(report: &ServerReport) -> String {
    let health = &report.health;
    let lag = health
        .seconds_behind_master
        .map_or_else(|| "-".to_string(), |s| format!("{}s", s));

    if health.up {
        format!(
            "{:<20} UP    connections={:<6} lag={}",
            report.name, health.open_connections, lag
        )
    } else {
        format!(
            "{:<20} DOWN  error={}",
            report.name,
            health.last_error.as_deref().unwrap_or("not probed")
        )
    }
}
