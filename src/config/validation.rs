//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check server names are present and unique
//! - Check DSNs and pool limits are usable
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: BalancerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;

use thiserror::Error;
use url::Url;

use crate::config::schema::BalancerConfig;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no servers configured")]
    NoServers,

    #[error("server #{0} has an empty name")]
    EmptyName(usize),

    #[error("server name `{0}` is used more than once")]
    DuplicateName(String),

    #[error("server `{server}` has an invalid dsn: {reason}")]
    InvalidDsn { server: String, reason: String },

    #[error("server `{0}` must allow at least one open connection")]
    NoOpenConnections(String),

    #[error("server `{server}` keeps {idle} idle connections but may only open {open}")]
    IdleExceedsOpen { server: String, idle: u32, open: u32 },

    #[error("health_check.timeout_secs must be greater than zero")]
    ZeroProbeTimeout,

    #[error("server `{server}` connect timeout of {connect_secs}s must be non-zero and below health_check.timeout_secs ({probe_secs}s)")]
    ConnectTimeoutOutOfRange {
        server: String,
        connect_secs: u64,
        probe_secs: u64,
    },
}

pub fn validate_config(config: &BalancerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.servers.is_empty() {
        errors.push(ValidationError::NoServers);
    }

    let mut seen = HashSet::new();
    for (i, server) in config.servers.iter().enumerate() {
        if server.name.trim().is_empty() {
            errors.push(ValidationError::EmptyName(i));
        } else if !seen.insert(server.name.as_str()) {
            errors.push(ValidationError::DuplicateName(server.name.clone()));
        }

        if let Err(reason) = check_dsn(&server.settings.dsn) {
            errors.push(ValidationError::InvalidDsn {
                server: server.name.clone(),
                reason,
            });
        }

        let settings = &server.settings;
        if settings.max_open_connections == 0 {
            errors.push(ValidationError::NoOpenConnections(server.name.clone()));
        } else if settings.max_idle_connections > settings.max_open_connections {
            errors.push(ValidationError::IdleExceedsOpen {
                server: server.name.clone(),
                idle: settings.max_idle_connections,
                open: settings.max_open_connections,
            });
        }

        // Driver errors must surface before the health check timeout fires.
        let probe_secs = config.health_check.timeout_secs;
        if probe_secs > 0
            && (settings.connect_timeout_secs == 0 || settings.connect_timeout_secs >= probe_secs)
        {
            errors.push(ValidationError::ConnectTimeoutOutOfRange {
                server: server.name.clone(),
                connect_secs: settings.connect_timeout_secs,
                probe_secs,
            });
        }
    }

    if config.health_check.timeout_secs == 0 {
        errors.push(ValidationError::ZeroProbeTimeout);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_dsn(dsn: &str) -> Result<(), String> {
    let url = Url::parse(dsn).map_err(|e| e.to_string())?;
    if url.scheme() != "mysql" {
        return Err(format!("unsupported scheme `{}`", url.scheme()));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err("missing host".to_string());
    }
    Ok(())
}
