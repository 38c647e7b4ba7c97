//! Backend server subsystem.
//!
//! # Data Flow
//! ```text
//! BalancerConfig.servers
//!     → pool.rs (one ServerNode per server, shared Connector)
//!     → node.rs (lazy connection, raw queries, health probe)
//!     → connection.rs (driver traits, trace decorator)
//!     → mysql.rs (sqlx-backed driver)
//! ```
//!
//! # Design Decisions
//! - At most one connection handle per node, never shared across nodes
//! - Driver is pluggable behind `Connector`/`Connection`
//! - Errors are typed per stage (types.rs) and unified as `ProbeError`

pub mod connection;
pub mod mysql;
pub mod node;
pub mod pool;
pub mod types;

pub use connection::{Connection, Connector, ResultSet};
pub use mysql::MySqlConnector;
pub use node::ServerNode;
pub use pool::{ServerPool, ServerReport};
pub use types::{ConnectionError, ParseError, ProbeError, QueryError, Row};
