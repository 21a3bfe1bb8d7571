//! Cassandra/ScyllaDB connection and driver adapter
//!
//! Uses the `scylla` driver, which speaks to both Apache Cassandra and
//! ScyllaDB.
//!
//! # Example
//!
//! ```ignore
//! use cql_session::cassandra::{ClusterConfig, connect_from_config};
//! use cql_session::QueryOptions;
//!
//! let config = ClusterConfig::new(vec!["127.0.0.1:9042"])
//!     .with_datacenter("dc1")
//!     .with_credentials("user", "password");
//! let session = connect_from_config(&config).await?;
//!
//! let result = session
//!     .execute("SELECT * FROM library.books", &QueryOptions::new(), vec![])
//!     .await?;
//! ```

mod config;
mod connector;
mod scylla_driver;

pub use config::ClusterConfig;
pub use connector::connect_from_config;
pub use scylla_driver::ScyllaDriver;

// Re-export scylla types for convenience
pub use scylla::client::session::Session;
pub use scylla::client::session_builder::SessionBuilder;
pub use scylla::value::CqlValue;
