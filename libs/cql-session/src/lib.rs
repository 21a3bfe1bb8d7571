//! CQL session layer for a schema-driven data API
//!
//! Sits between API front ends (GraphQL/REST style CRUD) and a
//! Cassandra-compatible cluster. It executes parameterized statements with
//! per-request consistency, caller identity, and paging, decodes rows into
//! the driver-independent [`GenericValue`] model, and runs schema changes
//! with an optional wait for cluster-wide schema agreement.
//!
//! # Example
//!
//! ```ignore
//! use cql_session::cassandra::{ClusterConfig, connect_from_config};
//! use cql_session::{Consistency, GenericValue, QueryOptions};
//!
//! let session = connect_from_config(&ClusterConfig::new(vec!["127.0.0.1:9042"])).await?;
//!
//! let options = QueryOptions::new()
//!     .with_consistency(Consistency::LocalQuorum)
//!     .with_page_size(100);
//! let page = session
//!     .execute("SELECT * FROM library.books WHERE author = ?", &options, vec!["Le Guin".into()])
//!     .await?;
//!
//! if let Some(state) = page.page_state() {
//!     let next = session
//!         .execute(
//!             "SELECT * FROM library.books WHERE author = ?",
//!             &options.clone().with_page_state(state),
//!             vec!["Le Guin".into()],
//!         )
//!         .await?;
//! }
//! ```

pub mod cassandra;
pub mod common;
pub mod ddl;
pub mod driver;
pub mod metadata;
pub mod options;
pub mod result_set;
pub mod schema_change;
pub mod session;
pub mod value;

pub use common::{SessionError, SessionResult};
pub use ddl::{ClusteringOrder, ColumnDefinition, TableDefinition};
pub use driver::{ColumnSpec, CqlDriver, ExecutionRequest, RawPage};
pub use metadata::{
    ColumnKind, ColumnMetadata, DataCenterReplicas, KeyspaceMetadata, ReplicationStrategy,
    TableMetadata,
};
pub use options::{Consistency, QueryOptions, SerialConsistency};
pub use result_set::{ResultSet, Row};
pub use schema_change::{SchemaChangeCoordinator, SchemaChangeOutcome, SchemaChangeState};
pub use session::{CqlSession, DEFAULT_PAGE_SIZE};
pub use value::{CqlType, Decimal, GenericValue};

// Re-exported so callers can build cancellation signals without a direct dependency
pub use tokio_util::sync::CancellationToken;
