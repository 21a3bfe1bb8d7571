//! The seam between the session layer and a connected CQL driver
//!
//! [`CqlSession`](crate::CqlSession) does all validation and value mapping;
//! a [`CqlDriver`] only has to ship an already-validated [`ExecutionRequest`]
//! to the cluster and hand back one raw page.

use std::collections::BTreeMap;

use async_trait::async_trait;
use scylla::value::CqlValue;
use uuid::Uuid;

use crate::common::SessionResult;
use crate::metadata::KeyspaceMetadata;
use crate::options::{Consistency, SerialConsistency};
use crate::value::{CqlType, GenericValue};

/// Custom payload key under which the caller identity travels
pub const PROXY_EXECUTE_PAYLOAD_KEY: &str = "ProxyExecute";

/// A single execution, fully resolved from the caller's options
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionRequest {
    pub statement: String,
    pub values: Vec<GenericValue>,
    pub consistency: Consistency,
    pub serial_consistency: SerialConsistency,
    /// Always positive; the session substitutes its default for zero
    pub page_size: i32,
    /// `None` starts from the first page
    pub paging_state: Option<Vec<u8>>,
    pub custom_payload: BTreeMap<String, Vec<u8>>,
    /// Never reuse result metadata cached with a prepared statement; the
    /// table may have been altered since it was prepared.
    pub use_cached_result_metadata: bool,
}

/// Name and declared type of a result column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: String,
    pub typ: CqlType,
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>, typ: CqlType) -> Self {
        Self {
            name: name.into(),
            typ,
        }
    }
}

/// One page of undecoded rows as returned by the driver
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawPage {
    pub columns: Vec<ColumnSpec>,
    /// One entry per column, `None` where the row stores no value
    pub rows: Vec<Vec<Option<CqlValue>>>,
    pub paging_state: Option<Vec<u8>>,
}

/// Connected driver used by the session.
///
/// Implementations must be shareable across tasks; the session calls them
/// concurrently through one `Arc`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CqlDriver: Send + Sync {
    /// Execute one statement and return a single page of results
    async fn execute(&self, request: ExecutionRequest) -> SessionResult<RawPage>;

    /// Resolve once every reachable node reports the same schema version
    async fn await_schema_agreement(&self) -> SessionResult<Uuid>;

    /// Snapshot of one keyspace's metadata
    async fn keyspace_metadata(&self, name: &str) -> SessionResult<KeyspaceMetadata>;

    /// Names of every keyspace known to the cluster metadata
    async fn keyspace_names(&self) -> SessionResult<Vec<String>>;
}
