use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use scylla::client::session::Session;
use scylla::cluster::metadata::{
    CollectionType, ColumnKind as ScyllaColumnKind, ColumnType, Keyspace, NativeType, Strategy,
    Table,
};
use scylla::response::{PagingState, PagingStateResponse};
use scylla::statement::{
    Consistency as ScyllaConsistency, SerialConsistency as ScyllaSerialConsistency,
};
use scylla::value::{CqlValue, Row};
use tracing::warn;
use uuid::Uuid;

use crate::common::{SessionError, SessionResult};
use crate::driver::{ColumnSpec, CqlDriver, ExecutionRequest, RawPage};
use crate::metadata::{
    ColumnKind, ColumnMetadata, KeyspaceMetadata, ReplicationStrategy, TableMetadata,
};
use crate::options::{Consistency, SerialConsistency};
use crate::value::{CqlType, encode};

/// [`CqlDriver`] over a connected `scylla` session
#[derive(Clone)]
pub struct ScyllaDriver {
    session: Arc<Session>,
}

impl ScyllaDriver {
    pub fn new(session: Arc<Session>) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }
}

#[async_trait]
impl CqlDriver for ScyllaDriver {
    async fn execute(&self, request: ExecutionRequest) -> SessionResult<RawPage> {
        // The driver exposes no per-request custom payload; running without
        // it would execute under the connection's own role.
        if !request.custom_payload.is_empty() {
            return Err(SessionError::Unsupported(
                "per-request custom payload (caller identity)".to_string(),
            ));
        }

        let mut prepared = self
            .session
            .prepare(request.statement.as_str())
            .await
            .map_err(|e| SessionError::ExecutionFailed(e.to_string()))?;
        prepared.set_use_cached_result_metadata(request.use_cached_result_metadata);
        prepared.set_consistency(to_scylla_consistency(request.consistency));
        prepared.set_serial_consistency(Some(to_scylla_serial(request.serial_consistency)));
        prepared.set_page_size(request.page_size);

        let bind_types: Vec<(String, CqlType)> = prepared
            .get_variable_col_specs()
            .iter()
            .map(|spec| (spec.name().to_string(), to_cql_type(spec.typ())))
            .collect();
        if bind_types.len() != request.values.len() {
            return Err(SessionError::ParameterCountMismatch {
                expected: bind_types.len(),
                actual: request.values.len(),
            });
        }
        let values = bind_types
            .iter()
            .zip(&request.values)
            .map(|((name, typ), value)| encode(name, typ, value))
            .collect::<SessionResult<Vec<Option<CqlValue>>>>()?;

        let paging_state = match request.paging_state {
            Some(bytes) => PagingState::new_from_raw_bytes(bytes),
            None => PagingState::start(),
        };

        let (result, paging_response) = self
            .session
            .execute_single_page(&prepared, values, paging_state)
            .await
            .map_err(|e| SessionError::ExecutionFailed(e.to_string()))?;

        let paging_state = match paging_response {
            PagingStateResponse::HasMorePages { state } => {
                state.as_bytes_slice().map(|bytes| bytes.to_vec())
            }
            PagingStateResponse::NoMorePages => None,
        };

        if !result.is_rows() {
            return Ok(RawPage {
                paging_state,
                ..RawPage::default()
            });
        }

        let rows_result = result
            .into_rows_result()
            .map_err(|e| SessionError::ExecutionFailed(e.to_string()))?;
        let columns = rows_result
            .column_specs()
            .iter()
            .map(|spec| ColumnSpec::new(spec.name(), to_cql_type(spec.typ())))
            .collect();
        let rows = rows_result
            .rows::<Row>()
            .map_err(|e| SessionError::ExecutionFailed(e.to_string()))?
            .map(|row| {
                row.map(|row| row.columns)
                    .map_err(|e| SessionError::ExecutionFailed(e.to_string()))
            })
            .collect::<SessionResult<Vec<_>>>()?;

        Ok(RawPage {
            columns,
            rows,
            paging_state,
        })
    }

    async fn await_schema_agreement(&self) -> SessionResult<Uuid> {
        let version = self
            .session
            .await_schema_agreement()
            .await
            .map_err(|e| SessionError::ExecutionFailed(e.to_string()))?;

        // Make the new schema visible to metadata readers right away
        if let Err(e) = self.session.refresh_metadata().await {
            warn!(
                error = %e,
                "Metadata refresh after schema agreement failed; metadata may be stale"
            );
        }
        Ok(version)
    }

    async fn keyspace_metadata(&self, name: &str) -> SessionResult<KeyspaceMetadata> {
        let state = self.session.get_cluster_state();
        state
            .get_keyspace(name)
            .map(|keyspace| to_keyspace_metadata(name, keyspace))
            .ok_or_else(|| SessionError::KeyspaceNotFound(name.to_string()))
    }

    async fn keyspace_names(&self) -> SessionResult<Vec<String>> {
        let state = self.session.get_cluster_state();
        Ok(state
            .keyspaces_iter()
            .map(|(name, _)| name.to_string())
            .collect())
    }
}

fn to_scylla_consistency(consistency: Consistency) -> ScyllaConsistency {
    match consistency {
        Consistency::Any => ScyllaConsistency::Any,
        Consistency::One => ScyllaConsistency::One,
        Consistency::Two => ScyllaConsistency::Two,
        Consistency::Three => ScyllaConsistency::Three,
        Consistency::Quorum => ScyllaConsistency::Quorum,
        Consistency::All => ScyllaConsistency::All,
        Consistency::LocalQuorum => ScyllaConsistency::LocalQuorum,
        Consistency::EachQuorum => ScyllaConsistency::EachQuorum,
        Consistency::Serial => ScyllaConsistency::Serial,
        Consistency::LocalSerial => ScyllaConsistency::LocalSerial,
        Consistency::LocalOne => ScyllaConsistency::LocalOne,
    }
}

fn to_scylla_serial(serial: SerialConsistency) -> ScyllaSerialConsistency {
    match serial {
        SerialConsistency::Serial => ScyllaSerialConsistency::Serial,
        SerialConsistency::LocalSerial => ScyllaSerialConsistency::LocalSerial,
    }
}

fn to_cql_type(typ: &ColumnType<'_>) -> CqlType {
    match typ {
        ColumnType::Native(native) => match native {
            NativeType::Ascii => CqlType::Ascii,
            NativeType::Boolean => CqlType::Boolean,
            NativeType::Blob => CqlType::Blob,
            NativeType::Counter => CqlType::Counter,
            NativeType::Decimal => CqlType::Decimal,
            NativeType::Double => CqlType::Double,
            NativeType::Float => CqlType::Float,
            NativeType::Int => CqlType::Int,
            NativeType::BigInt => CqlType::BigInt,
            NativeType::Text => CqlType::Text,
            NativeType::Timestamp => CqlType::Timestamp,
            NativeType::Inet => CqlType::Inet,
            NativeType::SmallInt => CqlType::SmallInt,
            NativeType::TinyInt => CqlType::TinyInt,
            NativeType::Timeuuid => CqlType::Timeuuid,
            NativeType::Uuid => CqlType::Uuid,
            NativeType::Varint => CqlType::Varint,
            other => CqlType::Unsupported(format!("{other:?}").to_ascii_lowercase()),
        },
        ColumnType::Collection { typ, .. } => match typ {
            CollectionType::List(element) => CqlType::list(to_cql_type(element)),
            CollectionType::Set(element) => CqlType::set(to_cql_type(element)),
            CollectionType::Map(key, value) => CqlType::map(to_cql_type(key), to_cql_type(value)),
            other => CqlType::Unsupported(format!("{other:?}")),
        },
        other => CqlType::Unsupported(format!("{other:?}")),
    }
}

fn to_keyspace_metadata(name: &str, keyspace: &Keyspace) -> KeyspaceMetadata {
    KeyspaceMetadata {
        name: name.to_string(),
        replication: to_replication(&keyspace.strategy),
        tables: keyspace
            .tables
            .iter()
            .map(|(table_name, table)| (table_name.clone(), to_table_metadata(table_name, table)))
            .collect(),
    }
}

#[allow(unreachable_patterns)]
fn to_replication(strategy: &Strategy) -> ReplicationStrategy {
    match strategy {
        Strategy::SimpleStrategy { replication_factor } => ReplicationStrategy::Simple {
            replication_factor: *replication_factor,
        },
        Strategy::NetworkTopologyStrategy {
            datacenter_repfactors,
        } => ReplicationStrategy::NetworkTopology {
            datacenters: datacenter_repfactors
                .iter()
                .map(|(dc, factor)| (dc.clone(), *factor))
                .collect(),
        },
        Strategy::LocalStrategy => ReplicationStrategy::Local,
        Strategy::Other { name, data } => ReplicationStrategy::Other {
            class: name.clone(),
            options: data.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        },
        other => ReplicationStrategy::Other {
            class: format!("{other:?}"),
            options: BTreeMap::new(),
        },
    }
}

#[allow(unreachable_patterns)]
fn to_table_metadata(name: &str, table: &Table) -> TableMetadata {
    let columns = table
        .columns
        .iter()
        .map(|(column_name, column)| {
            let kind = match column.kind {
                ScyllaColumnKind::PartitionKey => ColumnKind::PartitionKey,
                ScyllaColumnKind::Clustering => ColumnKind::Clustering,
                ScyllaColumnKind::Static => ColumnKind::Static,
                _ => ColumnKind::Regular,
            };
            let metadata = ColumnMetadata {
                name: column_name.clone(),
                typ: to_cql_type(&column.typ),
                kind,
            };
            (column_name.clone(), metadata)
        })
        .collect();

    TableMetadata {
        name: name.to_string(),
        partition_key: table.partition_key.clone(),
        clustering_key: table.clustering_key.clone(),
        columns,
    }
}
