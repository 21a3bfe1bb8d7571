//! Read-only keyspace metadata snapshots
//!
//! Snapshots are plain values detached from the driver; take a new one after
//! a schema change to see its effect.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::warn;

use crate::value::CqlType;

const NETWORK_TOPOLOGY_STRATEGY: &str = "NetworkTopologyStrategy";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplicationStrategy {
    Simple { replication_factor: usize },
    NetworkTopology { datacenters: BTreeMap<String, usize> },
    Local,
    /// Any other strategy, with its raw options
    Other {
        class: String,
        options: BTreeMap<String, String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ColumnKind {
    PartitionKey,
    Clustering,
    Regular,
    Static,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMetadata {
    pub name: String,
    pub typ: CqlType,
    pub kind: ColumnKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableMetadata {
    pub name: String,
    /// Partition key columns in key order
    pub partition_key: Vec<String>,
    /// Clustering columns in key order
    pub clustering_key: Vec<String>,
    pub columns: BTreeMap<String, ColumnMetadata>,
}

impl TableMetadata {
    pub fn column(&self, name: &str) -> Option<&ColumnMetadata> {
        self.columns.get(name)
    }

    /// Partition key followed by clustering key
    pub fn primary_key(&self) -> impl Iterator<Item = &str> {
        self.partition_key
            .iter()
            .chain(self.clustering_key.iter())
            .map(String::as_str)
    }
}

/// Replica count configured for one data center
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataCenterReplicas {
    pub name: String,
    pub replicas: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyspaceMetadata {
    pub name: String,
    pub replication: ReplicationStrategy,
    pub tables: BTreeMap<String, TableMetadata>,
}

impl KeyspaceMetadata {
    pub fn table(&self, name: &str) -> Option<&TableMetadata> {
        self.tables.get(name)
    }

    pub fn tables(&self) -> impl Iterator<Item = &TableMetadata> {
        self.tables.values()
    }

    /// Per data center replica counts, sorted by name. Empty unless the
    /// keyspace uses `NetworkTopologyStrategy`.
    pub fn data_centers(&self) -> Vec<DataCenterReplicas> {
        match &self.replication {
            ReplicationStrategy::NetworkTopology { datacenters } => datacenters
                .iter()
                .map(|(name, replicas)| DataCenterReplicas {
                    name: name.clone(),
                    replicas: *replicas,
                })
                .collect(),
            ReplicationStrategy::Other { class, options }
                if class.ends_with(NETWORK_TOPOLOGY_STRATEGY) =>
            {
                options
                    .iter()
                    .filter(|(name, _)| name.as_str() != "class")
                    .filter_map(|(name, value)| match value.parse() {
                        Ok(replicas) => Some(DataCenterReplicas {
                            name: name.clone(),
                            replicas,
                        }),
                        Err(_) => {
                            warn!(
                                keyspace = %self.name,
                                dc = %name,
                                value = %value,
                                "Skipping invalid replica count"
                            );
                            None
                        }
                    })
                    .collect()
            }
            _ => Vec::new(),
        }
    }
}
