//! Schema mutations built from validated identifiers
//!
//! Statement builders are pure functions so the generated CQL can be checked
//! without a cluster. The `CqlSession` helpers run them through
//! [`CqlSession::change_schema`], so the agreement-wait rules apply.

use tracing::instrument;

use crate::common::{SessionError, SessionResult};
use crate::driver::CqlDriver;
use crate::metadata::DataCenterReplicas;
use crate::options::QueryOptions;
use crate::session::CqlSession;
use crate::value::CqlType;

const MAX_IDENTIFIER_LENGTH: usize = 48;

/// Check a keyspace, table, or column name and return it double-quoted
pub fn quote_identifier(name: &str) -> SessionResult<String> {
    let mut chars = name.chars();
    let valid = name.len() <= MAX_IDENTIFIER_LENGTH
        && chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

    if valid {
        Ok(format!("\"{name}\""))
    } else {
        Err(SessionError::InvalidIdentifier(name.to_string()))
    }
}

fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

fn qualified(keyspace: &str, table: &str) -> SessionResult<String> {
    Ok(format!("{}.{}", quote_identifier(keyspace)?, quote_identifier(table)?))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum::Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum ClusteringOrder {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDefinition {
    pub name: String,
    pub typ: CqlType,
}

impl ColumnDefinition {
    pub fn new(name: impl Into<String>, typ: CqlType) -> Self {
        Self {
            name: name.into(),
            typ,
        }
    }

    fn render(&self) -> SessionResult<String> {
        if let CqlType::Unsupported(name) = &self.typ {
            return Err(SessionError::InvalidDefinition(format!(
                "column '{}' has unsupported type '{name}'",
                self.name
            )));
        }
        Ok(format!("{} {}", quote_identifier(&self.name)?, self.typ))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusteringKey {
    pub column: ColumnDefinition,
    pub order: ClusteringOrder,
}

/// Shape of a table to create
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDefinition {
    pub keyspace: String,
    pub name: String,
    pub partition_keys: Vec<ColumnDefinition>,
    pub clustering_keys: Vec<ClusteringKey>,
    pub values: Vec<ColumnDefinition>,
}

impl TableDefinition {
    pub fn new(keyspace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            keyspace: keyspace.into(),
            name: name.into(),
            partition_keys: Vec::new(),
            clustering_keys: Vec::new(),
            values: Vec::new(),
        }
    }

    pub fn with_partition_key(mut self, name: impl Into<String>, typ: CqlType) -> Self {
        self.partition_keys.push(ColumnDefinition::new(name, typ));
        self
    }

    pub fn with_clustering_key(
        mut self,
        name: impl Into<String>,
        typ: CqlType,
        order: ClusteringOrder,
    ) -> Self {
        self.clustering_keys.push(ClusteringKey {
            column: ColumnDefinition::new(name, typ),
            order,
        });
        self
    }

    pub fn with_value(mut self, name: impl Into<String>, typ: CqlType) -> Self {
        self.values.push(ColumnDefinition::new(name, typ));
        self
    }
}

pub fn create_keyspace_statement(
    name: &str,
    dc_replicas: &[DataCenterReplicas],
) -> SessionResult<String> {
    if dc_replicas.is_empty() {
        return Err(SessionError::InvalidDefinition(
            "at least one data center is required".to_string(),
        ));
    }

    let mut replication = String::from("'class': 'NetworkTopologyStrategy'");
    for dc in dc_replicas {
        if dc.replicas == 0 {
            return Err(SessionError::InvalidDefinition(format!(
                "data center '{}' needs at least one replica",
                dc.name
            )));
        }
        replication.push_str(&format!(", {}: {}", quote_literal(&dc.name), dc.replicas));
    }

    Ok(format!(
        "CREATE KEYSPACE IF NOT EXISTS {} WITH REPLICATION = {{ {replication} }}",
        quote_identifier(name)?
    ))
}

pub fn drop_keyspace_statement(name: &str) -> SessionResult<String> {
    Ok(format!("DROP KEYSPACE {}", quote_identifier(name)?))
}

pub fn create_table_statement(table: &TableDefinition) -> SessionResult<String> {
    if table.partition_keys.is_empty() {
        return Err(SessionError::InvalidDefinition(format!(
            "table '{}' needs at least one partition key",
            table.name
        )));
    }

    let mut columns = Vec::new();
    for column in table
        .partition_keys
        .iter()
        .chain(table.clustering_keys.iter().map(|key| &key.column))
        .chain(table.values.iter())
    {
        columns.push(column.render()?);
    }

    let partition = table
        .partition_keys
        .iter()
        .map(|column| quote_identifier(&column.name))
        .collect::<SessionResult<Vec<_>>>()?
        .join(", ");
    let mut primary_key = format!("({partition})");
    for key in &table.clustering_keys {
        primary_key.push_str(", ");
        primary_key.push_str(&quote_identifier(&key.column.name)?);
    }

    let mut statement = format!(
        "CREATE TABLE IF NOT EXISTS {} ({}, PRIMARY KEY ({primary_key}))",
        qualified(&table.keyspace, &table.name)?,
        columns.join(", ")
    );

    if !table.clustering_keys.is_empty() {
        let order = table
            .clustering_keys
            .iter()
            .map(|key| {
                let name = quote_identifier(&key.column.name)?;
                Ok::<_, SessionError>(format!("{name} {}", key.order))
            })
            .collect::<SessionResult<Vec<_>>>()?
            .join(", ");
        statement.push_str(&format!(" WITH CLUSTERING ORDER BY ({order})"));
    }
    Ok(statement)
}

pub fn alter_table_add_statement(
    keyspace: &str,
    table: &str,
    columns: &[ColumnDefinition],
) -> SessionResult<String> {
    if columns.is_empty() {
        return Err(SessionError::InvalidDefinition("no columns to add".to_string()));
    }
    let columns = columns
        .iter()
        .map(ColumnDefinition::render)
        .collect::<SessionResult<Vec<_>>>()?;
    Ok(format!(
        "ALTER TABLE {} ADD ({})",
        qualified(keyspace, table)?,
        columns.join(", ")
    ))
}

pub fn alter_table_drop_statement(
    keyspace: &str,
    table: &str,
    columns: &[&str],
) -> SessionResult<String> {
    if columns.is_empty() {
        return Err(SessionError::InvalidDefinition("no columns to drop".to_string()));
    }
    let columns = columns
        .iter()
        .map(|name| quote_identifier(name))
        .collect::<SessionResult<Vec<_>>>()?;
    Ok(format!(
        "ALTER TABLE {} DROP ({})",
        qualified(keyspace, table)?,
        columns.join(", ")
    ))
}

pub fn drop_table_statement(keyspace: &str, table: &str) -> SessionResult<String> {
    Ok(format!("DROP TABLE {}", qualified(keyspace, table)?))
}

/// Schema mutation helpers. Each returns `Ok(true)` once the change is
/// executed (and agreed, when the options ask for it).
impl<D: CqlDriver> CqlSession<D> {
    #[instrument(skip(self, dc_replicas, options))]
    pub async fn create_keyspace(
        &self,
        name: &str,
        dc_replicas: &[DataCenterReplicas],
        options: &QueryOptions,
    ) -> SessionResult<bool> {
        let statement = create_keyspace_statement(name, dc_replicas)?;
        self.change_schema(&statement, options).await?;
        Ok(true)
    }

    #[instrument(skip(self, options))]
    pub async fn drop_keyspace(&self, name: &str, options: &QueryOptions) -> SessionResult<bool> {
        let statement = drop_keyspace_statement(name)?;
        self.change_schema(&statement, options).await?;
        Ok(true)
    }

    #[instrument(skip_all, fields(keyspace = %table.keyspace, table = %table.name))]
    pub async fn create_table(
        &self,
        table: &TableDefinition,
        options: &QueryOptions,
    ) -> SessionResult<bool> {
        let statement = create_table_statement(table)?;
        self.change_schema(&statement, options).await?;
        Ok(true)
    }

    #[instrument(skip(self, columns, options))]
    pub async fn alter_table_add(
        &self,
        keyspace: &str,
        table: &str,
        columns: &[ColumnDefinition],
        options: &QueryOptions,
    ) -> SessionResult<bool> {
        let statement = alter_table_add_statement(keyspace, table, columns)?;
        self.change_schema(&statement, options).await?;
        Ok(true)
    }

    #[instrument(skip(self, options))]
    pub async fn alter_table_drop(
        &self,
        keyspace: &str,
        table: &str,
        columns: &[&str],
        options: &QueryOptions,
    ) -> SessionResult<bool> {
        let statement = alter_table_drop_statement(keyspace, table, columns)?;
        self.change_schema(&statement, options).await?;
        Ok(true)
    }

    #[instrument(skip(self, options))]
    pub async fn drop_table(
        &self,
        keyspace: &str,
        table: &str,
        options: &QueryOptions,
    ) -> SessionResult<bool> {
        let statement = drop_table_statement(keyspace, table)?;
        self.change_schema(&statement, options).await?;
        Ok(true)
    }
}
