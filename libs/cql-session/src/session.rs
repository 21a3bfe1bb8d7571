use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::common::{SessionError, SessionResult};
use crate::driver::{CqlDriver, ExecutionRequest, PROXY_EXECUTE_PAYLOAD_KEY, RawPage};
use crate::metadata::KeyspaceMetadata;
use crate::options::QueryOptions;
use crate::result_set::{ResultSet, Row};
use crate::schema_change::SchemaChangeCoordinator;
use crate::value::{GenericValue, decode};

/// Rows per page when the caller leaves the page size at zero
pub const DEFAULT_PAGE_SIZE: i32 = 5000;

/// Shared handle for executing CQL on behalf of API requests.
///
/// Cloning is cheap and every clone talks to the same driver. Executions
/// share nothing mutable: each one builds its own request and result set.
///
/// # Example
///
/// ```ignore
/// use cql_session::{CqlSession, QueryOptions, Consistency, GenericValue};
///
/// let options = QueryOptions::new().with_consistency(Consistency::LocalQuorum);
/// let result = session
///     .execute("SELECT * FROM ks.users WHERE id = ?", &options, vec![GenericValue::Int32(7)])
///     .await?;
/// for row in result.rows() {
///     println!("{}", row.to_json());
/// }
/// ```
pub struct CqlSession<D: CqlDriver> {
    driver: Arc<D>,
    default_page_size: i32,
}

impl<D: CqlDriver> Clone for CqlSession<D> {
    fn clone(&self) -> Self {
        Self {
            driver: Arc::clone(&self.driver),
            default_page_size: self.default_page_size,
        }
    }
}

impl<D: CqlDriver> CqlSession<D> {
    pub fn new(driver: D) -> Self {
        Self::from_shared(Arc::new(driver))
    }

    pub fn from_shared(driver: Arc<D>) -> Self {
        Self {
            driver,
            default_page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Page size used when a query leaves it at zero. Non-positive values keep the current default.
    pub fn with_default_page_size(mut self, page_size: i32) -> Self {
        if page_size > 0 {
            self.default_page_size = page_size;
        }
        self
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn default_page_size(&self) -> i32 {
        self.default_page_size
    }

    /// Execute one statement and decode a single page of rows.
    ///
    /// Parameter count and serial consistency are checked before anything
    /// is sent. Driver failures come back unchanged and are never retried.
    #[instrument(skip(self, options, params), fields(consistency = %options.consistency()))]
    pub async fn execute(
        &self,
        statement: &str,
        options: &QueryOptions,
        params: Vec<GenericValue>,
    ) -> SessionResult<ResultSet> {
        let request = self.prepare_request(statement, options, params)?;
        debug!(
            statement,
            page_size = request.page_size,
            proxied = !request.custom_payload.is_empty(),
            "Executing statement"
        );

        let page = self.driver.execute(request).await?;
        let result = decode_page(page)?;

        debug!(rows = result.len(), has_more_pages = result.has_more_pages(), "Statement executed");
        Ok(result)
    }

    /// Execute for side effects only
    pub async fn execute_no_result(
        &self,
        statement: &str,
        options: &QueryOptions,
        params: Vec<GenericValue>,
    ) -> SessionResult<()> {
        self.execute(statement, options, params).await.map(|_| ())
    }

    /// Execute a DDL statement, then wait for schema agreement if the
    /// options carry a deadline or cancellation token.
    pub async fn change_schema(
        &self,
        statement: &str,
        options: &QueryOptions,
    ) -> SessionResult<()> {
        SchemaChangeCoordinator::new(self)
            .apply(statement, options)
            .await
            .map(|_| ())
    }

    #[instrument(skip(self))]
    pub async fn keyspace_metadata(&self, name: &str) -> SessionResult<KeyspaceMetadata> {
        self.driver.keyspace_metadata(name).await
    }

    /// Keyspace names known to the cluster, sorted
    pub async fn keyspaces(&self) -> SessionResult<Vec<String>> {
        let mut names = self.driver.keyspace_names().await?;
        names.sort();
        names.dedup();
        Ok(names)
    }

    fn prepare_request(
        &self,
        statement: &str,
        options: &QueryOptions,
        params: Vec<GenericValue>,
    ) -> SessionResult<ExecutionRequest> {
        let expected = count_bind_markers(statement);
        if expected != params.len() {
            return Err(SessionError::ParameterCountMismatch {
                expected,
                actual: params.len(),
            });
        }

        let serial_consistency = options
            .serial_consistency()
            .as_serial()
            .ok_or(SessionError::InvalidConsistency(options.serial_consistency()))?;

        let page_size = match options.page_size() {
            size if size > 0 => size,
            _ => self.default_page_size,
        };

        let mut custom_payload = BTreeMap::new();
        if let Some(identity) = options.user_or_role() {
            custom_payload.insert(
                PROXY_EXECUTE_PAYLOAD_KEY.to_string(),
                identity.as_bytes().to_vec(),
            );
        }

        Ok(ExecutionRequest {
            statement: statement.to_string(),
            values: params,
            consistency: options.consistency(),
            serial_consistency,
            page_size,
            paging_state: options.page_state().map(<[u8]>::to_vec),
            custom_payload,
            use_cached_result_metadata: false,
        })
    }
}

fn decode_page(page: RawPage) -> SessionResult<ResultSet> {
    let RawPage {
        columns,
        rows,
        paging_state,
    } = page;

    let rows = rows
        .into_iter()
        .map(|mut raw| {
            let mut row = Row::default();
            for (index, column) in columns.iter().enumerate() {
                // Columns the driver did not return for this row read as Null
                let value = raw.get_mut(index).and_then(Option::take);
                row.insert(&column.name, decode(&column.name, &column.typ, value)?);
            }
            Ok::<_, SessionError>(row)
        })
        .collect::<SessionResult<Vec<_>>>()?;

    Ok(ResultSet::new(columns, rows, paging_state))
}

/// Count bind markers, ignoring string literals, quoted identifiers, and
/// comments.
///
/// Both positional `?` and named `:name` markers are counted, one per
/// occurrence, matching how a prepared statement lists its variables.
/// Values are always bound by position, so a named marker that appears twice
/// needs two values.
pub fn count_bind_markers(statement: &str) -> usize {
    let mut count = 0;
    let mut chars = statement.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '?' => count += 1,
            ':' if chars
                .peek()
                .is_some_and(|n| n.is_ascii_alphabetic() || *n == '_' || *n == '"') =>
            {
                count += 1;
                if chars.next_if_eq(&'"').is_some() {
                    for inner in chars.by_ref() {
                        if inner == '"' {
                            break;
                        }
                    }
                } else {
                    while chars.next_if(|n| n.is_ascii_alphanumeric() || *n == '_').is_some() {}
                }
            }
            // '' inside a literal closes and reopens it, which is equivalent
            '\'' | '"' => {
                for inner in chars.by_ref() {
                    if inner == c {
                        break;
                    }
                }
            }
            '$' if chars.peek() == Some(&'$') => {
                chars.next();
                let mut previous = '\0';
                for inner in chars.by_ref() {
                    if previous == '$' && inner == '$' {
                        break;
                    }
                    previous = inner;
                }
            }
            '-' | '/' if chars.peek() == Some(&c) => {
                for inner in chars.by_ref() {
                    if inner == '\n' {
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut previous = '\0';
                for inner in chars.by_ref() {
                    if previous == '*' && inner == '/' {
                        break;
                    }
                    previous = inner;
                }
            }
            _ => {}
        }
    }
    count
}
