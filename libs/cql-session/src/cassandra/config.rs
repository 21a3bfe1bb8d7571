use std::time::Duration;

#[cfg(feature = "config")]
use core_config::{ConfigError, FromEnv, env_list, env_optional, env_parse};

use crate::session::DEFAULT_PAGE_SIZE;

/// Cluster connection settings
///
/// Can be built by hand or loaded from environment variables (with the
/// `config` feature).
///
/// # Example
///
/// ```ignore
/// use cql_session::cassandra::ClusterConfig;
///
/// let config = ClusterConfig::new(vec!["127.0.0.1:9042"])
///     .with_keyspace("library")
///     .with_credentials("api", "secret")
///     .with_page_size(100);
///
/// // From environment variables (requires `config` feature)
/// let config = ClusterConfig::from_env()?;
/// ```
#[derive(Clone, Debug)]
pub struct ClusterConfig {
    /// host:port pairs, e.g. ["127.0.0.1:9042", "127.0.0.2:9042"]
    pub contact_points: Vec<String>,

    /// Keyspace selected on every connection
    pub keyspace: Option<String>,

    /// Preferred datacenter for load balancing
    pub local_datacenter: Option<String>,

    pub username: Option<String>,
    pub password: Option<String>,

    pub connect_timeout_secs: u64,

    /// Client-side limit for a single request
    pub request_timeout_secs: u64,

    /// Rows per page when a query does not set its own page size
    pub page_size: i32,

    /// Upper bound the driver itself applies to schema agreement waits
    pub schema_agreement_timeout_secs: u64,
}

impl ClusterConfig {
    pub fn new<S: Into<String>>(contact_points: Vec<S>) -> Self {
        Self {
            contact_points: contact_points.into_iter().map(Into::into).collect(),
            keyspace: None,
            local_datacenter: None,
            username: None,
            password: None,
            connect_timeout_secs: 10,
            request_timeout_secs: 30,
            page_size: DEFAULT_PAGE_SIZE,
            schema_agreement_timeout_secs: 60,
        }
    }

    pub fn with_keyspace(mut self, keyspace: impl Into<String>) -> Self {
        self.keyspace = Some(keyspace.into());
        self
    }

    pub fn with_datacenter(mut self, datacenter: impl Into<String>) -> Self {
        self.local_datacenter = Some(datacenter.into());
        self
    }

    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    pub fn with_connect_timeout(mut self, secs: u64) -> Self {
        self.connect_timeout_secs = secs;
        self
    }

    pub fn with_request_timeout(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    pub fn with_page_size(mut self, page_size: i32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_schema_agreement_timeout(mut self, secs: u64) -> Self {
        self.schema_agreement_timeout_secs = secs;
        self
    }

    pub fn contact_points(&self) -> &[String] {
        &self.contact_points
    }

    pub fn keyspace(&self) -> Option<&str> {
        self.keyspace.as_deref()
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn schema_agreement_timeout(&self) -> Duration {
        Duration::from_secs(self.schema_agreement_timeout_secs)
    }
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self::new(vec!["127.0.0.1:9042"])
    }
}

/// Load ClusterConfig from environment variables
///
/// - `CASSANDRA_CONTACT_POINTS` (required) - comma-separated host:port list
/// - `CASSANDRA_KEYSPACE` (optional)
/// - `CASSANDRA_DATACENTER` (optional) - preferred datacenter
/// - `CASSANDRA_USERNAME` / `CASSANDRA_PASSWORD` (optional, used together)
/// - `CASSANDRA_CONNECT_TIMEOUT_SECS` (optional, default: 10)
/// - `CASSANDRA_REQUEST_TIMEOUT_SECS` (optional, default: 30)
/// - `CASSANDRA_PAGE_SIZE` (optional, default: 5000)
/// - `CASSANDRA_SCHEMA_AGREEMENT_TIMEOUT_SECS` (optional, default: 60)
#[cfg(feature = "config")]
impl FromEnv for ClusterConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let page_size = env_parse("CASSANDRA_PAGE_SIZE", DEFAULT_PAGE_SIZE)?;
        if page_size <= 0 {
            return Err(ConfigError::ParseError {
                key: "CASSANDRA_PAGE_SIZE".to_string(),
                details: format!("page size must be positive, got {page_size}"),
            });
        }

        Ok(Self {
            contact_points: env_list("CASSANDRA_CONTACT_POINTS")?,
            keyspace: env_optional("CASSANDRA_KEYSPACE"),
            local_datacenter: env_optional("CASSANDRA_DATACENTER"),
            username: env_optional("CASSANDRA_USERNAME"),
            password: env_optional("CASSANDRA_PASSWORD"),
            connect_timeout_secs: env_parse("CASSANDRA_CONNECT_TIMEOUT_SECS", 10)?,
            request_timeout_secs: env_parse("CASSANDRA_REQUEST_TIMEOUT_SECS", 30)?,
            page_size,
            schema_agreement_timeout_secs: env_parse(
                "CASSANDRA_SCHEMA_AGREEMENT_TIMEOUT_SECS",
                60,
            )?,
        })
    }
}
