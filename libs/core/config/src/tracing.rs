use crate::{ConfigError, Environment, FromEnv, env_optional};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, prelude::*};

/// Log output settings.
///
/// `filter` follows `RUST_LOG` syntax; when absent the default directive for
/// the environment is used.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TracingConfig {
    pub environment: Environment,
    pub filter: Option<String>,
}

impl TracingConfig {
    pub fn new(environment: Environment) -> Self {
        Self {
            environment,
            filter: None,
        }
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Directive used when no explicit filter was configured
    pub fn default_directive(&self) -> &'static str {
        if self.environment.is_production() {
            "warn,cql_session=info"
        } else {
            "info,cql_session=debug"
        }
    }

    fn env_filter(&self) -> EnvFilter {
        let directive = self.filter.as_deref().unwrap_or(self.default_directive());
        EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new(self.default_directive()))
    }
}

impl FromEnv for TracingConfig {
    /// Reads `APP_ENV` and `RUST_LOG`
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            environment: Environment::from_env(),
            filter: env_optional("RUST_LOG"),
        })
    }
}

/// Install the global subscriber.
///
/// Production emits flattened JSON events, development a pretty format. Both
/// carry an `ErrorLayer` so span traces can be attached to errors. Calling
/// this more than once is harmless: later calls leave the first subscriber in
/// place.
pub fn init_tracing(config: &TracingConfig) {
    let filter = config.env_filter();

    let result = if config.environment.is_production() {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(false)
                    .flatten_event(true),
            )
            .with(tracing_error::ErrorLayer::default())
            .with(filter)
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_file(false)
                    .with_line_number(false)
                    .pretty(),
            )
            .with(tracing_error::ErrorLayer::default())
            .with(filter)
            .try_init()
    };

    match result {
        Ok(_) => info!(environment = ?config.environment, "Tracing initialized"),
        Err(_) => debug!("Tracing already initialized, skipping re-initialization"),
    }
}
