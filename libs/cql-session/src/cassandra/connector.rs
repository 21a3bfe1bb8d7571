use std::sync::Arc;

use scylla::client::execution_profile::ExecutionProfile;
use scylla::client::session::Session;
use scylla::client::session_builder::SessionBuilder;
use scylla::policies::load_balancing::DefaultPolicy;
use tracing::{info, instrument};

use super::{ClusterConfig, ScyllaDriver};
use crate::common::{SessionError, SessionResult};
use crate::session::CqlSession;

/// Connect using a ClusterConfig and wrap the result in a [`CqlSession`]
///
/// The connection is verified with a `system.local` probe before it is
/// handed out, and the session uses the configured default page size.
///
/// The `scylla` driver cannot attach a custom payload to a single request,
/// so this session rejects any execution that carries a caller identity
/// ([`QueryOptions::with_user_or_role`](crate::QueryOptions::with_user_or_role))
/// with [`SessionError::Unsupported`]. Authenticate with
/// [`ClusterConfig::with_credentials`] instead; everything then runs under
/// that role.
///
/// # Example
/// ```ignore
/// use cql_session::cassandra::{ClusterConfig, connect_from_config};
///
/// let config = ClusterConfig::new(vec!["127.0.0.1:9042"]).with_keyspace("library");
/// let session = connect_from_config(&config).await?;
/// ```
///
/// With FromEnv (requires `config` feature):
/// ```ignore
/// use core_config::FromEnv;
///
/// let config = ClusterConfig::from_env()?;
/// let session = connect_from_config(&config).await?;
/// ```
#[instrument(skip_all, fields(contact_points = ?config.contact_points))]
pub async fn connect_from_config(
    config: &ClusterConfig,
) -> SessionResult<CqlSession<ScyllaDriver>> {
    info!("Attempting to connect to cluster");

    if config.contact_points.is_empty() {
        return Err(SessionError::ConnectionFailed("no contact points configured".to_string()));
    }

    let mut profile = ExecutionProfile::builder().request_timeout(Some(config.request_timeout()));
    if let Some(ref datacenter) = config.local_datacenter {
        profile = profile.load_balancing_policy(
            DefaultPolicy::builder()
                .prefer_datacenter(datacenter.clone())
                .token_aware(true)
                .build(),
        );
    }

    let mut builder = SessionBuilder::new()
        .known_nodes(&config.contact_points)
        .connection_timeout(config.connect_timeout())
        .schema_agreement_timeout(config.schema_agreement_timeout())
        .default_execution_profile_handle(profile.build().into_handle());

    if let (Some(username), Some(password)) = (&config.username, &config.password) {
        builder = builder.user(username, password);
    }

    if let Some(ref keyspace) = config.keyspace {
        builder = builder.use_keyspace(keyspace, true);
    }

    let session: Session = builder
        .build()
        .await
        .map_err(|e| SessionError::ConnectionFailed(e.to_string()))?;

    session
        .query_unpaged("SELECT release_version FROM system.local", ())
        .await
        .map_err(|e| SessionError::ConnectionFailed(e.to_string()))?;

    info!("Successfully connected to cluster");
    Ok(CqlSession::new(ScyllaDriver::new(Arc::new(session)))
        .with_default_page_size(config.page_size))
}
