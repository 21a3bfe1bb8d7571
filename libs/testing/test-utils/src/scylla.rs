//! ScyllaDB test infrastructure
//!
//! Provides a `TestScylla` helper that starts a single-node ScyllaDB
//! container speaking CQL on a random host port.

use testcontainers::ContainerAsync;
use testcontainers::runners::AsyncRunner;
use testcontainers_modules::scylladb::ScyllaDB;

const CQL_PORT: u16 = 9042;

/// Test ScyllaDB wrapper that ensures proper cleanup
///
/// The container is automatically stopped and removed when this struct is dropped.
///
/// # Example
///
/// ```no_run
/// use test_utils::TestScylla;
///
/// # async fn example() {
/// let scylla = TestScylla::new().await;
/// let contact_point = scylla.contact_point();
/// // Hand contact_point to the cluster config under test
/// # }
/// ```
pub struct TestScylla {
    #[allow(dead_code)]
    container: ContainerAsync<ScyllaDB>,
    contact_point: String,
}

impl TestScylla {
    /// Start a new single-node ScyllaDB container
    pub async fn new() -> Self {
        let container = ScyllaDB::default()
            .start()
            .await
            .expect("Failed to start ScyllaDB container");

        let host_port = container
            .get_host_port_ipv4(CQL_PORT)
            .await
            .expect("Failed to get ScyllaDB CQL port");

        let contact_point = format!("127.0.0.1:{}", host_port);
        tracing::info!(port = host_port, "Test ScyllaDB ready");

        Self {
            container,
            contact_point,
        }
    }

    /// host:port of the CQL endpoint
    pub fn contact_point(&self) -> &str {
        &self.contact_point
    }
}

// Container is automatically cleaned up when TestScylla is dropped
impl Drop for TestScylla {
    fn drop(&mut self) {
        tracing::debug!("Cleaning up test ScyllaDB container");
    }
}
