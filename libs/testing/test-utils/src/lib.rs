//! Shared test utilities for the CQL session crates
//!
//! - `TestScylla`: ScyllaDB container with automatic cleanup (feature: "scylla")
//! - `TestDataBuilder`: Deterministic test data naming (always available)
//!
//! # Usage
//!
//! ```rust,ignore
//! use test_utils::{TestDataBuilder, TestScylla};
//!
//! #[tokio::test]
//! #[ignore] // Requires Docker
//! async fn my_cluster_test() {
//!     let scylla = TestScylla::new().await;
//!     let builder = TestDataBuilder::from_test_name("my_cluster_test");
//!
//!     let keyspace = builder.keyspace("main");
//!     let table = builder.table("books");
//! }
//! ```

use uuid::Uuid;

#[cfg(feature = "scylla")]
mod scylla;

#[cfg(feature = "scylla")]
pub use scylla::TestScylla;

/// Builder for test data with deterministic naming
///
/// Names derive from a seed so reruns of one test reuse the same keyspaces,
/// while different tests never collide.
pub struct TestDataBuilder {
    seed: u64,
}

impl TestDataBuilder {
    /// Create a new builder with a seed (for deterministic tests)
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Create from test name (generates seed from test name hash)
    ///
    /// # Example
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let builder = TestDataBuilder::from_test_name("test_paging");
    /// ```
    pub fn from_test_name(name: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    /// Deterministic UUID for row keys
    pub fn id(&self, index: u64) -> Uuid {
        let mut bytes = [0u8; 16];
        bytes[..8].copy_from_slice(&self.seed.to_le_bytes());
        bytes[8..].copy_from_slice(&index.to_le_bytes());
        Uuid::from_bytes(bytes)
    }

    /// Keyspace name that is a valid CQL identifier
    ///
    /// # Example
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let builder = TestDataBuilder::new(7);
    /// assert_eq!(builder.keyspace("main"), "ks_7_main");
    /// ```
    pub fn keyspace(&self, suffix: &str) -> String {
        self.identifier("ks", suffix)
    }

    /// Table name that is a valid CQL identifier
    pub fn table(&self, suffix: &str) -> String {
        self.identifier("tbl", suffix)
    }

    // Identifiers are capped at 48 characters; the seed is shortened to fit
    fn identifier(&self, prefix: &str, suffix: &str) -> String {
        let seed = self.seed % 1_000_000_000;
        let mut name = format!("{}_{}_{}", prefix, seed, suffix);
        name.truncate(48);
        name
    }
}
