//! Per-execution query options
//!
//! [`QueryOptions`] is a plain value built with consuming `with_*` calls. It
//! is never validated at construction time: the serial consistency is only
//! checked when a statement is executed, so defaults stay usable for
//! statements that ignore the field (DDL, plain reads).
//!
//! ```ignore
//! let options = QueryOptions::new()
//!     .with_consistency(Consistency::LocalQuorum)
//!     .with_user_or_role("web_reader")
//!     .with_page_size(50);
//! let rows = session.execute("SELECT * FROM ks.users", &options, vec![]).await?;
//! ```

use tokio::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// CQL consistency levels, named as in CQL (`LOCAL_QUORUM`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum Consistency {
    Any,
    One,
    Two,
    Three,
    Quorum,
    All,
    LocalQuorum,
    EachQuorum,
    Serial,
    LocalSerial,
    LocalOne,
}

impl Consistency {
    /// The serial level this consistency stands for, if it is one of the two
    /// levels allowed for the Paxos phase of conditional writes.
    pub fn as_serial(self) -> Option<SerialConsistency> {
        match self {
            Consistency::Serial => Some(SerialConsistency::Serial),
            Consistency::LocalSerial => Some(SerialConsistency::LocalSerial),
            _ => None,
        }
    }
}

/// A serial consistency that passed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum SerialConsistency {
    Serial,
    LocalSerial,
}

/// Options applied to a single execution.
///
/// Cloning is cheap; every concurrent execution path should own its copy.
#[derive(Debug, Clone)]
pub struct QueryOptions {
    user_or_role: Option<String>,
    consistency: Consistency,
    serial_consistency: Consistency,
    page_size: i32,
    page_state: Option<Vec<u8>>,
    deadline: Option<Instant>,
    cancellation: Option<CancellationToken>,
}

impl QueryOptions {
    /// Defaults suited to statements that are not sensitive to consistency,
    /// such as DDL: `LOCAL_ONE` and `LOCAL_SERIAL`, engine page size, no
    /// identity, no agreement wait.
    pub fn new() -> Self {
        Self {
            user_or_role: None,
            consistency: Consistency::LocalOne,
            serial_consistency: Consistency::LocalSerial,
            page_size: 0,
            page_state: None,
            deadline: None,
            cancellation: None,
        }
    }

    /// Execute on behalf of this user or role; the database enforces its
    /// permissions instead of the connection's. Empty names are ignored.
    ///
    /// The identity travels as a custom payload, which the `scylla`-backed
    /// session from `connect_from_config` cannot send: such executions fail
    /// with `SessionError::Unsupported` rather than running under the
    /// connection's role. A [`CqlDriver`](crate::CqlDriver) that supports
    /// payloads forwards it.
    pub fn with_user_or_role(mut self, user_or_role: impl Into<String>) -> Self {
        let user_or_role = user_or_role.into();
        self.user_or_role = (!user_or_role.is_empty()).then_some(user_or_role);
        self
    }

    pub fn with_consistency(mut self, consistency: Consistency) -> Self {
        self.consistency = consistency;
        self
    }

    /// Only `SERIAL` and `LOCAL_SERIAL` are accepted at execution time
    pub fn with_serial_consistency(mut self, serial_consistency: Consistency) -> Self {
        self.serial_consistency = serial_consistency;
        self
    }

    /// Rows per page. Zero or less means the session default; paging cannot be disabled.
    pub fn with_page_size(mut self, page_size: i32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Continue from the token returned by a previous page. An empty token starts over.
    pub fn with_page_state(mut self, page_state: impl Into<Vec<u8>>) -> Self {
        let page_state = page_state.into();
        self.page_state = (!page_state.is_empty()).then_some(page_state);
        self
    }

    /// Wait for schema agreement after DDL until this instant
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Wait for schema agreement after DDL for at most `timeout`, counted from now
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Wait for schema agreement after DDL until this token is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn user_or_role(&self) -> Option<&str> {
        self.user_or_role.as_deref()
    }

    pub fn consistency(&self) -> Consistency {
        self.consistency
    }

    pub fn serial_consistency(&self) -> Consistency {
        self.serial_consistency
    }

    pub fn page_size(&self) -> i32 {
        self.page_size
    }

    pub fn page_state(&self) -> Option<&[u8]> {
        self.page_state.as_deref()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn cancellation(&self) -> Option<&CancellationToken> {
        self.cancellation.as_ref()
    }

    /// Whether a schema change run with these options should wait for agreement
    pub fn waits_for_agreement(&self) -> bool {
        self.deadline.is_some() || self.cancellation.is_some()
    }
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self::new()
    }
}
