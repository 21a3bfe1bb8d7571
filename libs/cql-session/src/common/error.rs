use crate::options::Consistency;

/// Errors surfaced by the session layer.
///
/// Validation failures (`InvalidConsistency`, `ParameterCountMismatch`,
/// `InvalidIdentifier`, `InvalidDefinition`) are always raised before the
/// driver is called, so they never leave a partial side effect behind.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Serial consistency outside SERIAL / LOCAL_SERIAL
    #[error("Invalid serial consistency: {0} (expected SERIAL or LOCAL_SERIAL)")]
    InvalidConsistency(Consistency),

    #[error("Statement expects {expected} bound parameters but {actual} were supplied")]
    ParameterCountMismatch { expected: usize, actual: usize },

    /// A value could not be encoded or decoded under the column's declared type
    #[error("Type mismatch for column '{column}': declared {declared}, got {offered}")]
    TypeMismatch {
        column: String,
        declared: String,
        offered: String,
    },

    /// The driver or the database rejected the statement. Carries the driver message as is.
    #[error("Execution failed: {0}")]
    ExecutionFailed(String),

    /// The schema change was applied, but cluster-wide agreement was not observed
    #[error("Schema change applied but agreement was not reached: {0}")]
    SchemaAgreementTimedOut(String),

    #[error("Keyspace '{0}' does not exist")]
    KeyspaceNotFound(String),

    #[error("Invalid identifier '{0}'")]
    InvalidIdentifier(String),

    #[error("Invalid schema definition: {0}")]
    InvalidDefinition(String),

    /// The underlying driver cannot honour a requested execution attribute
    #[error("Unsupported by driver: {0}")]
    Unsupported(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
}

impl SessionError {
    pub(crate) fn type_mismatch(
        column: &str,
        declared: impl ToString,
        offered: impl ToString,
    ) -> Self {
        SessionError::TypeMismatch {
            column: column.to_string(),
            declared: declared.to_string(),
            offered: offered.to_string(),
        }
    }

    /// Whether the statement that produced this error reached the database and
    /// was applied there.
    pub fn is_schema_applied(&self) -> bool {
        matches!(self, SessionError::SchemaAgreementTimedOut(_))
    }
}

/// Result type alias for session operations
pub type SessionResult<T> = Result<T, SessionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execution_failed_keeps_driver_message() {
        let err = SessionError::ExecutionFailed("Write timeout for 2 replicas".to_string());
        assert_eq!(err.to_string(), "Execution failed: Write timeout for 2 replicas");
        assert!(!err.is_schema_applied());
    }

    #[test]
    fn test_agreement_timeout_reports_applied() {
        let err = SessionError::SchemaAgreementTimedOut("deadline elapsed".to_string());
        assert!(err.is_schema_applied());
    }

    #[test]
    fn test_type_mismatch_message_names_column() {
        let err = SessionError::type_mismatch("age", "tinyint", "Text");
        let message = err.to_string();
        assert!(message.contains("'age'"));
        assert!(message.contains("tinyint"));
        assert!(message.contains("Text"));
    }
}
