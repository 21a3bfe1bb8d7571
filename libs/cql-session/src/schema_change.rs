//! DDL execution followed by an optional schema-agreement wait
//!
//! ```text
//! Submitted -> Executed -> AgreementPending -> Agreed | TimedOut
//!          \-> (execution error, no state change)
//! ```
//!
//! The wait only happens when the caller's options carry a deadline or a
//! cancellation token; otherwise an executed change counts as agreed.

use tokio::time::sleep_until;
use tracing::{info, warn};
use uuid::Uuid;

use crate::common::{SessionError, SessionResult};
use crate::driver::CqlDriver;
use crate::options::QueryOptions;
use crate::session::CqlSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum SchemaChangeState {
    Submitted,
    Executed,
    AgreementPending,
    Agreed,
    TimedOut,
}

/// How a successfully executed schema change ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaChangeOutcome {
    pub state: SchemaChangeState,
    /// Agreed schema version, when the cluster reported one
    pub schema_version: Option<Uuid>,
}

/// Drives one schema change through its states
pub struct SchemaChangeCoordinator<'a, D: CqlDriver> {
    session: &'a CqlSession<D>,
    state: SchemaChangeState,
}

impl<'a, D: CqlDriver> SchemaChangeCoordinator<'a, D> {
    pub fn new(session: &'a CqlSession<D>) -> Self {
        Self {
            session,
            state: SchemaChangeState::Submitted,
        }
    }

    pub fn state(&self) -> SchemaChangeState {
        self.state
    }

    /// Execute `statement` and, if requested, wait for agreement.
    ///
    /// Execution errors are returned as they are and never start a wait.
    /// Running out of time or being cancelled during the wait yields
    /// [`SessionError::SchemaAgreementTimedOut`]; the change itself is
    /// already applied at that point.
    pub async fn apply(
        &mut self,
        statement: &str,
        options: &QueryOptions,
    ) -> SessionResult<SchemaChangeOutcome> {
        self.session
            .execute_no_result(statement, options, Vec::new())
            .await?;
        self.state = SchemaChangeState::Executed;
        info!(statement, "Schema change executed");

        if !options.waits_for_agreement() {
            self.state = SchemaChangeState::Agreed;
            return Ok(SchemaChangeOutcome {
                state: self.state,
                schema_version: None,
            });
        }

        self.state = SchemaChangeState::AgreementPending;
        match self.wait_for_agreement(options).await {
            Ok(version) => {
                self.state = SchemaChangeState::Agreed;
                info!(%version, "Schema agreement reached");
                Ok(SchemaChangeOutcome {
                    state: self.state,
                    schema_version: Some(version),
                })
            }
            Err(reason) => {
                self.state = SchemaChangeState::TimedOut;
                warn!(statement, reason = %reason, "Schema agreement not reached");
                Err(SessionError::SchemaAgreementTimedOut(reason))
            }
        }
    }

    async fn wait_for_agreement(&self, options: &QueryOptions) -> Result<Uuid, String> {
        let agreement = self.session.driver().await_schema_agreement();
        let deadline = async {
            match options.deadline() {
                Some(deadline) => sleep_until(deadline).await,
                None => std::future::pending().await,
            }
        };
        let cancelled = async {
            match options.cancellation() {
                Some(token) => token.cancelled().await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            result = agreement => result.map_err(|e| e.to_string()),
            _ = deadline => Err("deadline elapsed".to_string()),
            _ = cancelled => Err("cancelled".to_string()),
        }
    }
}
