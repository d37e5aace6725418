//! Application wiring from configuration.

use aula_core::effects::{AuditEffects, SessionEffects, SystemClock};
use aula_core::{Actor, AulaConfig, AulaResult, OperationDescriptor, SessionId};
use aula_guards::{DispatchError, InterceptionDispatcher, Redirect, ResponseTranslator};
use aula_store::{open_audit_log, MemoryGradebook, MemorySessionStore};
use serde_json::Value;
use std::sync::Arc;

/// Result of invoking one operation at the boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The operation ran.
    Completed(Value),
    /// The call failed and was translated to a redirect.
    Redirected(Redirect),
}

/// Collaborators and the guard stack, assembled once.
pub struct App {
    sessions: MemorySessionStore,
    audit: Arc<dyn AuditEffects>,
    dispatcher: InterceptionDispatcher,
    translator: ResponseTranslator,
}

impl App {
    /// Build from configuration: seed the gradebook, open the audit log,
    /// and install the guard stack.
    pub async fn from_config(config: &AulaConfig) -> AulaResult<Self> {
        let sessions = MemorySessionStore::new();
        let gradebook =
            MemoryGradebook::with_records(config.seed.students.clone(), config.seed.grades.clone());
        let audit = open_audit_log(&config.audit).await?;

        let dispatcher = InterceptionDispatcher::from_collaborators(
            Arc::new(sessions.clone()),
            Arc::new(gradebook.clone()),
            audit.clone(),
            Arc::new(SystemClock),
            Arc::new(gradebook),
            config.diagnostics.timing,
        );
        tracing::debug!(?dispatcher, backend = ?config.audit.backend, "Guard stack ready");

        Ok(Self {
            sessions,
            audit,
            dispatcher,
            translator: ResponseTranslator::new(config.redirects.clone()),
        })
    }

    /// Start a session for `actor`.
    pub async fn login(&self, actor: Actor) -> SessionId {
        self.sessions.open(actor).await
    }

    /// End a session.
    pub async fn logout(&self, session: &SessionId) -> AulaResult<()> {
        self.sessions
            .invalidate(session)
            .await
            .map_err(|e| aula_core::AulaError::internal(e.to_string()))?;
        Ok(())
    }

    /// Dispatch `descriptor` and translate failures that have a redirect.
    /// Failures without one are returned as errors.
    pub async fn invoke(
        &self,
        session: Option<&SessionId>,
        descriptor: OperationDescriptor,
    ) -> Result<Outcome, DispatchError> {
        match self.dispatcher.dispatch(session, descriptor).await {
            Ok(value) => Ok(Outcome::Completed(value)),
            Err(err) => match self.translator.translate_dispatch_error(&err) {
                Some(redirect) => Ok(Outcome::Redirected(redirect)),
                None => Err(err),
            },
        }
    }

    /// The audit store.
    pub fn audit(&self) -> &Arc<dyn AuditEffects> {
        &self.audit
    }
}
