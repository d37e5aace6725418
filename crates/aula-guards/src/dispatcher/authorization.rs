//! Authorization layer: evaluate, record on deny, then raise.

use super::{DispatchError, GuardLayer, GuardedRequest, OperationHandler};
use crate::policy::{PolicyDecision, PolicyEngine};
use crate::recorder::ViolationRecorder;
use crate::AUDIT_TARGET;
use async_trait::async_trait;
use aula_core::violation::ANONYMOUS_ACTOR;
use aula_core::{Actor, ViolationSignal};
use serde_json::Value;

/// Guard layer enforcing the policy engine's decision.
///
/// On deny the audit record is written (and flushed) before the violation
/// is returned; the wrapped operation never runs. A failed audit write is
/// reported on the audit channel and the violation is still raised.
#[derive(Debug, Clone)]
pub struct AuthorizationLayer {
    engine: PolicyEngine,
    recorder: ViolationRecorder,
}

impl AuthorizationLayer {
    /// Layer over an engine and a recorder.
    pub fn new(engine: PolicyEngine, recorder: ViolationRecorder) -> Self {
        Self { engine, recorder }
    }
}

#[async_trait]
impl GuardLayer for AuthorizationLayer {
    async fn process(
        &self,
        request: GuardedRequest,
        next: &dyn OperationHandler,
    ) -> Result<Value, DispatchError> {
        let actor = request.actor.actor();
        let denial = match self.engine.evaluate(actor, &request.descriptor).await {
            PolicyDecision::Allow => return next.handle(request).await,
            PolicyDecision::Deny(denial) => denial,
        };

        let action = request.descriptor.attempted_action();
        tracing::warn!(
            target: AUDIT_TARGET,
            kind = %denial.kind,
            actor = actor.map_or(ANONYMOUS_ACTOR, Actor::name),
            operation = %request.descriptor,
            "Access denied"
        );
        self.recorder
            .record_or_report(actor, &action, &denial.detail)
            .await;

        Err(ViolationSignal::new(
            denial.kind,
            actor.map_or(ANONYMOUS_ACTOR, Actor::name),
            action,
            denial.reason,
        )
        .into())
    }

    fn name(&self) -> &str {
        "authorization"
    }
}
