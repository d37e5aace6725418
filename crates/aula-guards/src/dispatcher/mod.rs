//! Interception Dispatcher
//!
//! Every guarded operation enters through [`InterceptionDispatcher::dispatch`],
//! which resolves the actor once and threads it explicitly through a
//! [`GuardStack`] built at startup:
//!
//! ```text
//! dispatch → AuthorizationLayer → [TimingLayer] → OperationHandler
//! ```

mod authorization;
mod stack;
mod timing;

pub use authorization::AuthorizationLayer;
pub use stack::{GuardStack, GuardStackBuilder};
pub use timing::TimingLayer;

use crate::identity::{IdentityResolver, ResolvedActor};
use crate::ownership::OwnershipLookup;
use crate::policy::{PolicyEngine, PolicyTable};
use crate::recorder::ViolationRecorder;
use async_trait::async_trait;
use aula_core::effects::{AuditEffects, ClockEffects, GradeStoreEffects, SessionEffects};
use aula_core::{AulaError, OperationDescriptor, SessionId, ViolationSignal};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Failure surfaced by a dispatched call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DispatchError {
    /// The guard denied the call; the operation did not run.
    #[error(transparent)]
    Violation(#[from] ViolationSignal),
    /// The operation ran and failed; passed through unchanged.
    #[error(transparent)]
    Operation(#[from] AulaError),
}

impl DispatchError {
    /// The violation, if the call was denied.
    pub fn violation(&self) -> Option<&ViolationSignal> {
        match self {
            DispatchError::Violation(signal) => Some(signal),
            DispatchError::Operation(_) => None,
        }
    }
}

/// A call on its way through the stack.
#[derive(Debug, Clone)]
pub struct GuardedRequest {
    /// The caller, resolved once at entry
    pub actor: ResolvedActor,
    /// What is being invoked
    pub descriptor: OperationDescriptor,
}

/// The wrapped operation, or the rest of the stack.
#[async_trait]
pub trait OperationHandler: Send + Sync {
    /// Run the operation
    async fn handle(&self, request: GuardedRequest) -> Result<Value, DispatchError>;
}

/// One layer of the guard stack.
#[async_trait]
pub trait GuardLayer: Send + Sync {
    /// Process a request, calling `next` to continue
    async fn process(
        &self,
        request: GuardedRequest,
        next: &dyn OperationHandler,
    ) -> Result<Value, DispatchError>;

    /// Layer name for debugging
    fn name(&self) -> &str;
}

/// Entry point around every guarded operation.
pub struct InterceptionDispatcher {
    resolver: IdentityResolver,
    stack: GuardStack,
}

impl InterceptionDispatcher {
    /// Dispatcher over a resolver and a prepared stack.
    pub fn new(resolver: IdentityResolver, stack: GuardStack) -> Self {
        Self { resolver, stack }
    }

    /// Wire the standard stack from collaborators: authorization first,
    /// then timing when `timing` is set, then `handler`.
    pub fn from_collaborators(
        sessions: Arc<dyn SessionEffects>,
        grades: Arc<dyn GradeStoreEffects>,
        audit: Arc<dyn AuditEffects>,
        clock: Arc<dyn ClockEffects>,
        handler: Arc<dyn OperationHandler>,
        timing: bool,
    ) -> Self {
        let engine = PolicyEngine::new(PolicyTable::standard(), OwnershipLookup::new(grades));
        let recorder = ViolationRecorder::new(audit, clock);
        let stack = GuardStackBuilder::new()
            .with_layer(Arc::new(AuthorizationLayer::new(engine, recorder)))
            .with_optional_layer(timing, Arc::new(TimingLayer::new()))
            .with_handler(handler)
            .build();
        Self::new(IdentityResolver::new(sessions), stack)
    }

    /// The installed stack.
    pub fn stack(&self) -> &GuardStack {
        &self.stack
    }

    /// Resolve the caller of `session` and run `descriptor` through the stack.
    #[tracing::instrument(
        name = "dispatch",
        skip(self, session, descriptor),
        fields(operation = %descriptor.qualified_name())
    )]
    pub async fn dispatch(
        &self,
        session: Option<&SessionId>,
        descriptor: OperationDescriptor,
    ) -> Result<Value, DispatchError> {
        let actor = self.resolver.current_actor(session).await;
        self.dispatch_as(actor, descriptor).await
    }

    /// Run `descriptor` for an already resolved caller.
    pub async fn dispatch_as(
        &self,
        actor: ResolvedActor,
        descriptor: OperationDescriptor,
    ) -> Result<Value, DispatchError> {
        self.stack.process(GuardedRequest { actor, descriptor }).await
    }
}

impl fmt::Debug for InterceptionDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterceptionDispatcher")
            .field("resolver", &self.resolver)
            .field("layers", &self.stack.layer_names())
            .finish()
    }
}
