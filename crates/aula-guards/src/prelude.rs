//! Aula Guards prelude.
//!
//! Curated re-exports for wiring a guard stack without naming every module.

pub use crate::dispatcher::{
    AuthorizationLayer, DispatchError, GuardLayer, GuardStack, GuardStackBuilder, GuardedRequest,
    InterceptionDispatcher, OperationHandler, TimingLayer,
};
pub use crate::identity::{IdentityResolver, ResolvedActor};
pub use crate::ownership::OwnershipLookup;
pub use crate::policy::{PolicyDecision, PolicyEngine, PolicyTable};
pub use crate::recorder::ViolationRecorder;
pub use crate::translator::{Redirect, ResponseTranslator};
