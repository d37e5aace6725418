#![deny(clippy::await_holding_lock)]
//! # Aula Guards - Interception and Audit
//!
//! Wraps every guarded grading operation: resolves the acting principal,
//! classifies the call against the static policy table, evaluates the
//! matching rules, records denied attempts durably, and turns violations
//! into user-facing redirects.
//!
//! ```text
//! IdentityResolver → AuthorizationLayer(PolicyEngine, ViolationRecorder) → TimingLayer → handler
//! ```
//!
//! The engine never raises for a normal denial; only the dispatcher converts
//! a [`PolicyDecision::Deny`] into a [`aula_core::ViolationSignal`], after
//! the audit write has completed.

pub mod dispatcher;
pub mod identity;
pub mod ownership;
pub mod policy;
pub mod prelude;
pub mod recorder;
pub mod translator;

pub use dispatcher::{
    AuthorizationLayer, DispatchError, GuardLayer, GuardStack, GuardStackBuilder, GuardedRequest,
    InterceptionDispatcher, OperationHandler, TimingLayer,
};
pub use identity::{AbsenceReason, IdentityResolver, ResolvedActor};
pub use ownership::{Ownership, OwnershipLookup};
pub use policy::{Denial, PolicyDecision, PolicyEngine, PolicyEntry, PolicyTable};
pub use recorder::{RecordOutcome, ViolationRecorder};
pub use translator::{Redirect, ResponseTranslator};

/// `tracing` target for security events and audit-write failures.
pub const AUDIT_TARGET: &str = "aula::audit";
