//! Identity Context Resolver
//!
//! Reads the actor attached to the caller's session. An unauthenticated
//! caller is a normal state, so resolution never fails: every failure of
//! the session collaborator becomes [`ResolvedActor::Absent`] with the
//! reason kept for diagnostics.

use aula_core::effects::{SessionEffects, SessionError};
use aula_core::{Actor, SessionId};
use std::fmt;
use std::sync::Arc;

/// Why no actor is in context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbsenceReason {
    /// The request carried no session.
    NoSession,
    /// The session exists but no actor is attached to it.
    NoActor,
    /// The session store failed; treated as unauthenticated.
    LookupFailed(String),
}

impl fmt::Display for AbsenceReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbsenceReason::NoSession => write!(f, "no session"),
            AbsenceReason::NoActor => write!(f, "no actor attached to session"),
            AbsenceReason::LookupFailed(reason) => write!(f, "session lookup failed: {reason}"),
        }
    }
}

/// Outcome of actor resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedActor {
    /// An authenticated principal.
    Present(Actor),
    /// Nobody is acting.
    Absent {
        /// Why no actor was found
        reason: AbsenceReason,
    },
}

impl ResolvedActor {
    /// Absent with the given reason.
    pub fn absent(reason: AbsenceReason) -> Self {
        Self::Absent { reason }
    }

    /// The actor, if present.
    pub fn actor(&self) -> Option<&Actor> {
        match self {
            ResolvedActor::Present(actor) => Some(actor),
            ResolvedActor::Absent { .. } => None,
        }
    }

    /// Whether an actor is present.
    pub fn is_present(&self) -> bool {
        matches!(self, ResolvedActor::Present(_))
    }
}

impl From<Actor> for ResolvedActor {
    fn from(actor: Actor) -> Self {
        ResolvedActor::Present(actor)
    }
}

/// Resolves the current actor from session state.
#[derive(Clone)]
pub struct IdentityResolver {
    sessions: Arc<dyn SessionEffects>,
}

impl IdentityResolver {
    /// Resolver over the given session store.
    pub fn new(sessions: Arc<dyn SessionEffects>) -> Self {
        Self { sessions }
    }

    /// The actor attached to `session`, or the reason there is none.
    pub async fn current_actor(&self, session: Option<&SessionId>) -> ResolvedActor {
        let Some(session) = session else {
            return ResolvedActor::absent(AbsenceReason::NoSession);
        };
        match self.sessions.actor_for(session).await {
            Ok(Some(actor)) => ResolvedActor::Present(actor),
            Ok(None) => ResolvedActor::absent(AbsenceReason::NoActor),
            Err(err) => {
                tracing::warn!(%session, error = %err, "Session lookup failed, treating caller as unauthenticated");
                ResolvedActor::absent(AbsenceReason::LookupFailed(describe(&err)))
            }
        }
    }
}

fn describe(err: &SessionError) -> String {
    match err {
        SessionError::Unavailable { reason } => reason.clone(),
        SessionError::Corrupt { reason, .. } => reason.clone(),
    }
}

impl fmt::Debug for IdentityResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityResolver").finish_non_exhaustive()
    }
}
