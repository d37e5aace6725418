//! Session-identity store contract.

use crate::actor::Actor;
use crate::identifiers::SessionId;
use async_trait::async_trait;

/// Failures of the session store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// The session store could not be reached.
    #[error("session store unavailable: {reason}")]
    Unavailable {
        /// Underlying cause
        reason: String,
    },
    /// The stored session state could not be decoded.
    #[error("corrupt session state for {session}: {reason}")]
    Corrupt {
        /// Affected session
        session: SessionId,
        /// Underlying cause
        reason: String,
    },
}

/// Session-scoped actor storage.
#[async_trait]
pub trait SessionEffects: Send + Sync {
    /// The actor attached to `session`, if the session exists and has one.
    async fn actor_for(&self, session: &SessionId) -> Result<Option<Actor>, SessionError>;

    /// Attach an actor at session start.
    async fn attach(&self, session: SessionId, actor: Actor) -> Result<(), SessionError>;

    /// Destroy the session (logout or expiry). Returns the actor it held.
    async fn invalidate(&self, session: &SessionId) -> Result<Option<Actor>, SessionError>;
}
