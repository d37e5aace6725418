//! In-memory session store

use async_trait::async_trait;
use aula_core::effects::{SessionEffects, SessionError};
use aula_core::{Actor, SessionId};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Sessions held in process memory
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    sessions: Arc<RwLock<HashMap<SessionId, Actor>>>,
}

impl MemorySessionStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new session for `actor`
    pub async fn open(&self, actor: Actor) -> SessionId {
        let session = SessionId::new();
        self.sessions.write().await.insert(session, actor);
        session
    }

    /// Number of live sessions
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Whether no session is live
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait]
impl SessionEffects for MemorySessionStore {
    async fn actor_for(&self, session: &SessionId) -> Result<Option<Actor>, SessionError> {
        Ok(self.sessions.read().await.get(session).cloned())
    }

    async fn attach(&self, session: SessionId, actor: Actor) -> Result<(), SessionError> {
        tracing::debug!(%session, actor = actor.name(), role = %actor.role(), "Actor attached to session");
        self.sessions.write().await.insert(session, actor);
        Ok(())
    }

    async fn invalidate(&self, session: &SessionId) -> Result<Option<Actor>, SessionError> {
        Ok(self.sessions.write().await.remove(session))
    }
}
