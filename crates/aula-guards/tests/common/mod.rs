//! Shared fakes for guard integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use aula_core::effects::{
    AuditEffects, AuditError, GradeStoreEffects, SessionEffects, SessionError, SystemClock,
    StoreError,
};
use aula_core::{
    Actor, GradeId, GradeRecord, SessionId, StudentId, ViolationDraft, ViolationId,
    ViolationRecord,
};
use aula_guards::{
    DispatchError, GuardedRequest, InterceptionDispatcher, OperationHandler,
};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Default)]
pub struct Sessions(pub Mutex<HashMap<SessionId, Actor>>);

#[async_trait]
impl SessionEffects for Sessions {
    async fn actor_for(&self, session: &SessionId) -> Result<Option<Actor>, SessionError> {
        Ok(self.0.lock().get(session).cloned())
    }

    async fn attach(&self, session: SessionId, actor: Actor) -> Result<(), SessionError> {
        self.0.lock().insert(session, actor);
        Ok(())
    }

    async fn invalidate(&self, session: &SessionId) -> Result<Option<Actor>, SessionError> {
        Ok(self.0.lock().remove(session))
    }
}

/// Grades keyed by id; `failing` makes every lookup error.
#[derive(Default)]
pub struct Grades {
    pub owners: HashMap<i64, i64>,
    pub failing: bool,
}

impl Grades {
    pub fn with(owners: &[(i64, i64)]) -> Self {
        Self {
            owners: owners.iter().copied().collect(),
            failing: false,
        }
    }
}

#[async_trait]
impl GradeStoreEffects for Grades {
    async fn find_grade(&self, id: GradeId) -> Result<Option<GradeRecord>, StoreError> {
        if self.failing {
            return Err(StoreError::Unavailable {
                reason: "database offline".into(),
            });
        }
        Ok(self.owners.get(&id.value()).map(|owner| GradeRecord {
            id,
            student_id: StudentId::new(*owner),
            subject: "Matemáticas".into(),
            observation: None,
            value: 4.2,
            percentage: 25.0,
        }))
    }
}

/// Audit journal; `broken` makes every append fail.
#[derive(Default)]
pub struct Journal {
    pub records: Mutex<Vec<ViolationRecord>>,
    pub broken: bool,
}

#[async_trait]
impl AuditEffects for Journal {
    async fn append(&self, draft: ViolationDraft) -> Result<ViolationRecord, AuditError> {
        if self.broken {
            return Err(AuditError::AppendFailed {
                reason: "audit table locked".into(),
            });
        }
        let mut records = self.records.lock();
        let record = draft.into_record(ViolationId::new(records.len() as i64 + 1));
        records.push(record.clone());
        Ok(record)
    }

    async fn force_flush(&self) -> Result<(), AuditError> {
        Ok(())
    }

    async fn list(&self) -> Result<Vec<ViolationRecord>, AuditError> {
        Ok(self.records.lock().clone())
    }
}

/// Handler that counts invocations and echoes the operation.
#[derive(Default)]
pub struct Counting(pub AtomicUsize);

impl Counting {
    pub fn calls(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OperationHandler for Counting {
    async fn handle(&self, request: GuardedRequest) -> Result<Value, DispatchError> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok(json!({ "operation": request.descriptor.operation }))
    }
}

pub struct Harness {
    pub sessions: Arc<Sessions>,
    pub journal: Arc<Journal>,
    pub handler: Arc<Counting>,
    pub dispatcher: InterceptionDispatcher,
}

impl Harness {
    pub fn new(grades: Grades, journal: Journal) -> Self {
        let sessions = Arc::new(Sessions::default());
        let journal = Arc::new(journal);
        let handler = Arc::new(Counting::default());
        let dispatcher = InterceptionDispatcher::from_collaborators(
            sessions.clone(),
            Arc::new(grades),
            journal.clone(),
            Arc::new(SystemClock),
            handler.clone(),
            true,
        );
        Self {
            sessions,
            journal,
            handler,
            dispatcher,
        }
    }

    pub async fn login(&self, actor: Actor) -> SessionId {
        let session = SessionId::new();
        self.sessions
            .attach(session, actor)
            .await
            .expect("in-memory attach");
        session
    }

    pub fn audit_len(&self) -> usize {
        self.journal.records.lock().len()
    }
}
