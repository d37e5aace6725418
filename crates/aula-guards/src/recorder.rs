//! Violation Recorder
//!
//! Appends one audit record per denied attempt and forces it to durable
//! storage before returning. The write runs on its own task, so once it has
//! started it completes even if the caller is dropped.

use crate::AUDIT_TARGET;
use aula_core::effects::{AuditEffects, AuditError, ClockEffects};
use aula_core::violation::{ANONYMOUS_ACTOR, ANONYMOUS_ROLE};
use aula_core::{Actor, ViolationDraft, ViolationRecord};
use std::fmt;
use std::sync::Arc;

/// Result of a single audit write.
pub type RecordOutcome = Result<ViolationRecord, AuditError>;

/// Durable writer of denied-attempt records.
#[derive(Clone)]
pub struct ViolationRecorder {
    audit: Arc<dyn AuditEffects>,
    clock: Arc<dyn ClockEffects>,
}

impl ViolationRecorder {
    /// Recorder over an audit store and a clock.
    pub fn new(audit: Arc<dyn AuditEffects>, clock: Arc<dyn ClockEffects>) -> Self {
        Self { audit, clock }
    }

    /// Append and flush one record. Absent actors are recorded as anonymous.
    pub async fn record(
        &self,
        actor: Option<&Actor>,
        attempted_action: &str,
        details: &str,
    ) -> RecordOutcome {
        let draft = ViolationDraft {
            actor_name: actor.map_or(ANONYMOUS_ACTOR, Actor::name).to_string(),
            actor_role: actor.map_or(ANONYMOUS_ROLE, |a| a.role().as_str()).to_string(),
            attempted_action: attempted_action.to_string(),
            details: details.to_string(),
            timestamp: self.clock.now(),
        };

        let audit = Arc::clone(&self.audit);
        let write = tokio::spawn(async move {
            let record = audit.append(draft).await?;
            audit.force_flush().await?;
            Ok::<_, AuditError>(record)
        });

        match write.await {
            Ok(outcome) => outcome,
            Err(join) => Err(AuditError::Interrupted {
                reason: join.to_string(),
            }),
        }
    }

    /// [`record`](Self::record), reporting failures on the audit channel
    /// instead of returning them.
    pub async fn record_or_report(
        &self,
        actor: Option<&Actor>,
        attempted_action: &str,
        details: &str,
    ) -> Option<ViolationRecord> {
        match self.record(actor, attempted_action, details).await {
            Ok(record) => {
                tracing::warn!(
                    target: AUDIT_TARGET,
                    record_id = %record.id,
                    actor = %record.actor_name,
                    role = %record.actor_role,
                    action = %record.attempted_action,
                    "Security violation recorded"
                );
                Some(record)
            }
            Err(err) => {
                tracing::error!(
                    target: AUDIT_TARGET,
                    actor = actor.map_or(ANONYMOUS_ACTOR, Actor::name),
                    action = attempted_action,
                    details,
                    error = %err,
                    "Failed to persist security violation"
                );
                None
            }
        }
    }

    /// All records, oldest first.
    pub async fn history(&self) -> Result<Vec<ViolationRecord>, AuditError> {
        self.audit.list().await
    }

    /// Number of records.
    pub async fn count(&self) -> Result<u64, AuditError> {
        self.audit.count().await
    }
}

impl fmt::Debug for ViolationRecorder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViolationRecorder").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use aula_core::effects::SystemClock;
    use aula_core::{StudentId, ViolationId};
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Journal {
        records: Mutex<Vec<ViolationRecord>>,
        flushed: Mutex<usize>,
        fail_flush: bool,
    }

    #[async_trait]
    impl AuditEffects for Journal {
        async fn append(&self, draft: ViolationDraft) -> Result<ViolationRecord, AuditError> {
            let mut records = self.records.lock();
            let record = draft.into_record(ViolationId::new(records.len() as i64 + 1));
            records.push(record.clone());
            Ok(record)
        }

        async fn force_flush(&self) -> Result<(), AuditError> {
            if self.fail_flush {
                return Err(AuditError::FlushFailed {
                    reason: "disk full".into(),
                });
            }
            *self.flushed.lock() += 1;
            Ok(())
        }

        async fn list(&self) -> Result<Vec<ViolationRecord>, AuditError> {
            Ok(self.records.lock().clone())
        }
    }

    #[tokio::test]
    async fn record_appends_and_flushes() {
        let journal = Arc::new(Journal::default());
        let recorder = ViolationRecorder::new(journal.clone(), Arc::new(SystemClock));
        let actor = Actor::student("Luis", StudentId::new(7));

        let record = recorder
            .record(Some(&actor), "editar", "resource belongs to a different student")
            .await
            .unwrap();

        assert_eq!(record.id, ViolationId::new(1));
        assert_eq!(record.actor_role, "ALUMNO");
        assert_eq!(*journal.flushed.lock(), 1);
        assert_eq!(recorder.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn anonymous_attempts_are_recorded() {
        let journal = Arc::new(Journal::default());
        let recorder = ViolationRecorder::new(journal, Arc::new(SystemClock));
        let record = recorder
            .record(None, "EstudianteController.listar", "authentication required")
            .await
            .unwrap();
        assert_eq!(record.actor_name, ANONYMOUS_ACTOR);
        assert_eq!(record.actor_role, ANONYMOUS_ROLE);
    }

    #[tokio::test]
    async fn flush_failure_is_reported_not_raised() {
        let journal = Arc::new(Journal {
            fail_flush: true,
            ..Journal::default()
        });
        let recorder = ViolationRecorder::new(journal, Arc::new(SystemClock));
        assert!(matches!(
            recorder.record(None, "nueva", "x").await,
            Err(AuditError::FlushFailed { .. })
        ));
        assert!(recorder.record_or_report(None, "nueva", "x").await.is_none());
    }
}
