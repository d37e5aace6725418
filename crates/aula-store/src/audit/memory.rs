//! In-memory audit log for tests and ephemeral runs

use async_trait::async_trait;
use aula_core::effects::{AuditEffects, AuditError};
use aula_core::{ViolationDraft, ViolationId, ViolationRecord};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Audit records held in process memory. Flushing is a no-op.
#[derive(Debug, Clone, Default)]
pub struct MemoryAuditLog {
    records: Arc<RwLock<Vec<ViolationRecord>>>,
}

impl MemoryAuditLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuditEffects for MemoryAuditLog {
    async fn append(&self, draft: ViolationDraft) -> Result<ViolationRecord, AuditError> {
        let mut records = self.records.write().await;
        let id = ViolationId::new(records.len() as i64 + 1);
        let record = draft.into_record(id);
        records.push(record.clone());
        Ok(record)
    }

    async fn force_flush(&self) -> Result<(), AuditError> {
        Ok(())
    }

    async fn list(&self) -> Result<Vec<ViolationRecord>, AuditError> {
        Ok(self.records.read().await.clone())
    }

    async fn count(&self) -> Result<u64, AuditError> {
        Ok(self.records.read().await.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn draft(action: &str) -> ViolationDraft {
        ViolationDraft {
            actor_name: "Luis".into(),
            actor_role: "ALUMNO".into(),
            attempted_action: action.into(),
            details: "students cannot modify grades".into(),
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn ids_follow_insertion_order() {
        let log = MemoryAuditLog::new();
        let first = log.append(draft("nueva")).await.unwrap();
        let second = log.append(draft("guardar")).await.unwrap();
        assert!(first.id < second.id);

        let listed = log.list().await.unwrap();
        assert_eq!(listed, vec![first, second]);
        assert_eq!(log.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn concurrent_appends_get_unique_ids() {
        let log = MemoryAuditLog::new();
        let handles: Vec<_> = (0..16)
            .map(|i| {
                let log = log.clone();
                tokio::spawn(async move { log.append(draft(&format!("op{i}"))).await })
            })
            .collect();
        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap().unwrap().id);
        }
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 16);
    }
}
