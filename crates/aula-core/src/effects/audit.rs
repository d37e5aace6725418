//! Append-only audit store contract.

use crate::violation::{ViolationDraft, ViolationRecord};
use async_trait::async_trait;

/// Failures of the audit store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuditError {
    /// The entry could not be appended.
    #[error("audit append failed: {reason}")]
    AppendFailed {
        /// Underlying cause
        reason: String,
    },
    /// The entry was appended but could not be forced to durable storage.
    #[error("audit flush failed: {reason}")]
    FlushFailed {
        /// Underlying cause
        reason: String,
    },
    /// Stored entries could not be read back.
    #[error("audit read failed: {reason}")]
    ReadFailed {
        /// Underlying cause
        reason: String,
    },
    /// The write task stopped before completing.
    #[error("audit write interrupted: {reason}")]
    Interrupted {
        /// Underlying cause
        reason: String,
    },
}

/// Durable, append-only sink of denied-attempt records.
///
/// Implementations serialize concurrent appends and assign unique,
/// monotonically non-decreasing ids.
#[async_trait]
pub trait AuditEffects: Send + Sync {
    /// Append a record and return it with its assigned id.
    async fn append(&self, draft: ViolationDraft) -> Result<ViolationRecord, AuditError>;

    /// Force everything appended so far to durable storage.
    async fn force_flush(&self) -> Result<(), AuditError>;

    /// All records in insertion order.
    async fn list(&self) -> Result<Vec<ViolationRecord>, AuditError>;

    /// Number of records.
    async fn count(&self) -> Result<u64, AuditError> {
        Ok(self.list().await?.len() as u64)
    }
}
