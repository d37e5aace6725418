//! Grade-record store contract.

use crate::identifiers::GradeId;
use crate::records::GradeRecord;
use async_trait::async_trait;

/// Failures of the grade store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The backing store could not be reached.
    #[error("grade store unavailable: {reason}")]
    Unavailable {
        /// Underlying cause
        reason: String,
    },
    /// A read failed mid-way.
    #[error("grade store read failed: {reason}")]
    ReadFailed {
        /// Underlying cause
        reason: String,
    },
}

/// Point lookup of grade records.
#[async_trait]
pub trait GradeStoreEffects: Send + Sync {
    /// The grade with `id`, or `None` when it does not exist.
    async fn find_grade(&self, id: GradeId) -> Result<Option<GradeRecord>, StoreError>;
}
