//! Ownership Lookup
//!
//! Resolves which student a grade record belongs to. Every call is a fresh
//! point lookup against the grade store; nothing is cached, so a record
//! moved or deleted between two calls is seen immediately.

use aula_core::effects::{GradeStoreEffects, StoreError};
use aula_core::{GradeId, StudentId};
use std::fmt;
use std::sync::Arc;

/// Result of an ownership lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    /// The record exists and belongs to this student.
    OwnedBy(StudentId),
    /// No record with that id.
    NotFound,
}

/// Point lookup of record owners.
#[derive(Clone)]
pub struct OwnershipLookup {
    grades: Arc<dyn GradeStoreEffects>,
}

impl OwnershipLookup {
    /// Lookup over the given grade store.
    pub fn new(grades: Arc<dyn GradeStoreEffects>) -> Self {
        Self { grades }
    }

    /// Owner of grade `id`. Storage failures are returned, not hidden.
    pub async fn owner_of(&self, id: GradeId) -> Result<Ownership, StoreError> {
        let ownership = match self.grades.find_grade(id).await? {
            Some(record) => Ownership::OwnedBy(record.student_id),
            None => Ownership::NotFound,
        };
        tracing::debug!(grade = %id, ?ownership, "Resolved grade ownership");
        Ok(ownership)
    }
}

impl fmt::Debug for OwnershipLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OwnershipLookup").finish_non_exhaustive()
    }
}
