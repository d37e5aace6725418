//! Grade and student records.
//!
//! These belong to the storage collaborator. The guard layer only reads
//! [`GradeRecord::student_id`] to resolve ownership.

use crate::identifiers::{GradeId, StudentId};
use serde::{Deserialize, Serialize};

/// A single grade of a student in one subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeRecord {
    /// Record id
    pub id: GradeId,
    /// Owning student
    pub student_id: StudentId,
    /// Subject name
    pub subject: String,
    /// Free-text remark
    #[serde(default)]
    pub observation: Option<String>,
    /// Grade value
    pub value: f64,
    /// Weight of the grade within the subject, in percent
    #[serde(default)]
    pub percentage: f64,
}

/// A student on the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRecord {
    /// Record id
    pub id: StudentId,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Contact address
    #[serde(default)]
    pub email: Option<String>,
}
