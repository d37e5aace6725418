//! Access classes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Static category the policy table assigns to an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccessClass {
    /// Create, save, edit, or delete a grade.
    WriteOnGrade,
    /// Read grades scoped to one student.
    ReadOwnGrade,
    /// Compute an average scoped to one student.
    ComputeOwnAverage,
    /// Create, save, edit, or delete a student record.
    ManageStudentRecord,
    /// Read-only roster view.
    ListStudentRecords,
    /// Not in the policy table; passes through unchecked.
    Unclassified,
}

impl AccessClass {
    /// Every classified operation needs an actor in context.
    pub fn requires_authentication(&self) -> bool {
        !matches!(self, AccessClass::Unclassified)
    }

    /// Classes whose check compares a student-id argument to the actor.
    pub fn is_student_scoped(&self) -> bool {
        matches!(
            self,
            AccessClass::ReadOwnGrade | AccessClass::ComputeOwnAverage
        )
    }

    /// Stable name for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessClass::WriteOnGrade => "write_on_grade",
            AccessClass::ReadOwnGrade => "read_own_grade",
            AccessClass::ComputeOwnAverage => "compute_own_average",
            AccessClass::ManageStudentRecord => "manage_student_record",
            AccessClass::ListStudentRecords => "list_student_records",
            AccessClass::Unclassified => "unclassified",
        }
    }
}

impl fmt::Display for AccessClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
