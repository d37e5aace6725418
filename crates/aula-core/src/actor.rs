//! Session principal and role model.
//!
//! An [`Actor`] is attached to a session when it starts and stays immutable
//! for the session lifetime. The owned student id exists exactly when the
//! role is [`Role::Student`]. Teachers drop any submitted id; a student
//! without one is rejected by every constructor and by the deserializer.

use crate::identifiers::StudentId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The two roles of the grading application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Read-only access to the student's own grades.
    #[serde(rename = "ALUMNO")]
    Student,
    /// Unrestricted access.
    #[serde(rename = "PROFESOR")]
    Teacher,
}

impl Role {
    /// Wire name used in audit records and session state.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "ALUMNO",
            Role::Teacher => "PROFESOR",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = IdentificationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ALUMNO" | "STUDENT" => Ok(Role::Student),
            "PROFESOR" | "TEACHER" => Ok(Role::Teacher),
            _ => Err(IdentificationError::InvalidRole {
                role: s.to_string(),
            }),
        }
    }
}

/// Rejections produced while identifying a new session principal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentificationError {
    /// The name was missing or blank.
    #[error("a name is required")]
    NameRequired,
    /// The role was neither ALUMNO nor PROFESOR.
    #[error("invalid role: {role}")]
    InvalidRole {
        /// The rejected role text
        role: String,
    },
    /// A student identified without a positive student id.
    #[error("students must provide a positive student id")]
    StudentIdRequired,
}

impl IdentificationError {
    /// Error code carried back to the identification form.
    pub fn code(&self) -> &'static str {
        match self {
            IdentificationError::NameRequired => "nombre_requerido",
            IdentificationError::InvalidRole { .. } => "rol_invalido",
            IdentificationError::StudentIdRequired => "estudiante_id_requerido",
        }
    }
}

/// The authenticated principal of a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ActorFields")]
pub struct Actor {
    name: String,
    role: Role,
    owned_student_id: Option<StudentId>,
}

#[derive(Deserialize)]
struct ActorFields {
    name: String,
    role: Role,
    #[serde(default)]
    owned_student_id: Option<StudentId>,
}

impl TryFrom<ActorFields> for Actor {
    type Error = IdentificationError;

    fn try_from(fields: ActorFields) -> Result<Self, Self::Error> {
        Actor::new(fields.name, fields.role, fields.owned_student_id)
    }
}

impl Actor {
    /// Build an actor. Teachers drop the owned student id; students must
    /// carry one.
    pub fn new(
        name: impl Into<String>,
        role: Role,
        owned_student_id: Option<StudentId>,
    ) -> Result<Self, IdentificationError> {
        match (role, owned_student_id) {
            (Role::Student, Some(id)) => Ok(Self::student(name, id)),
            (Role::Student, None) => Err(IdentificationError::StudentIdRequired),
            (Role::Teacher, _) => Ok(Self::teacher(name)),
        }
    }

    /// A student bound to their own record.
    pub fn student(name: impl Into<String>, student_id: StudentId) -> Self {
        Self {
            name: name.into(),
            role: Role::Student,
            owned_student_id: Some(student_id),
        }
    }

    /// A teacher.
    pub fn teacher(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: Role::Teacher,
            owned_student_id: None,
        }
    }

    /// Validate an identification form and build the session principal.
    ///
    /// Teachers never carry a student id, whatever the form submitted.
    pub fn identify(
        name: &str,
        role: &str,
        student_id: Option<i64>,
    ) -> Result<Self, IdentificationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(IdentificationError::NameRequired);
        }
        let role = Role::from_str(role)?;
        match role {
            Role::Student => match student_id {
                Some(id) if id > 0 => Ok(Self::student(name, StudentId::new(id))),
                _ => Err(IdentificationError::StudentIdRequired),
            },
            Role::Teacher => Ok(Self::teacher(name)),
        }
    }

    /// Same principal under a different role. Switching to Teacher clears the
    /// owned student id; switching to Student requires one already owned.
    pub fn with_role(self, role: Role) -> Result<Self, IdentificationError> {
        Self::new(self.name, role, self.owned_student_id)
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Role of the principal.
    pub fn role(&self) -> Role {
        self.role
    }

    /// The student record this principal owns, for students only.
    pub fn owned_student_id(&self) -> Option<StudentId> {
        self.owned_student_id
    }

    /// Whether the role is Student.
    pub fn is_student(&self) -> bool {
        self.role == Role::Student
    }

    /// Whether the role is Teacher.
    pub fn is_teacher(&self) -> bool {
        self.role == Role::Teacher
    }

    /// Teachers reach any student; students only the one they own.
    pub fn can_access_student(&self, requested: StudentId) -> bool {
        match self.role {
            Role::Teacher => true,
            Role::Student => self.owned_student_id == Some(requested),
        }
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.owned_student_id {
            Some(id) => write!(f, "{} ({}, student {id})", self.name, self.role),
            None => write!(f, "{} ({})", self.name, self.role),
        }
    }
}
