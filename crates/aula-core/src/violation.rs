//! Violation signals and audit records.
//!
//! A [`ViolationSignal`] is what the dispatcher raises on a denial; it is the
//! only contract the response translator consumes. A [`ViolationRecord`] is
//! what the audit store keeps: append-only, never updated, ordered by
//! insertion.

use crate::identifiers::ViolationId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Error code carried by every violation signal.
pub const FORBIDDEN_CODE: &str = "403";

/// Actor name reported when no actor was in context.
pub const ANONYMOUS_ACTOR: &str = "ANONIMO";

/// Role reported in audit records when no actor was in context.
pub const ANONYMOUS_ROLE: &str = "NINGUNO";

/// Category of a denial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViolationKind {
    /// The role lacks the capability outright.
    OperationNotPermitted,
    /// The role has the capability class but not for this target, or the
    /// check itself failed.
    UnauthorizedAccess,
    /// The specific resource is missing or owned by someone else.
    ResourceNotPermitted,
    /// No actor in context for an operation requiring one.
    UserNotAuthenticated,
}

impl ViolationKind {
    /// Code rendered as `tipoViolacion`.
    pub fn code(&self) -> &'static str {
        match self {
            ViolationKind::OperationNotPermitted => "OPERACION_NO_PERMITIDA",
            ViolationKind::UnauthorizedAccess => "ACCESO_NO_AUTORIZADO",
            ViolationKind::ResourceNotPermitted => "RECURSO_NO_PERMITIDO",
            ViolationKind::UserNotAuthenticated => "USUARIO_NO_AUTENTICADO",
        }
    }

    /// Error code rendered as `codigoError`.
    ///
    /// Unauthenticated callers get 403 as well; no distinct login code exists.
    pub fn error_code(&self) -> &'static str {
        FORBIDDEN_CODE
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Structured failure raised to the boundary on a denial.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("security violation: {kind} - user: {actor_name} - operation: {operation}")]
pub struct ViolationSignal {
    /// Denial category
    pub kind: ViolationKind,
    /// Name of the actor, or [`ANONYMOUS_ACTOR`]
    pub actor_name: String,
    /// Attempted action label
    pub operation: String,
    /// User-facing explanation
    pub details: String,
    /// Error code for the response
    pub error_code: String,
}

impl ViolationSignal {
    /// Build a signal with the kind's default error code.
    pub fn new(
        kind: ViolationKind,
        actor_name: impl Into<String>,
        operation: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            actor_name: actor_name.into(),
            operation: operation.into(),
            details: details.into(),
            error_code: kind.error_code().to_string(),
        }
    }

    /// Role lacks the capability.
    pub fn operation_not_permitted(
        actor_name: impl Into<String>,
        operation: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self::new(
            ViolationKind::OperationNotPermitted,
            actor_name,
            operation,
            details,
        )
    }

    /// Target not reachable by this actor, or the check failed.
    pub fn unauthorized_access(
        actor_name: impl Into<String>,
        operation: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self::new(
            ViolationKind::UnauthorizedAccess,
            actor_name,
            operation,
            details,
        )
    }

    /// Resource missing or owned by someone else.
    pub fn resource_not_permitted(
        actor_name: impl Into<String>,
        operation: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self::new(
            ViolationKind::ResourceNotPermitted,
            actor_name,
            operation,
            details,
        )
    }

    /// No actor in context.
    pub fn user_not_authenticated(
        operation: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self::new(
            ViolationKind::UserNotAuthenticated,
            ANONYMOUS_ACTOR,
            operation,
            details,
        )
    }
}

/// An audit entry before the store assigns its id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViolationDraft {
    /// Name of the actor, or [`ANONYMOUS_ACTOR`]
    pub actor_name: String,
    /// Role wire name, or [`ANONYMOUS_ROLE`]
    pub actor_role: String,
    /// Attempted action label
    pub attempted_action: String,
    /// Operation, arguments, and reason
    pub details: String,
    /// Assigned when the draft is built
    pub timestamp: DateTime<Utc>,
}

impl ViolationDraft {
    /// Attach the store-assigned id.
    pub fn into_record(self, id: ViolationId) -> ViolationRecord {
        ViolationRecord {
            id,
            actor_name: self.actor_name,
            actor_role: self.actor_role,
            attempted_action: self.attempted_action,
            details: self.details,
            timestamp: self.timestamp,
        }
    }
}

/// A persisted denied attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViolationRecord {
    /// Store-assigned id, monotonically non-decreasing
    pub id: ViolationId,
    /// Name of the actor, or [`ANONYMOUS_ACTOR`]
    pub actor_name: String,
    /// Role wire name, or [`ANONYMOUS_ROLE`]
    pub actor_role: String,
    /// Attempted action label
    pub attempted_action: String,
    /// Operation, arguments, and reason
    pub details: String,
    /// When the attempt was recorded
    pub timestamp: DateTime<Utc>,
}

impl fmt::Display for ViolationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ID: {}", self.id)?;
        writeln!(f, "User: {}", self.actor_name)?;
        writeln!(f, "Role: {}", self.actor_role)?;
        writeln!(f, "Action: {}", self.attempted_action)?;
        writeln!(f, "Details: {}", self.details)?;
        write!(f, "Timestamp: {}", self.timestamp.to_rfc3339())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_maps_to_forbidden() {
        for kind in [
            ViolationKind::OperationNotPermitted,
            ViolationKind::UnauthorizedAccess,
            ViolationKind::ResourceNotPermitted,
            ViolationKind::UserNotAuthenticated,
        ] {
            assert_eq!(kind.error_code(), "403");
        }
    }

    #[test]
    fn unauthenticated_signal_is_anonymous() {
        let signal = ViolationSignal::user_not_authenticated("EstudianteController.listar", "x");
        assert_eq!(signal.actor_name, ANONYMOUS_ACTOR);
        assert_eq!(signal.error_code, "403");
        assert!(signal.to_string().contains("USUARIO_NO_AUTENTICADO"));
    }
}
