//! Policy Engine
//!
//! Evaluates the rules selected by an operation's access class against the
//! current actor and, for record-scoped operations, the record's owner.
//! Evaluation fails closed: a missing argument, an unknown record, or a
//! storage failure all deny.
//!
//! Rule order:
//!
//! 1. Unclassified operations pass through.
//! 2. No actor: `UserNotAuthenticated`.
//! 3. Teachers: allowed.
//! 4. Record-scoped operations: the record must exist and belong to the
//!    student (`ResourceNotPermitted`), and the lookup must succeed
//!    (`UnauthorizedAccess`).
//! 5. `WriteOnGrade` and `ManageStudentRecord`: `OperationNotPermitted`.
//! 6. `ListStudentRecords`: allowed.
//! 7. `ReadOwnGrade` and `ComputeOwnAverage`: the first integer argument
//!    must equal the student's own id (`UnauthorizedAccess`).

use super::table::{PolicyEntry, PolicyTable};
use crate::ownership::{Ownership, OwnershipLookup};
use aula_core::{AccessClass, Actor, GradeId, OperationDescriptor, StudentId, ViolationKind};
use std::fmt;

/// Why an operation was denied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Denial {
    /// Violation category
    pub kind: ViolationKind,
    /// Short reason safe to show the caller
    pub reason: String,
    /// Audit text: reason, identifiers involved, operation, and arguments
    pub detail: String,
}

impl Denial {
    fn new(
        kind: ViolationKind,
        descriptor: &OperationDescriptor,
        reason: impl Into<String>,
        context: Option<String>,
    ) -> Self {
        let reason = reason.into();
        let mut detail = match context {
            Some(context) => format!("{reason} ({context})"),
            None => reason.clone(),
        };
        detail.push_str(&format!(
            "; operation: {}; arguments: {}",
            descriptor.qualified_name(),
            descriptor.arguments_display()
        ));
        Self {
            kind,
            reason,
            detail,
        }
    }
}

impl fmt::Display for Denial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.detail)
    }
}

/// Binary outcome of evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyDecision {
    /// Proceed with the operation.
    Allow,
    /// Do not run the operation.
    Deny(Denial),
}

impl PolicyDecision {
    /// Returns `true` if the decision allows the operation.
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }

    /// Returns `true` if the decision denies the operation.
    pub fn is_denied(&self) -> bool {
        !self.is_allowed()
    }

    /// Violation category of a denial.
    pub fn kind(&self) -> Option<ViolationKind> {
        match self {
            Self::Allow => None,
            Self::Deny(denial) => Some(denial.kind),
        }
    }
}

/// Classifies and evaluates intercepted operations.
#[derive(Debug, Clone)]
pub struct PolicyEngine {
    table: PolicyTable,
    ownership: OwnershipLookup,
}

impl PolicyEngine {
    /// Engine over a policy table and an ownership lookup.
    pub fn new(table: PolicyTable, ownership: OwnershipLookup) -> Self {
        Self { table, ownership }
    }

    /// The policy table.
    pub fn table(&self) -> &PolicyTable {
        &self.table
    }

    /// Classification of `descriptor`.
    pub fn classify(&self, descriptor: &OperationDescriptor) -> PolicyEntry {
        self.table.classify(descriptor)
    }

    /// Decide whether `actor` may run `descriptor`.
    pub async fn evaluate(
        &self,
        actor: Option<&Actor>,
        descriptor: &OperationDescriptor,
    ) -> PolicyDecision {
        let entry = self.classify(descriptor);
        if !entry.class.requires_authentication() {
            tracing::trace!(operation = %descriptor.qualified_name(), "Unclassified operation passes through");
            return PolicyDecision::Allow;
        }

        let Some(actor) = actor else {
            return PolicyDecision::Deny(Denial::new(
                ViolationKind::UserNotAuthenticated,
                descriptor,
                "authentication required",
                Some(format!(
                    "unauthenticated access attempt to {}",
                    descriptor.attempted_action()
                )),
            ));
        };

        if actor.is_teacher() {
            return PolicyDecision::Allow;
        }

        if entry.record_scoped {
            if let deny @ PolicyDecision::Deny(_) =
                self.check_record_ownership(actor, descriptor).await
            {
                return deny;
            }
        }

        let decision = match entry.class {
            AccessClass::WriteOnGrade => PolicyDecision::Deny(Denial::new(
                ViolationKind::OperationNotPermitted,
                descriptor,
                "students cannot modify grades",
                None,
            )),
            AccessClass::ManageStudentRecord => PolicyDecision::Deny(Denial::new(
                ViolationKind::OperationNotPermitted,
                descriptor,
                "students cannot manage student records",
                None,
            )),
            AccessClass::ListStudentRecords => {
                tracing::info!(actor = actor.name(), "Student viewing the student roster");
                PolicyDecision::Allow
            }
            AccessClass::ReadOwnGrade | AccessClass::ComputeOwnAverage => {
                check_student_scope(actor, descriptor)
            }
            AccessClass::Unclassified => PolicyDecision::Allow,
        };

        tracing::debug!(
            actor = actor.name(),
            operation = %descriptor.qualified_name(),
            class = %entry.class,
            allowed = decision.is_allowed(),
            "Policy evaluated"
        );
        decision
    }

    /// Ownership rule for operations addressed by grade id.
    ///
    /// Teachers may act on any record; a student only on records they own.
    pub async fn check_record_ownership(
        &self,
        actor: &Actor,
        descriptor: &OperationDescriptor,
    ) -> PolicyDecision {
        if actor.is_teacher() {
            return PolicyDecision::Allow;
        }

        let Some(raw_id) = descriptor.first_integer() else {
            return PolicyDecision::Deny(Denial::new(
                ViolationKind::OperationNotPermitted,
                descriptor,
                "invalid arguments",
                Some("no grade id supplied".to_string()),
            ));
        };
        let grade = GradeId::new(raw_id);

        match self.ownership.owner_of(grade).await {
            Ok(Ownership::OwnedBy(owner)) if actor.owned_student_id() == Some(owner) => {
                PolicyDecision::Allow
            }
            Ok(Ownership::OwnedBy(owner)) => PolicyDecision::Deny(Denial::new(
                ViolationKind::ResourceNotPermitted,
                descriptor,
                "resource belongs to a different student",
                Some(format!(
                    "grade {grade} belongs to student {owner}, requested by student {}",
                    describe_student(actor.owned_student_id())
                )),
            )),
            Ok(Ownership::NotFound) => PolicyDecision::Deny(Denial::new(
                ViolationKind::ResourceNotPermitted,
                descriptor,
                "resource does not exist",
                Some(format!("grade {grade}")),
            )),
            Err(err) => {
                tracing::error!(grade = %grade, error = %err, "Ownership lookup failed, denying");
                PolicyDecision::Deny(Denial::new(
                    ViolationKind::UnauthorizedAccess,
                    descriptor,
                    "technical failure validating access",
                    Some(err.to_string()),
                ))
            }
        }
    }
}

fn check_student_scope(actor: &Actor, descriptor: &OperationDescriptor) -> PolicyDecision {
    let requested = descriptor.first_integer().map(StudentId::new);
    match requested {
        Some(requested) if actor.owned_student_id() == Some(requested) => PolicyDecision::Allow,
        Some(requested) => PolicyDecision::Deny(Denial::new(
            ViolationKind::UnauthorizedAccess,
            descriptor,
            "students may only access their own records",
            Some(format!(
                "requested student {requested}, actor is student {}",
                describe_student(actor.owned_student_id())
            )),
        )),
        None => PolicyDecision::Deny(Denial::new(
            ViolationKind::UnauthorizedAccess,
            descriptor,
            "students may only access their own records",
            Some("no student id supplied".to_string()),
        )),
    }
}

fn describe_student(id: Option<StudentId>) -> String {
    id.map_or_else(|| "none".to_string(), |id| id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use aula_core::effects::{GradeStoreEffects, StoreError};
    use aula_core::operation::names;
    use aula_core::{Controller, GradeRecord};
    use std::sync::Arc;

    /// Grade 15 belongs to student 9, grade 20 to student 7, grade 99 fails.
    struct Fixture;

    #[async_trait]
    impl GradeStoreEffects for Fixture {
        async fn find_grade(&self, id: GradeId) -> Result<Option<GradeRecord>, StoreError> {
            let owner = match id.value() {
                15 => 9,
                20 => 7,
                99 => {
                    return Err(StoreError::ReadFailed {
                        reason: "timeout".into(),
                    })
                }
                _ => return Ok(None),
            };
            Ok(Some(GradeRecord {
                id,
                student_id: StudentId::new(owner),
                subject: "Matemáticas".into(),
                observation: None,
                value: 4.0,
                percentage: 20.0,
            }))
        }
    }

    fn engine() -> PolicyEngine {
        PolicyEngine::new(
            PolicyTable::standard(),
            OwnershipLookup::new(Arc::new(Fixture)),
        )
    }

    fn grades(op: &str) -> OperationDescriptor {
        OperationDescriptor::new(Controller::Grades, op)
    }

    fn luis() -> Actor {
        Actor::student("Luis", StudentId::new(7))
    }

    #[tokio::test]
    async fn student_editing_foreign_grade_is_resource_violation() {
        let decision = engine()
            .evaluate(Some(&luis()), &grades(names::grades::EDIT).with_argument(15))
            .await;
        let PolicyDecision::Deny(denial) = decision else {
            panic!("expected deny");
        };
        assert_eq!(denial.kind, ViolationKind::ResourceNotPermitted);
        assert_eq!(denial.reason, "resource belongs to a different student");
        assert!(denial.detail.contains("student 9"));
        assert!(denial.detail.contains("student 7"));
    }

    #[tokio::test]
    async fn student_editing_own_grade_still_cannot_write() {
        let decision = engine()
            .evaluate(Some(&luis()), &grades(names::grades::EDIT).with_argument(20))
            .await;
        assert_eq!(decision.kind(), Some(ViolationKind::OperationNotPermitted));

        let ownership = engine()
            .check_record_ownership(&luis(), &grades(names::grades::EDIT).with_argument(20))
            .await;
        assert!(ownership.is_allowed());
    }

    #[tokio::test]
    async fn missing_record_and_lookup_failure_deny() {
        let missing = engine()
            .evaluate(Some(&luis()), &grades(names::grades::DELETE).with_argument(404))
            .await;
        let PolicyDecision::Deny(denial) = missing else {
            panic!("expected deny");
        };
        assert_eq!(denial.kind, ViolationKind::ResourceNotPermitted);
        assert_eq!(denial.reason, "resource does not exist");

        let failed = engine()
            .evaluate(Some(&luis()), &grades(names::grades::DELETE).with_argument(99))
            .await;
        let PolicyDecision::Deny(denial) = failed else {
            panic!("expected deny");
        };
        assert_eq!(denial.kind, ViolationKind::UnauthorizedAccess);
        assert_eq!(denial.reason, "technical failure validating access");
    }

    #[tokio::test]
    async fn record_scoped_call_without_id_is_invalid() {
        let decision = engine()
            .evaluate(Some(&luis()), &grades(names::grades::EDIT).with_argument("quince"))
            .await;
        let PolicyDecision::Deny(denial) = decision else {
            panic!("expected deny");
        };
        assert_eq!(denial.kind, ViolationKind::OperationNotPermitted);
        assert_eq!(denial.reason, "invalid arguments");
    }

    #[tokio::test]
    async fn anonymous_caller_needs_authentication() {
        let decision = engine()
            .evaluate(None, &grades(names::grades::LIST).with_argument(7))
            .await;
        assert_eq!(decision.kind(), Some(ViolationKind::UserNotAuthenticated));

        let passthrough = engine()
            .evaluate(None, &OperationDescriptor::new(Controller::Other("Inicio".into()), "index"))
            .await;
        assert!(passthrough.is_allowed());
    }

    #[tokio::test]
    async fn teacher_is_unrestricted() {
        let ana = Actor::teacher("Ana");
        for descriptor in [
            grades(names::grades::DELETE).with_argument(99),
            grades(names::grades::LIST).with_argument(8),
            OperationDescriptor::new(Controller::Students, names::students::DELETE).with_argument(3),
        ] {
            assert!(engine().evaluate(Some(&ana), &descriptor).await.is_allowed());
        }
    }

    #[tokio::test]
    async fn student_scope_uses_first_integer_argument() {
        let own = grades(names::grades::COMPUTE_AVERAGE)
            .with_argument("Historia")
            .with_argument(7);
        assert!(engine().evaluate(Some(&luis()), &own).await.is_allowed());

        let other = grades(names::grades::LIST).with_argument(8);
        assert_eq!(
            engine().evaluate(Some(&luis()), &other).await.kind(),
            Some(ViolationKind::UnauthorizedAccess)
        );

        let none = grades(names::grades::SHOW_AVERAGE_FORM);
        assert_eq!(
            engine().evaluate(Some(&luis()), &none).await.kind(),
            Some(ViolationKind::UnauthorizedAccess)
        );
    }

    #[tokio::test]
    async fn students_may_list_the_roster_but_not_manage_it() {
        let list = OperationDescriptor::new(Controller::Students, names::students::LIST);
        assert!(engine().evaluate(Some(&luis()), &list).await.is_allowed());

        let export = OperationDescriptor::new(Controller::Students, "exportar");
        assert_eq!(
            engine().evaluate(Some(&luis()), &export).await.kind(),
            Some(ViolationKind::OperationNotPermitted)
        );
    }
}
