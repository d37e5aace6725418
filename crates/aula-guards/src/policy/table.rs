//! Static operation-to-access-class table.
//!
//! Built once at startup. Controllers the table knows get an explicit entry
//! per guarded operation plus an optional catch-all; anything else is
//! [`AccessClass::Unclassified`] and passes through unchecked.

use aula_core::operation::names;
use aula_core::{AccessClass, Controller, OperationDescriptor};
use std::collections::HashMap;

/// Classification of one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyEntry {
    /// Access class the rules are selected by
    pub class: AccessClass,
    /// The first integer argument is a grade id whose owner must be checked
    pub record_scoped: bool,
}

impl PolicyEntry {
    /// Entry that does not resolve record ownership.
    pub const fn plain(class: AccessClass) -> Self {
        Self {
            class,
            record_scoped: false,
        }
    }

    /// Entry parameterized by a grade record id.
    pub const fn by_record(class: AccessClass) -> Self {
        Self {
            class,
            record_scoped: true,
        }
    }

    /// Passthrough entry for operations outside the table.
    pub const fn unclassified() -> Self {
        Self::plain(AccessClass::Unclassified)
    }
}

/// The policy surface.
#[derive(Debug, Clone, Default)]
pub struct PolicyTable {
    entries: HashMap<(Controller, String), PolicyEntry>,
    catch_all: HashMap<Controller, PolicyEntry>,
}

impl PolicyTable {
    /// Empty table: everything is unclassified.
    pub fn new() -> Self {
        Self::default()
    }

    /// The grading application's table.
    pub fn standard() -> Self {
        use AccessClass::*;

        Self::new()
            .with_entry(Controller::Grades, names::grades::LIST, PolicyEntry::plain(ReadOwnGrade))
            .with_entry(
                Controller::Grades,
                names::grades::SHOW_AVERAGE_FORM,
                PolicyEntry::plain(ReadOwnGrade),
            )
            .with_entry(
                Controller::Grades,
                names::grades::COMPUTE_AVERAGE,
                PolicyEntry::plain(ComputeOwnAverage),
            )
            .with_entry(Controller::Grades, names::grades::CREATE, PolicyEntry::plain(WriteOnGrade))
            .with_entry(Controller::Grades, names::grades::SAVE, PolicyEntry::plain(WriteOnGrade))
            .with_entry(Controller::Grades, names::grades::EDIT, PolicyEntry::by_record(WriteOnGrade))
            .with_entry(
                Controller::Grades,
                names::grades::DELETE,
                PolicyEntry::by_record(WriteOnGrade),
            )
            .with_entry(
                Controller::Students,
                names::students::LIST,
                PolicyEntry::plain(ListStudentRecords),
            )
            .with_entry(
                Controller::Students,
                names::students::CREATE,
                PolicyEntry::plain(ManageStudentRecord),
            )
            .with_entry(
                Controller::Students,
                names::students::SAVE,
                PolicyEntry::plain(ManageStudentRecord),
            )
            .with_entry(
                Controller::Students,
                names::students::EDIT,
                PolicyEntry::plain(ManageStudentRecord),
            )
            .with_entry(
                Controller::Students,
                names::students::DELETE,
                PolicyEntry::plain(ManageStudentRecord),
            )
            // Unlisted student operations are treated as management.
            .with_catch_all(Controller::Students, PolicyEntry::plain(ManageStudentRecord))
            .with_catch_all(Controller::GradeService, PolicyEntry::plain(ComputeOwnAverage))
    }

    /// Add or replace the entry for one operation.
    pub fn with_entry(
        mut self,
        controller: Controller,
        operation: impl Into<String>,
        entry: PolicyEntry,
    ) -> Self {
        self.entries.insert((controller, operation.into()), entry);
        self
    }

    /// Classify every operation of `controller` without an explicit entry.
    pub fn with_catch_all(mut self, controller: Controller, entry: PolicyEntry) -> Self {
        self.catch_all.insert(controller, entry);
        self
    }

    /// Classify an intercepted call.
    pub fn classify(&self, descriptor: &OperationDescriptor) -> PolicyEntry {
        let key = (descriptor.controller.clone(), descriptor.operation.clone());
        self.entries
            .get(&key)
            .or_else(|| self.catch_all.get(&descriptor.controller))
            .copied()
            .unwrap_or_else(PolicyEntry::unclassified)
    }

    /// Explicit entries, for inspection.
    pub fn entries(&self) -> impl Iterator<Item = (&Controller, &str, &PolicyEntry)> {
        self.entries
            .iter()
            .map(|((controller, operation), entry)| (controller, operation.as_str(), entry))
    }
}
