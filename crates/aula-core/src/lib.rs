//! # Aula Core - Foundation
//!
//! Shared vocabulary for the grading records guard: who is acting, what they
//! are trying to do, how an attempt is classified, and what a denied attempt
//! leaves behind.
//!
//! # Architecture Constraints
//!
//! - YES domain types (actors, operation descriptors, violation records)
//! - YES collaborator contracts as effect traits (session, grade storage,
//!   audit storage, clock)
//! - YES the unified error type and configuration
//! - NO policy evaluation or interception (that's `aula-guards`)
//! - NO storage implementations (that's `aula-store`)

#![forbid(unsafe_code)]

/// Access classes assigned by the policy table
pub mod access;

/// Session principal and role model
pub mod actor;

/// Configuration loading and validation
pub mod config;

/// Collaborator contracts consumed by the guard layer
pub mod effects;

/// Unified error type
pub mod errors;

/// Strongly typed identifiers
pub mod identifiers;

/// Intercepted operation descriptors
pub mod operation;

/// Grade and student records owned by the storage collaborator
pub mod records;

/// Violation signals and audit records
pub mod violation;

pub use access::AccessClass;
pub use actor::{Actor, IdentificationError, Role};
pub use config::{
    AulaConfig, AuditBackend, AuditConfig, DiagnosticsConfig, LoggingConfig, RedirectConfig,
    SeedConfig,
};
pub use errors::{AulaError, AulaResult};
pub use identifiers::{GradeId, SessionId, StudentId, ViolationId};
pub use operation::{Argument, Controller, OperationDescriptor};
pub use records::{GradeRecord, StudentRecord};
pub use violation::{ViolationDraft, ViolationKind, ViolationRecord, ViolationSignal};
