//! # Aula Store - Collaborator Handlers
//!
//! Implementations of the collaborator contracts the guard layer consumes:
//!
//! - [`MemorySessionStore`]: session-identity store
//! - [`MemoryGradebook`]: grade and student records; also the wrapped
//!   operation handler behind the guard stack
//! - [`MemoryAuditLog`] and [`FileAuditLog`]: append-only audit stores

pub mod audit;
pub mod gradebook;
pub mod session;

pub use audit::{open_audit_log, FileAuditLog, MemoryAuditLog};
pub use gradebook::MemoryGradebook;
pub use session::MemorySessionStore;
