//! Collaborator contracts.
//!
//! The guard layer never touches storage directly. It consumes these traits,
//! and `aula-store` provides the handlers.
//!
//! - [`SessionEffects`]: the session-identity store (get/set current actor)
//! - [`GradeStoreEffects`]: point lookup of grade records
//! - [`AuditEffects`]: append-only audit sink with forced flush
//! - [`ClockEffects`]: wall-clock time for audit timestamps

pub mod audit;
pub mod clock;
pub mod grades;
pub mod session;

pub use audit::{AuditEffects, AuditError};
pub use clock::{ClockEffects, SystemClock};
pub use grades::{GradeStoreEffects, StoreError};
pub use session::{SessionEffects, SessionError};
