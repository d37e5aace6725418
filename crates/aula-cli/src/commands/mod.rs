//! Command handlers

pub mod audit;
pub mod invoke;

pub use audit::{handle_audit_command, AuditCommand};
pub use invoke::{handle_invoke_command, InvokeCommand};
