//! Policy table and engine.

pub mod engine;
pub mod table;

pub use engine::{Denial, PolicyDecision, PolicyEngine};
pub use table::{PolicyEntry, PolicyTable};
