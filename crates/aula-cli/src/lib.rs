//! Aula CLI library
//!
//! Wiring of the guard stack from configuration, plus the command handlers
//! the `aula` binary dispatches to.

pub mod app;
pub mod commands;

pub use app::App;
