//! Configuration for the guard stack and its collaborators.
//!
//! Loaded from TOML, then overridden from `AULA_*` environment variables,
//! then validated. Every section has defaults so an empty file is valid.

use crate::errors::{AulaError, AulaResult};
use crate::records::{GradeRecord, StudentRecord};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Where denied attempts are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditBackend {
    /// JSON-lines file, synced after every append
    File,
    /// Process memory; lost on exit
    Memory,
}

/// Audit sink settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Backend kind
    pub backend: AuditBackend,
    /// Log file for the file backend
    pub path: PathBuf,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            backend: AuditBackend::File,
            path: PathBuf::from("audit/violations.jsonl"),
        }
    }
}

/// Diagnostics around allowed operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticsConfig {
    /// Install the timing layer
    pub timing: bool,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self { timing: true }
    }
}

/// Redirect targets of the response translator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedirectConfig {
    /// Security violation display surface
    pub violation_path: String,
    /// Resource-not-found display surface
    pub not_found_path: String,
}

impl Default for RedirectConfig {
    fn default() -> Self {
        Self {
            violation_path: "/error/violacion-seguridad".to_string(),
            not_found_path: "/error/estudiante-no-encontrado".to_string(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing` env-filter directive
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Initial gradebook content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    /// Roster
    pub students: Vec<StudentRecord>,
    /// Grades
    pub grades: Vec<GradeRecord>,
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AulaConfig {
    /// Audit sink
    pub audit: AuditConfig,
    /// Diagnostics layer
    pub diagnostics: DiagnosticsConfig,
    /// Response translator targets
    pub redirects: RedirectConfig,
    /// Logging
    pub logging: LoggingConfig,
    /// Gradebook seed data
    pub seed: SeedConfig,
}

impl AulaConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(content: &str) -> AulaResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load from a TOML file.
    pub fn load_from_file(path: &Path) -> AulaResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AulaError::invalid(format!(
                "Failed to read config file {}: {e}",
                path.display()
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// Load from `path` when it exists, defaults otherwise; then apply the
    /// environment and validate.
    pub fn load_or_default(path: &Path) -> AulaResult<Self> {
        let mut config = if path.exists() {
            Self::load_from_file(path)?
        } else {
            tracing::debug!(path = %path.display(), "Config file absent, using defaults");
            Self::default()
        };
        config.merge_with_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `AULA_*` overrides read through `lookup`.
    pub fn merge_with_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> AulaResult<()> {
        if let Some(path) = lookup("AULA_AUDIT_PATH") {
            self.audit.path = PathBuf::from(path);
        }
        if let Some(backend) = lookup("AULA_AUDIT_BACKEND") {
            self.audit.backend = match backend.to_ascii_lowercase().as_str() {
                "file" => AuditBackend::File,
                "memory" => AuditBackend::Memory,
                other => {
                    return Err(AulaError::invalid(format!(
                        "AULA_AUDIT_BACKEND must be file or memory, got {other}"
                    )))
                }
            };
        }
        if let Some(level) = lookup("AULA_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(timing) = lookup("AULA_DIAGNOSTICS_TIMING") {
            self.diagnostics.timing = timing.parse().map_err(|_| {
                AulaError::invalid(format!(
                    "AULA_DIAGNOSTICS_TIMING must be true or false, got {timing}"
                ))
            })?;
        }
        Ok(())
    }

    /// Reject configurations the guard stack cannot run with.
    pub fn validate(&self) -> AulaResult<()> {
        if self.audit.backend == AuditBackend::File && self.audit.path.as_os_str().is_empty() {
            return Err(AulaError::invalid("audit.path is required for the file backend"));
        }
        for (field, path) in [
            ("redirects.violation_path", &self.redirects.violation_path),
            ("redirects.not_found_path", &self.redirects.not_found_path),
        ] {
            if !path.starts_with('/') {
                return Err(AulaError::invalid(format!(
                    "{field} must be an absolute path, got {path:?}"
                )));
            }
        }
        if self.logging.level.trim().is_empty() {
            return Err(AulaError::invalid("logging.level must not be empty"));
        }
        Ok(())
    }
}
