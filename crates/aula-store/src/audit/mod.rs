//! Append-only audit stores

mod file;
mod memory;

pub use file::FileAuditLog;
pub use memory::MemoryAuditLog;

use aula_core::effects::AuditEffects;
use aula_core::{AuditBackend, AuditConfig, AulaError, AulaResult};
use std::sync::Arc;

/// Open the audit store selected by `config`.
pub async fn open_audit_log(config: &AuditConfig) -> AulaResult<Arc<dyn AuditEffects>> {
    match config.backend {
        AuditBackend::Memory => Ok(Arc::new(MemoryAuditLog::new())),
        AuditBackend::File => {
            let log = FileAuditLog::open(&config.path)
                .await
                .map_err(|e| AulaError::storage(e.to_string()))?;
            Ok(Arc::new(log))
        }
    }
}
