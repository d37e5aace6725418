//! `aula audit`: inspect recorded violations.

use crate::app::App;
use anyhow::Result;
use aula_core::effects::AuditEffects;
use clap::Args;

/// Inspect the audit trail
#[derive(Debug, Clone, Args)]
pub struct AuditCommand {
    /// Print only the number of records
    #[arg(long)]
    pub count: bool,
}

/// Render the audit trail, oldest record first.
pub async fn handle_audit_command(app: &App, command: &AuditCommand) -> Result<String> {
    if command.count {
        return Ok(app.audit().count().await?.to_string());
    }
    let records = app.audit().list().await?;
    if records.is_empty() {
        return Ok("No violations recorded".to_string());
    }
    Ok(records
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n\n"))
}
