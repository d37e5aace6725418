//! Durable audit log: one JSON record per line, synced on flush.

use async_trait::async_trait;
use aula_core::effects::{AuditEffects, AuditError};
use aula_core::{ViolationDraft, ViolationId, ViolationRecord};
use std::path::{Path, PathBuf};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

struct Writer {
    file: File,
    next_id: i64,
}

/// JSON-lines audit file.
///
/// Appends are serialized behind one lock, so ids are unique and increase
/// in file order. Ids continue from the highest id already in the file.
pub struct FileAuditLog {
    path: PathBuf,
    writer: Mutex<Writer>,
}

impl FileAuditLog {
    /// Open or create the log at `path`, creating parent directories.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, AuditError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(|e| AuditError::AppendFailed {
                reason: format!("creating {}: {e}", parent.display()),
            })?;
        }

        let existing = read_records(&path).await?;
        let next_id = existing
            .iter()
            .map(|r| r.id.value())
            .max()
            .unwrap_or(0)
            .checked_add(1)
            .ok_or_else(|| AuditError::AppendFailed {
                reason: format!("{} has exhausted the record id space", path.display()),
            })?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| AuditError::AppendFailed {
                reason: format!("opening {}: {e}", path.display()),
            })?;

        tracing::debug!(path = %path.display(), existing = existing.len(), "Audit log opened");
        Ok(Self {
            path,
            writer: Mutex::new(Writer { file, next_id }),
        })
    }

    /// Location of the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

async fn read_records(path: &Path) -> Result<Vec<ViolationRecord>, AuditError> {
    let content = match fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(AuditError::ReadFailed {
                reason: format!("reading {}: {e}", path.display()),
            })
        }
    };

    let mut records = Vec::new();
    for (number, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<ViolationRecord>(line) {
            Ok(record) => records.push(record),
            Err(e) => tracing::warn!(
                path = %path.display(),
                line = number + 1,
                error = %e,
                "Skipping unreadable audit line"
            ),
        }
    }
    Ok(records)
}

#[async_trait]
impl AuditEffects for FileAuditLog {
    async fn append(&self, draft: ViolationDraft) -> Result<ViolationRecord, AuditError> {
        let mut writer = self.writer.lock().await;
        let id = writer.next_id;
        // A failed write leaves a gap, never a reused id.
        writer.next_id = id.checked_add(1).ok_or_else(|| AuditError::AppendFailed {
            reason: "record id space exhausted".into(),
        })?;
        let record = draft.into_record(ViolationId::new(id));
        let mut line = serde_json::to_string(&record).map_err(|e| AuditError::AppendFailed {
            reason: e.to_string(),
        })?;
        line.push('\n');

        writer
            .file
            .write_all(line.as_bytes())
            .await
            .map_err(|e| AuditError::AppendFailed {
                reason: e.to_string(),
            })?;
        writer.file.flush().await.map_err(|e| AuditError::AppendFailed {
            reason: e.to_string(),
        })?;
        Ok(record)
    }

    async fn force_flush(&self) -> Result<(), AuditError> {
        let writer = self.writer.lock().await;
        writer
            .file
            .sync_data()
            .await
            .map_err(|e| AuditError::FlushFailed {
                reason: e.to_string(),
            })
    }

    async fn list(&self) -> Result<Vec<ViolationRecord>, AuditError> {
        // Hold the writer so a concurrent append is not read half-written.
        let _writer = self.writer.lock().await;
        read_records(&self.path).await
    }
}

impl std::fmt::Debug for FileAuditLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileAuditLog")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}
