//! Append-only audit log file
//!
//! One human-auditable text file holds every analyzed submission. The
//! writer owns the file path and the mutual-exclusion lock serializing
//! the append critical section; it is constructed once at startup and
//! shared by reference, never through ambient globals.
//!
//! Structural guarantee: record boundaries are recoverable by scanning
//! for the 80-character `=` separator line. Record bodies are free text.

use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::error::{Error, Result};

/// Width of the separator rules.
const RULE_WIDTH: usize = 80;

/// Record/header boundary line (80 `=` characters).
pub fn separator() -> String {
    "=".repeat(RULE_WIDTH)
}

/// Intra-record section divider (80 `-` characters).
fn divider() -> String {
    "-".repeat(RULE_WIDTH)
}

/// Current UTC timestamp in the log's fixed format.
pub fn utc_timestamp() -> String {
    chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Aggregate log statistics from a full file scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogStats {
    /// Number of complete records in the file
    pub total_entries: u64,
    /// File size in bytes
    pub file_size_bytes: u64,
}

/// Append-only audit log writer.
pub struct AuditLog {
    path: PathBuf,
    backend_id: String,
    /// Serializes the whole open-append-close sequence. Held for the
    /// format-and-write only, never across analysis.
    write_lock: Mutex<()>,
}

impl AuditLog {
    pub fn new(path: impl Into<PathBuf>, backend_id: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            backend_id: backend_id.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the log file currently exists (liveness probe flag).
    pub async fn exists(&self) -> bool {
        fs::metadata(&self.path).await.is_ok()
    }

    /// (Re)create the log file with its header block. Destructive:
    /// discards any prior content. Startup-only; never concurrent with
    /// appends.
    pub async fn initialize(&self) -> Result<()> {
        let header = format!(
            "\nKEYSTROKE SECURITY ANALYSIS LOG\n\
             Generated: {}\n\
             Model: {}\n\
             Log File: {}\n\n\
             This file contains keystroke analysis for sensitive information detection.\n\
             Each entry includes timestamp, application name, original keylogs, and the analysis verdict.\n\n\
             {}\n\n",
            utc_timestamp(),
            self.backend_id,
            self.path.display(),
            separator(),
        );

        fs::write(&self.path, header).await.map_err(|e| {
            Error::Audit(format!(
                "Failed to initialize log file {}: {}",
                self.path.display(),
                e
            ))
        })
    }

    /// Append one record. Write failures are reported to the operator
    /// channel and never propagated: the submission is considered
    /// processed even when durability failed, and the record is lost
    /// rather than requeued.
    pub async fn append(
        &self,
        timestamp: &str,
        context_label: &str,
        original_text: &str,
        verdict_text: &str,
    ) {
        if let Err(e) = self
            .try_append(timestamp, context_label, original_text, verdict_text)
            .await
        {
            tracing::error!(
                path = %self.path.display(),
                error = %e,
                "Failed to write audit record"
            );
        }
    }

    async fn try_append(
        &self,
        timestamp: &str,
        context_label: &str,
        original_text: &str,
        verdict_text: &str,
    ) -> Result<()> {
        let block = format!(
            "{sep}\nTIMESTAMP: {timestamp}\nAPPLICATION: {context_label}\n{div}\n\
             ORIGINAL KEYLOGS:\n{original_text}\n{div}\n\
             SENSITIVE INFORMATION ANALYSIS:\n{verdict_text}\n{sep}\n\n",
            sep = separator(),
            div = divider(),
        );

        // Critical section: exactly one open-append-close at a time, the
        // whole block in a single write so records never interleave.
        let _guard = self.write_lock.lock().await;
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| {
                Error::Audit(format!(
                    "Failed to open log file {}: {}",
                    self.path.display(),
                    e
                ))
            })?;
        file.write_all(block.as_bytes())
            .await
            .map_err(|e| Error::Audit(format!("Failed to write record: {}", e)))?;
        file.flush()
            .await
            .map_err(|e| Error::Audit(format!("Failed to flush record: {}", e)))?;
        Ok(())
    }

    /// Scan the file and report aggregate statistics.
    ///
    /// Each record contributes two separator lines (its upper and lower
    /// bound) and the header one, so entries = (separators - 1) / 2,
    /// floored at zero when the header is missing or corrupted.
    pub async fn stats(&self) -> Result<LogStats> {
        let content = fs::read_to_string(&self.path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::NotFound(self.path.display().to_string())
            } else {
                Error::Io(e)
            }
        })?;

        let sep = separator();
        let separators = content.lines().filter(|line| *line == sep).count() as u64;
        let total_entries = separators.saturating_sub(1) / 2;

        let file_size_bytes = fs::metadata(&self.path).await?.len();

        Ok(LogStats {
            total_entries,
            file_size_bytes,
        })
    }
}
