//! CSV fallback log for form submissions.
//!
//! Every accepted submission is appended here, including ones the database
//! rejected. The file is the recovery path when the database is down: rows
//! carry a `persisted` flag so an operator can replay exactly the ones that
//! never made it.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::io::AsyncWriteExt;

/// Errors that can occur when appending to the backup log.
#[derive(Debug, Error)]
pub enum BackupError {
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV encoding error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// One row of the backup CSV.
///
/// The column set is the superset of both forms; fields the submitting form
/// doesn't have are left empty. Field order here is the file's column order.
#[derive(Debug, Serialize)]
pub struct BackupRow<'a> {
    /// Which form produced the row: `lead` or `audit`.
    pub form: &'a str,
    /// Name as entered on the form.
    pub name: &'a str,
    /// Email as entered on the form (lowercased).
    pub email: &'a str,
    /// Company, if shared.
    pub company: Option<&'a str>,
    /// `LinkedIn` profile URL, if the form collected one.
    pub linkedin_url: Option<&'a str>,
    /// Audit form: who the profile is trying to reach.
    pub target_audience: Option<&'a str>,
    /// Audit form: what the profile should achieve.
    pub goal: Option<&'a str>,
    /// Audit form: the requester's biggest challenge.
    pub challenge: Option<&'a str>,
    /// Whether the submitter agreed to be contacted.
    pub consent: bool,
    /// Lead source tag (e.g., `lead_magnet`).
    pub source: Option<&'a str>,
    /// Client IP of the submitter.
    pub client_ip: Option<&'a str>,
    /// User agent of the submitter.
    pub user_agent: Option<&'a str>,
    /// Whether the database write succeeded.
    pub persisted: bool,
    /// When the submission arrived.
    pub submitted_at: DateTime<Utc>,
}

/// Append-only CSV log, safe to share across handlers.
///
/// Appends are serialized through a mutex so concurrent submissions cannot
/// interleave partial rows. The header row is written once, when the file
/// is first created.
#[derive(Clone)]
pub struct BackupLog {
    path: PathBuf,
    lock: Arc<tokio::sync::Mutex<()>>,
}

impl BackupLog {
    /// Create a backup log writing to `path`.
    ///
    /// The file itself is created lazily on first append.
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            lock: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    /// Path the log writes to.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Append one row, creating the file (and header) if needed.
    ///
    /// # Errors
    ///
    /// Returns `BackupError` if encoding or the file write fails. Callers
    /// treat this as best-effort and only log the error.
    pub async fn append(&self, row: &BackupRow<'_>) -> Result<(), BackupError> {
        let _guard = self.lock.lock().await;

        let file_exists = tokio::fs::try_exists(&self.path).await?;
        let bytes = encode_row(row, !file_exists)?;

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(&bytes).await?;
        file.flush().await?;

        Ok(())
    }
}

/// Encode a single row (optionally preceded by the header) as CSV bytes.
fn encode_row(row: &BackupRow<'_>, with_header: bool) -> Result<Vec<u8>, BackupError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(with_header)
        .from_writer(Vec::new());
    writer.serialize(row)?;
    writer.flush()?;
    writer
        .into_inner()
        .map_err(|e| BackupError::Io(e.into_error()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn lead_row<'a>(name: &'a str, email: &'a str) -> BackupRow<'a> {
        BackupRow {
            form: "lead",
            name,
            email,
            company: None,
            linkedin_url: None,
            target_audience: None,
            goal: None,
            challenge: None,
            consent: true,
            source: Some("lead_magnet"),
            client_ip: Some("203.0.113.9"),
            user_agent: Some("test-agent"),
            persisted: true,
            submitted_at: Utc::now(),
        }
    }

    #[test]
    fn test_encode_row_with_header() {
        let row = lead_row("Ana", "ana@example.com");
        let bytes = encode_row(&row, true).unwrap();
        let text = String::from_utf8(bytes).unwrap();

        let mut lines = text.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("form,name,email,company,linkedin_url"));
        assert!(header.ends_with("persisted,submitted_at"));
        assert!(lines.next().unwrap().starts_with("lead,Ana,ana@example.com"));
    }

    #[test]
    fn test_encode_row_quotes_commas() {
        let row = lead_row("Doe, Jane", "jane@example.com");
        let bytes = encode_row(&row, false).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("\"Doe, Jane\""));
    }

    #[tokio::test]
    async fn test_append_writes_header_once() {
        let dir = tempfile::tempdir().unwrap();
        let log = BackupLog::new(dir.path().join("backup.csv"));

        log.append(&lead_row("Ana", "ana@example.com")).await.unwrap();
        log.append(&lead_row("Ben", "ben@example.com")).await.unwrap();

        let content = tokio::fs::read_to_string(log.path()).await.unwrap();
        assert_eq!(content.lines().count(), 3);

        let mut lines = content.lines();
        assert!(lines.next().unwrap().starts_with("form,name,email"));
        assert!(lines.next().unwrap().contains("ana@example.com"));
        assert!(lines.next().unwrap().contains("ben@example.com"));
    }

    #[tokio::test]
    async fn test_append_records_unpersisted_rows() {
        let dir = tempfile::tempdir().unwrap();
        let log = BackupLog::new(dir.path().join("backup.csv"));

        let mut row = lead_row("Ana", "ana@example.com");
        row.persisted = false;
        log.append(&row).await.unwrap();

        let content = tokio::fs::read_to_string(log.path()).await.unwrap();
        assert!(content.contains("false"));
    }
}
