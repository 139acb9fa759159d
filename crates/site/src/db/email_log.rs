//! Email log repository for database operations.
//!
//! The log is append-only. Every send attempt gets exactly one row, whether
//! the SMTP handoff succeeded or failed, and rows are never updated.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use leadlight_core::{DeliveryStatus, EmailRecordId, LeadId};

use super::RepositoryError;
use crate::models::email_log::{EmailRecord, NewEmailRecord};

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for `PostgreSQL` email log queries.
#[derive(Debug, sqlx::FromRow)]
struct EmailRecordRow {
    id: i32,
    lead_id: Option<i32>,
    recipient: String,
    subject: String,
    template: String,
    status: String,
    error: Option<String>,
    sent_at: DateTime<Utc>,
}

impl TryFrom<EmailRecordRow> for EmailRecord {
    type Error = RepositoryError;

    fn try_from(row: EmailRecordRow) -> Result<Self, Self::Error> {
        let status = DeliveryStatus::from_str(&row.status).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid delivery status in database: {e}"))
        })?;

        Ok(Self {
            id: EmailRecordId::new(row.id),
            lead_id: row.lead_id.map(LeadId::new),
            recipient: row.recipient,
            subject: row.subject,
            template: row.template,
            status,
            error: row.error,
            sent_at: row.sent_at,
        })
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for email log database operations.
pub struct EmailLogRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> EmailLogRepository<'a> {
    /// Create a new email log repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Append a send attempt to the log.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn record(&self, new: &NewEmailRecord) -> Result<EmailRecordId, RepositoryError> {
        let id: (i32,) = sqlx::query_as(
            r"
            INSERT INTO email_log (lead_id, recipient, subject, template, status, error)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            ",
        )
        .bind(new.lead_id.map(|id| id.as_i32()))
        .bind(&new.recipient)
        .bind(&new.subject)
        .bind(&new.template)
        .bind(new.status.as_str())
        .bind(&new.error)
        .fetch_one(self.pool)
        .await?;

        Ok(EmailRecordId::new(id.0))
    }

    /// List the most recent send attempts.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if any row is invalid.
    pub async fn list_recent(&self, limit: i64) -> Result<Vec<EmailRecord>, RepositoryError> {
        let rows = sqlx::query_as::<_, EmailRecordRow>(
            r"
            SELECT id, lead_id, recipient, subject, template, status, error, sent_at
            FROM email_log
            ORDER BY sent_at DESC
            LIMIT $1
            ",
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Count failed sends since the given time.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_failures_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<i64, RepositoryError> {
        let count: (i64,) = sqlx::query_as(
            r"
            SELECT COUNT(*) FROM email_log
            WHERE status = $1 AND sent_at >= $2
            ",
        )
        .bind(DeliveryStatus::Failed.as_str())
        .bind(since)
        .fetch_one(self.pool)
        .await?;

        Ok(count.0)
    }
}
