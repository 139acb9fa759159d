//! Audit request repository for database operations.
//!
//! Audit requests accumulate: every submission inserts a new row, even for a
//! repeat email address. Only the review status is ever mutated.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use leadlight_core::{AuditRequestId, AuditStatus, Email};

use super::RepositoryError;
use crate::models::audit::{AuditRequest, NewAuditRequest};

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for `PostgreSQL` audit request queries.
#[derive(Debug, sqlx::FromRow)]
struct AuditRequestRow {
    id: i32,
    name: String,
    email: String,
    linkedin_url: String,
    target_audience: String,
    goal: String,
    challenge: Option<String>,
    company: Option<String>,
    consent: bool,
    status: String,
    client_ip: Option<String>,
    user_agent: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AuditRequestRow> for AuditRequest {
    type Error = RepositoryError;

    fn try_from(row: AuditRequestRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let status = AuditStatus::from_str(&row.status).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid audit status in database: {e}"))
        })?;

        Ok(Self {
            id: AuditRequestId::new(row.id),
            name: row.name,
            email,
            linkedin_url: row.linkedin_url,
            target_audience: row.target_audience,
            goal: row.goal,
            challenge: row.challenge,
            company: row.company,
            consent: row.consent,
            status,
            client_ip: row.client_ip,
            user_agent: row.user_agent,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for audit request database operations.
pub struct AuditRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AuditRepository<'a> {
    /// Create a new audit request repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new audit request with status `pending`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    /// Returns `RepositoryError::DataCorruption` if the returned data is invalid.
    pub async fn create(&self, new: &NewAuditRequest) -> Result<AuditRequest, RepositoryError> {
        let row = sqlx::query_as::<_, AuditRequestRow>(
            r"
            INSERT INTO audit_requests
                (name, email, linkedin_url, target_audience, goal, challenge,
                 company, consent, client_ip, user_agent)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id, name, email, linkedin_url, target_audience, goal,
                      challenge, company, consent, status, client_ip, user_agent,
                      created_at, updated_at
            ",
        )
        .bind(&new.name)
        .bind(new.email.as_str())
        .bind(&new.linkedin_url)
        .bind(&new.target_audience)
        .bind(&new.goal)
        .bind(&new.challenge)
        .bind(&new.company)
        .bind(new.consent)
        .bind(&new.client_ip)
        .bind(&new.user_agent)
        .fetch_one(self.pool)
        .await?;

        row.try_into()
    }

    /// Get an audit request by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_by_id(
        &self,
        id: AuditRequestId,
    ) -> Result<Option<AuditRequest>, RepositoryError> {
        let row = sqlx::query_as::<_, AuditRequestRow>(
            r"
            SELECT id, name, email, linkedin_url, target_audience, goal,
                   challenge, company, consent, status, client_ip, user_agent,
                   created_at, updated_at
            FROM audit_requests
            WHERE id = $1
            ",
        )
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// List the most recent audit requests.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if any row is invalid.
    pub async fn list_recent(&self, limit: i64) -> Result<Vec<AuditRequest>, RepositoryError> {
        let rows = sqlx::query_as::<_, AuditRequestRow>(
            r"
            SELECT id, name, email, linkedin_url, target_audience, goal,
                   challenge, company, consent, status, client_ip, user_agent,
                   created_at, updated_at
            FROM audit_requests
            ORDER BY created_at DESC
            LIMIT $1
            ",
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Count audit requests awaiting review.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_pending(&self) -> Result<i64, RepositoryError> {
        let count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM audit_requests WHERE status = $1")
                .bind(AuditStatus::Pending.as_str())
                .fetch_one(self.pool)
                .await?;

        Ok(count.0)
    }

    /// Update the review status of an audit request.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no row has that ID.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn set_status(
        &self,
        id: AuditRequestId,
        status: AuditStatus,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query::<sqlx::Postgres>(
            r"
            UPDATE audit_requests
            SET status = $1, updated_at = now()
            WHERE id = $2
            ",
        )
        .bind(status.as_str())
        .bind(id.as_i32())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
