//! Lead repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use leadlight_core::{Email, LeadId};

use super::RepositoryError;
use crate::models::lead::{Lead, NewLead};

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for `PostgreSQL` lead queries.
#[derive(Debug, sqlx::FromRow)]
struct LeadRow {
    id: i32,
    name: String,
    email: String,
    company: Option<String>,
    linkedin_url: Option<String>,
    consent: bool,
    source: String,
    client_ip: Option<String>,
    user_agent: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<LeadRow> for Lead {
    type Error = RepositoryError;

    fn try_from(row: LeadRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: LeadId::new(row.id),
            name: row.name,
            email,
            company: row.company,
            linkedin_url: row.linkedin_url,
            consent: row.consent,
            source: row.source,
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

/// Repository for lead database operations.
pub struct LeadRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> LeadRepository<'a> {
    /// Create a new lead repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a lead, or refresh the existing row when the email is already
    /// known.
    ///
    /// Resubmissions are an upsert: the latest name, company, URL, consent,
    /// source, and client metadata win, `updated_at` moves forward, and
    /// `created_at` and the ID are preserved.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the returned data is invalid.
    pub async fn upsert(&self, new: &NewLead) -> Result<Lead, RepositoryError> {
        let row = sqlx::query_as::<_, LeadRow>(
            r"
            INSERT INTO leads (name, email, company, linkedin_url, consent, source,
                               client_ip, user_agent)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (email) DO UPDATE
            SET name = EXCLUDED.name,
                company = EXCLUDED.company,
                linkedin_url = EXCLUDED.linkedin_url,
                consent = EXCLUDED.consent,
                source = EXCLUDED.source,
                client_ip = EXCLUDED.client_ip,
                user_agent = EXCLUDED.user_agent,
                updated_at = now()
            RETURNING id, name, email, company, linkedin_url, consent, source,
                      client_ip, user_agent, created_at, updated_at
            ",
        )
        .bind(&new.name)
        .bind(new.email.as_str())
        .bind(&new.company)
        .bind(&new.linkedin_url)
        .bind(new.consent)
        .bind(&new.source)
        .bind(&new.client_ip)
        .bind(&new.user_agent)
        .fetch_one(self.pool)
        .await?;

        row.try_into()
    }

    /// Get a lead by its email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<Lead>, RepositoryError> {
        let row = sqlx::query_as::<_, LeadRow>(
            r"
            SELECT id, name, email, company, linkedin_url, consent, source,
                   client_ip, user_agent, created_at, updated_at
            FROM leads
            WHERE email = $1
            ",
        )
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// List the most recently updated leads.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if any row is invalid.
    pub async fn list_recent(&self, limit: i64) -> Result<Vec<Lead>, RepositoryError> {
        let rows = sqlx::query_as::<_, LeadRow>(
            r"
            SELECT id, name, email, company, linkedin_url, consent, source,
                   client_ip, user_agent, created_at, updated_at
            FROM leads
            ORDER BY updated_at DESC
            LIMIT $1
            ",
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Count all leads.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM leads")
            .fetch_one(self.pool)
            .await?;

        Ok(count.0)
    }
}
