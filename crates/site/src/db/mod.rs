//! Database operations for the site `PostgreSQL`.
//!
//! ## Tables
//!
//! - `leads` - Lead magnet signups (one row per email, latest values win)
//! - `email_log` - Append-only log of every send attempt
//! - `audit_requests` - Profile audit requests (every submission kept)
//! - `users` - Site accounts with argon2 password hashes
//! - `password_reset_tokens` - Single-use hashed reset tokens
//!
//! The session table is managed separately by `tower-sessions-sqlx-store`.
//!
//! # Schema setup
//!
//! [`ensure_schema`] creates every table with `CREATE TABLE IF NOT EXISTS` and
//! is safe to run on every startup. The CLI exposes the same routine:
//! ```bash
//! cargo run -p leadlight-cli -- migrate
//! ```

pub mod audits;
pub mod email_log;
pub mod leads;
pub mod password_resets;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use audits::AuditRepository;
pub use email_log::EmailLogRepository;
pub use leads::LeadRepository;
pub use password_resets::PasswordResetRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// DDL statements executed by [`ensure_schema`], in order.
///
/// Every statement is idempotent. `email_log.lead_id` is deliberately a weak
/// reference (no foreign key) so a log row survives lead deletion.
const SCHEMA_DDL: &[&str] = &[
    r"
    CREATE TABLE IF NOT EXISTS leads (
        id          SERIAL PRIMARY KEY,
        name        TEXT NOT NULL,
        email       TEXT NOT NULL UNIQUE,
        company     TEXT,
        linkedin_url TEXT,
        consent     BOOLEAN NOT NULL DEFAULT TRUE,
        source      TEXT NOT NULL DEFAULT 'lead_magnet',
        client_ip   TEXT,
        user_agent  TEXT,
        created_at  TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at  TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS email_log (
        id          SERIAL PRIMARY KEY,
        lead_id     INTEGER,
        recipient   TEXT NOT NULL,
        subject     TEXT NOT NULL,
        template    TEXT NOT NULL,
        status      TEXT NOT NULL,
        error       TEXT,
        sent_at     TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    ",
    r"CREATE INDEX IF NOT EXISTS idx_email_log_recipient ON email_log (recipient)",
    r"
    CREATE TABLE IF NOT EXISTS audit_requests (
        id              SERIAL PRIMARY KEY,
        name            TEXT NOT NULL,
        email           TEXT NOT NULL,
        linkedin_url    TEXT NOT NULL,
        target_audience TEXT NOT NULL,
        goal            TEXT NOT NULL,
        challenge       TEXT,
        company         TEXT,
        consent         BOOLEAN NOT NULL DEFAULT TRUE,
        status          TEXT NOT NULL DEFAULT 'pending',
        client_ip       TEXT,
        user_agent      TEXT,
        created_at      TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at      TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    ",
    r"CREATE INDEX IF NOT EXISTS idx_audit_requests_status ON audit_requests (status)",
    r"
    CREATE TABLE IF NOT EXISTS users (
        id            SERIAL PRIMARY KEY,
        email         TEXT NOT NULL UNIQUE,
        name          TEXT NOT NULL,
        password_hash TEXT NOT NULL,
        is_admin      BOOLEAN NOT NULL DEFAULT FALSE,
        created_at    TIMESTAMPTZ NOT NULL DEFAULT now(),
        last_login    TIMESTAMPTZ
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS password_reset_tokens (
        id         SERIAL PRIMARY KEY,
        user_id    INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        token_hash TEXT NOT NULL UNIQUE,
        expires_at TIMESTAMPTZ NOT NULL,
        used_at    TIMESTAMPTZ,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    ",
    r"CREATE INDEX IF NOT EXISTS idx_password_reset_tokens_user_id
      ON password_reset_tokens (user_id)",
];

/// Create all application tables if they do not exist.
///
/// Runs each DDL statement in order, outside a transaction. Safe to call on
/// every startup and from the CLI `migrate` command.
///
/// # Errors
///
/// Returns `sqlx::Error` if any statement fails.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    for ddl in SCHEMA_DDL {
        sqlx::query(ddl).execute(pool).await?;
    }
    tracing::debug!(statements = SCHEMA_DDL.len(), "Schema ensured");
    Ok(())
}
