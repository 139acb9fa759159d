//! Database schema commands.
//!
//! # Usage
//!
//! ```bash
//! ll-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `SITE_DATABASE_URL` - `PostgreSQL` connection string
//! - `DATABASE_URL` - Fallback connection string
//!
//! The schema is applied with `CREATE TABLE IF NOT EXISTS` statements, so the
//! command is safe to run repeatedly and against a database the site already
//! uses.

use secrecy::SecretString;
use thiserror::Error;

use leadlight_site::db;

/// Errors that can occur while applying the schema.
#[derive(Debug, Error)]
pub enum MigrateError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: set SITE_DATABASE_URL or DATABASE_URL")]
    MissingDatabaseUrl,

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Apply the full application schema.
///
/// # Errors
///
/// Returns `MigrateError::MissingDatabaseUrl` if no connection string is set.
/// Returns `MigrateError::Database` if the connection or a statement fails.
pub async fn run() -> Result<(), MigrateError> {
    dotenvy::dotenv().ok();

    let database_url = database_url()?;

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&database_url).await?;

    tracing::info!("Applying schema...");
    db::ensure_schema(&pool).await?;

    tracing::info!("Schema is up to date.");
    Ok(())
}

/// Read the connection string from the environment.
fn database_url() -> Result<SecretString, MigrateError> {
    std::env::var("SITE_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| MigrateError::MissingDatabaseUrl)
}
