//! Admin user management commands.
//!
//! # Usage
//!
//! ```bash
//! # Create a new admin user
//! ll-cli admin create -e admin@example.com -n "Ana Admin" -p <password>
//!
//! # Grant the admin flag to an existing user
//! ll-cli admin promote -e user@example.com
//!
//! # Revoke the admin flag (refused for the only remaining admin)
//! ll-cli admin demote -e user@example.com
//! ```
//!
//! # Environment Variables
//!
//! - `SITE_DATABASE_URL` - `PostgreSQL` connection string
//! - `DATABASE_URL` - Fallback connection string

use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;

use leadlight_core::Email;
use leadlight_site::db::{self, RepositoryError, UserRepository};
use leadlight_site::services::auth::{self, AuthError};

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: set SITE_DATABASE_URL or DATABASE_URL")]
    MissingDatabaseUrl,

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Repository error.
    #[error("Database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    /// Name missing.
    #[error("Name cannot be empty")]
    EmptyName,

    /// Password validation or hashing failure.
    #[error("{0}")]
    Password(#[from] AuthError),

    /// User already exists.
    #[error("A user already exists with email: {0}")]
    UserExists(String),

    /// No user with that email.
    #[error("No user found with email: {0}")]
    UserNotFound(String),

    /// Demoting would leave the site without admins.
    #[error("Refusing to demote the only admin: {0}")]
    LastAdmin(String),
}

/// Create a new admin user.
///
/// # Arguments
///
/// * `email` - Admin's email address
/// * `name` - Admin's display name
/// * `password` - Admin's password (hashed before storage)
///
/// # Returns
///
/// The ID of the created admin user.
///
/// # Errors
///
/// Returns `AdminError::UserExists` if the email is already registered, or
/// the corresponding variant for validation and database failures.
pub async fn create_user(email: &str, name: &str, password: &str) -> Result<i32, AdminError> {
    dotenvy::dotenv().ok();

    let email = parse_email(email)?;

    let name = name.trim();
    if name.is_empty() {
        return Err(AdminError::EmptyName);
    }

    auth::validate_password(password)?;
    let password_hash = auth::hash_password(password)?;

    let pool = connect().await?;
    let users = UserRepository::new(&pool);

    tracing::info!("Creating admin user: {}", email);

    let user = users
        .create(&email, name, &password_hash, true)
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(_) => AdminError::UserExists(email.as_str().to_owned()),
            other => AdminError::Repository(other),
        })?;

    tracing::info!(
        "Admin user created successfully! ID: {}, Email: {}",
        user.id,
        user.email
    );

    Ok(user.id.as_i32())
}

/// Grant or revoke the admin flag on an existing user.
///
/// Revoking is refused when the user is the only admin left; the site must
/// always keep at least one account that can reach the admin views.
///
/// # Errors
///
/// Returns `AdminError::UserNotFound` if the email is not registered.
/// Returns `AdminError::LastAdmin` when demoting the only remaining admin.
pub async fn set_admin_flag(email: &str, is_admin: bool) -> Result<(), AdminError> {
    dotenvy::dotenv().ok();

    let email = parse_email(email)?;

    let pool = connect().await?;
    let users = UserRepository::new(&pool);

    let user = users
        .get_by_email(&email)
        .await?
        .ok_or_else(|| AdminError::UserNotFound(email.as_str().to_owned()))?;

    if !is_admin && user.is_admin && users.admin_count().await? <= 1 {
        return Err(AdminError::LastAdmin(email.as_str().to_owned()));
    }

    users.set_admin(user.id, is_admin).await?;

    let role = if is_admin { "admin" } else { "regular user" };
    tracing::info!("{} is now a {}", user.email, role);

    Ok(())
}

/// Normalize and validate an email argument.
fn parse_email(raw: &str) -> Result<Email, AdminError> {
    Email::parse(&raw.trim().to_lowercase()).map_err(|_| AdminError::InvalidEmail(raw.to_owned()))
}

/// Connect to the site database.
async fn connect() -> Result<PgPool, AdminError> {
    let database_url = std::env::var("SITE_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| AdminError::MissingDatabaseUrl)?;

    tracing::info!("Connecting to database...");
    Ok(db::create_pool(&database_url).await?)
}
