//! Password reset token repository.
//!
//! Tokens are stored hashed (SHA-256 of the random token). The raw token only
//! ever appears in the reset email, so a database leak exposes nothing usable.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use leadlight_core::{PasswordResetId, UserId};

use super::RepositoryError;

/// Repository for password reset token operations.
pub struct PasswordResetRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PasswordResetRepository<'a> {
    /// Create a new password reset repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Store a hashed reset token for a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        user_id: UserId,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<PasswordResetId, RepositoryError> {
        let id: (i32,) = sqlx::query_as(
            r"
            INSERT INTO password_reset_tokens (user_id, token_hash, expires_at)
            VALUES ($1, $2, $3)
            RETURNING id
            ",
        )
        .bind(user_id.as_i32())
        .bind(token_hash)
        .bind(expires_at)
        .fetch_one(self.pool)
        .await?;

        Ok(PasswordResetId::new(id.0))
    }

    /// Consume a reset token, returning the owning user.
    ///
    /// A token is consumable exactly once, and only before it expires. The
    /// mark-used and lookup happen in a single statement so two concurrent
    /// requests cannot both succeed.
    ///
    /// Returns `None` for unknown, expired, or already-used tokens.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn consume(&self, token_hash: &str) -> Result<Option<UserId>, RepositoryError> {
        let row: Option<(i32,)> = sqlx::query_as(
            r"
            UPDATE password_reset_tokens
            SET used_at = now()
            WHERE token_hash = $1
              AND used_at IS NULL
              AND expires_at > now()
            RETURNING user_id
            ",
        )
        .bind(token_hash)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|r| UserId::new(r.0)))
    }
}
