//! Application role repository.

use sqlx::PgPool;

use sinocoffee_core::{AppRole, UserId};

use super::RepositoryError;

/// Repository for the `user_roles` table.
pub struct UserRoleRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRoleRepository<'a> {
    /// Create a new role repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Whether the user holds `role`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn has_role(&self, user_id: UserId, role: AppRole) -> Result<bool, RepositoryError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM user_roles WHERE user_id = $1 AND role = $2)",
        )
        .bind(user_id)
        .bind(role)
        .fetch_one(self.pool)
        .await?;
        Ok(exists)
    }

    /// Shorthand for `has_role(user_id, AppRole::Admin)`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn is_admin(&self, user_id: UserId) -> Result<bool, RepositoryError> {
        self.has_role(user_id, AppRole::Admin).await
    }

    /// Grant `role`. Granting twice is a no-op; returns whether a row was added.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn grant(&self, user_id: UserId, role: AppRole) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO user_roles (user_id, role) VALUES ($1, $2) ON CONFLICT (user_id, role) DO NOTHING",
        )
        .bind(user_id)
        .bind(role)
        .execute(self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Revoke `role`; returns whether a row was removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn revoke(&self, user_id: UserId, role: AppRole) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM user_roles WHERE user_id = $1 AND role = $2")
            .bind(user_id)
            .bind(role)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// User IDs holding `role`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn users_with(&self, role: AppRole) -> Result<Vec<UserId>, RepositoryError> {
        let ids = sqlx::query_scalar("SELECT user_id FROM user_roles WHERE role = $1 ORDER BY user_id")
            .bind(role)
            .fetch_all(self.pool)
            .await?;
        Ok(ids)
    }
}
