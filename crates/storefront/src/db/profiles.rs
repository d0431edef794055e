//! Profile repository.

use sqlx::PgPool;

use sinocoffee_core::UserId;

use super::RepositoryError;
use crate::models::Profile;

/// Repository for the `profiles` table, keyed by auth user.
pub struct ProfileRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProfileRepository<'a> {
    /// Create a new profile repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// The user's profile, if one was ever saved.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, user_id: UserId) -> Result<Option<Profile>, RepositoryError> {
        let profile = sqlx::query_as::<_, Profile>(
            r"
            SELECT id, user_id, display_name, avatar_url, created_at, updated_at
            FROM profiles
            WHERE user_id = $1
            ",
        )
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;
        Ok(profile)
    }

    /// Set the display name, creating the row if needed. The avatar is kept.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the upsert fails.
    pub async fn upsert_display_name(
        &self,
        user_id: UserId,
        display_name: Option<&str>,
    ) -> Result<Profile, RepositoryError> {
        let profile = sqlx::query_as::<_, Profile>(
            r"
            INSERT INTO profiles (user_id, display_name)
            VALUES ($1, $2)
            ON CONFLICT (user_id)
            DO UPDATE SET display_name = EXCLUDED.display_name, updated_at = now()
            RETURNING id, user_id, display_name, avatar_url, created_at, updated_at
            ",
        )
        .bind(user_id)
        .bind(display_name)
        .fetch_one(self.pool)
        .await?;
        Ok(profile)
    }

    /// Set the avatar URL, creating the row if needed. The display name is kept.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the upsert fails.
    pub async fn upsert_avatar(
        &self,
        user_id: UserId,
        avatar_url: &str,
    ) -> Result<Profile, RepositoryError> {
        let profile = sqlx::query_as::<_, Profile>(
            r"
            INSERT INTO profiles (user_id, avatar_url)
            VALUES ($1, $2)
            ON CONFLICT (user_id)
            DO UPDATE SET avatar_url = EXCLUDED.avatar_url, updated_at = now()
            RETURNING id, user_id, display_name, avatar_url, created_at, updated_at
            ",
        )
        .bind(user_id)
        .bind(avatar_url)
        .fetch_one(self.pool)
        .await?;
        Ok(profile)
    }
}
