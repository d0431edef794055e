//! Favorites repository.

use std::collections::HashSet;

use sqlx::PgPool;

use sinocoffee_core::{MenuItemId, UserId};

use super::RepositoryError;
use crate::models::{Favorite, MenuItem};

/// Repository for the `favorites` table. Every query is scoped to one user.
pub struct FavoriteRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> FavoriteRepository<'a> {
    /// Create a new favorites repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// The user's favorites, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, user_id: UserId) -> Result<Vec<Favorite>, RepositoryError> {
        let rows = sqlx::query_as::<_, Favorite>(
            r"
            SELECT id, user_id, item_id, name, price, image, category, created_at
            FROM favorites
            WHERE user_id = $1
            ORDER BY created_at DESC
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// IDs of the items the user has saved.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn item_ids(&self, user_id: UserId) -> Result<HashSet<MenuItemId>, RepositoryError> {
        let ids: Vec<MenuItemId> =
            sqlx::query_scalar("SELECT item_id FROM favorites WHERE user_id = $1")
                .bind(user_id)
                .fetch_all(self.pool)
                .await?;
        Ok(ids.into_iter().collect())
    }

    /// Get one favorite by menu item.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(
        &self,
        user_id: UserId,
        item_id: MenuItemId,
    ) -> Result<Option<Favorite>, RepositoryError> {
        let row = sqlx::query_as::<_, Favorite>(
            r"
            SELECT id, user_id, item_id, name, price, image, category, created_at
            FROM favorites
            WHERE user_id = $1 AND item_id = $2
            ",
        )
        .bind(user_id)
        .bind(item_id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }

    /// Save `item`, snapshotting its name, price, image and category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the item is already saved.
    pub async fn add(&self, user_id: UserId, item: &MenuItem) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO favorites (user_id, item_id, name, price, image, category)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(user_id)
        .bind(item.id)
        .bind(&item.name)
        .bind(item.price)
        .bind(item.display_image())
        .bind(&item.category)
        .execute(self.pool)
        .await
        .map_err(|e| RepositoryError::from_insert(e, "favorite"))?;
        Ok(())
    }

    /// Remove a saved item. Returns whether a row was deleted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn remove(&self, user_id: UserId, item_id: MenuItemId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND item_id = $2")
            .bind(user_id)
            .bind(item_id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Remove the favorite when present, add it otherwise.
    ///
    /// Returns `true` when the item is a favorite afterwards.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn toggle(&self, user_id: UserId, item: &MenuItem) -> Result<bool, RepositoryError> {
        if self.remove(user_id, item.id).await? {
            return Ok(false);
        }
        match self.add(user_id, item).await {
            Ok(()) => Ok(true),
            // A concurrent request saved it first; it is a favorite either way.
            Err(RepositoryError::Conflict(_)) => Ok(true),
            Err(e) => Err(e),
        }
    }
}
