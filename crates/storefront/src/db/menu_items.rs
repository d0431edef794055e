//! Menu item repository.

use sqlx::PgPool;

use sinocoffee_core::MenuItemId;

use super::RepositoryError;
use crate::models::{MenuItem, MenuItemDraft};

const COLUMNS: &str =
    "id, name, description, price, image_url, rating, popular, category, created_at, updated_at";

/// Repository for the `menu_items` table.
pub struct MenuItemRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> MenuItemRepository<'a> {
    /// Create a new menu item repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All items, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<MenuItem>, RepositoryError> {
        let items = sqlx::query_as::<_, MenuItem>(&format!(
            "SELECT {COLUMNS} FROM menu_items ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;
        Ok(items)
    }

    /// Get an item by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: MenuItemId) -> Result<Option<MenuItem>, RepositoryError> {
        let item = sqlx::query_as::<_, MenuItem>(&format!(
            "SELECT {COLUMNS} FROM menu_items WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(item)
    }

    /// Insert a new item.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, draft: &MenuItemDraft) -> Result<MenuItem, RepositoryError> {
        let item = sqlx::query_as::<_, MenuItem>(&format!(
            r"
            INSERT INTO menu_items (name, description, price, image_url, rating, popular, category)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {COLUMNS}
            "
        ))
        .bind(&draft.name)
        .bind(&draft.description)
        .bind(draft.price)
        .bind(draft.image_url.as_deref())
        .bind(draft.rating)
        .bind(draft.popular)
        .bind(&draft.category)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_insert(e, "menu item"))?;
        Ok(item)
    }

    /// Replace every editable field of an item.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no item has this ID.
    pub async fn update(
        &self,
        id: MenuItemId,
        draft: &MenuItemDraft,
    ) -> Result<MenuItem, RepositoryError> {
        sqlx::query_as::<_, MenuItem>(&format!(
            r"
            UPDATE menu_items
            SET name = $2, description = $3, price = $4, image_url = $5,
                rating = $6, popular = $7, category = $8, updated_at = now()
            WHERE id = $1
            RETURNING {COLUMNS}
            "
        ))
        .bind(id)
        .bind(&draft.name)
        .bind(&draft.description)
        .bind(draft.price)
        .bind(draft.image_url.as_deref())
        .bind(draft.rating)
        .bind(draft.popular)
        .bind(&draft.category)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete an item.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no item has this ID.
    pub async fn delete(&self, id: MenuItemId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM menu_items WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Insert an item unless one with the same name exists. Used by seeding.
    ///
    /// Returns whether a row was inserted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn insert_if_missing(&self, draft: &MenuItemDraft) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            INSERT INTO menu_items (name, description, price, image_url, rating, popular, category)
            SELECT $1, $2, $3, $4, $5, $6, $7
            WHERE NOT EXISTS (SELECT 1 FROM menu_items WHERE lower(name) = lower($1))
            ",
        )
        .bind(&draft.name)
        .bind(&draft.description)
        .bind(draft.price)
        .bind(draft.image_url.as_deref())
        .bind(draft.rating)
        .bind(draft.popular)
        .bind(&draft.category)
        .execute(self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
