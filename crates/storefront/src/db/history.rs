//! Order history repository.

use sqlx::PgPool;

use sinocoffee_core::UserId;

use super::RepositoryError;
use crate::models::order::{HistoryRow, NewOrder};
use crate::models::OrderRecord;

/// Repository for the `history` table.
pub struct HistoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> HistoryRepository<'a> {
    /// Create a new history repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// The user's past orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, user_id: UserId) -> Result<Vec<OrderRecord>, RepositoryError> {
        let rows = sqlx::query_as::<_, HistoryRow>(
            r"
            SELECT id, user_id, order_id, items, total, status, created_at
            FROM history
            WHERE user_id = $1
            ORDER BY created_at DESC
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(OrderRecord::from).collect())
    }

    /// Get one order by its external order ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(
        &self,
        user_id: UserId,
        order_id: &str,
    ) -> Result<Option<OrderRecord>, RepositoryError> {
        let row = sqlx::query_as::<_, HistoryRow>(
            r"
            SELECT id, user_id, order_id, items, total, status, created_at
            FROM history
            WHERE user_id = $1 AND order_id = $2
            ",
        )
        .bind(user_id)
        .bind(order_id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row.map(OrderRecord::from))
    }

    /// Record a paid order. A second call with the same order ID is ignored.
    ///
    /// Returns whether a row was inserted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn record(&self, user_id: UserId, order: &NewOrder) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            INSERT INTO history (user_id, order_id, items, total, status)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id, order_id) DO NOTHING
            ",
        )
        .bind(user_id)
        .bind(&order.order_id)
        .bind(order.items_json())
        .bind(order.total)
        .bind(order.status)
        .execute(self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
