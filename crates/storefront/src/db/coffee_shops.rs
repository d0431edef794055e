//! Coffee-shop locations repository.

use rust_decimal::Decimal;
use sqlx::PgPool;

use super::RepositoryError;
use crate::models::CoffeeShop;

/// A location to insert from seed data.
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct NewCoffeeShop {
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub hours: Option<String>,
    #[serde(default)]
    pub rating: Decimal,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub specialty: Option<String>,
}

/// Repository for the `coffee_shops` table.
pub struct CoffeeShopRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CoffeeShopRepository<'a> {
    /// Create a new coffee shop repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All shops, best rated first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<CoffeeShop>, RepositoryError> {
        let shops = sqlx::query_as::<_, CoffeeShop>(
            r"
            SELECT id, name, address, latitude, longitude, phone, hours, rating,
                   image_url, description, specialty
            FROM coffee_shops
            ORDER BY rating DESC, name
            ",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(shops)
    }

    /// Insert a shop unless one with the same name and address exists.
    ///
    /// Returns whether a row was inserted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn insert_if_missing(&self, shop: &NewCoffeeShop) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            INSERT INTO coffee_shops
                (name, address, latitude, longitude, phone, hours, rating, image_url, description, specialty)
            SELECT $1, $2, $3, $4, $5, $6, $7, $8, $9, $10
            WHERE NOT EXISTS (
                SELECT 1 FROM coffee_shops WHERE name = $1 AND address = $2
            )
            ",
        )
        .bind(&shop.name)
        .bind(&shop.address)
        .bind(shop.latitude)
        .bind(shop.longitude)
        .bind(shop.phone.as_deref())
        .bind(shop.hours.as_deref())
        .bind(shop.rating)
        .bind(shop.image_url.as_deref())
        .bind(shop.description.as_deref())
        .bind(shop.specialty.as_deref())
        .execute(self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
