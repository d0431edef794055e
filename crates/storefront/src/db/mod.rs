//! Database operations against the hosted `PostgreSQL`.
//!
//! ## Tables
//!
//! - `menu_items` - Purchasable products, managed from the admin panel
//! - `favorites` - Per-user saved items (snapshot of name/price/image)
//! - `history` - Per-user past orders, recorded after payment
//! - `profiles` - Display name and avatar URL per auth user
//! - `coffee_shops` - Locations shown on the map
//! - `user_roles` - Application roles (admin)
//! - `tower_sessions.session` - Tower-sessions storage
//!
//! Users themselves live in the hosted auth service; tables only carry their
//! UUID.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p sinocoffee-cli -- migrate
//! ```

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub mod coffee_shops;
pub mod favorites;
pub mod history;
pub mod menu_items;
pub mod profiles;
pub mod user_roles;

pub use coffee_shops::CoffeeShopRepository;
pub use favorites::FavoriteRepository;
pub use history::HistoryRepository;
pub use menu_items::MenuItemRepository;
pub use profiles::ProfileRepository;
pub use user_roles::UserRoleRepository;

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

    /// Constraint violation (e.g., duplicate favorite).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Map unique violations to `Conflict`, everything else to `Database`.
    pub(crate) fn from_insert(err: sqlx::Error, what: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err
            && db_err.is_unique_violation()
        {
            return Self::Conflict(format!("{what} already exists"));
        }
        Self::Database(err)
    }
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
