//! Subcommand implementations.

pub mod admin;
pub mod migrate;
pub mod seed;

use secrecy::SecretString;
use sqlx::PgPool;

/// Errors shared by every command that talks to the database.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Connect(#[from] sqlx::Error),
}

/// Connect to the storefront database named by the environment.
///
/// # Errors
///
/// Returns an error if neither `STOREFRONT_DATABASE_URL` nor `DATABASE_URL`
/// is set, or the connection fails.
pub async fn connect() -> Result<PgPool, DatabaseError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("STOREFRONT_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| DatabaseError::MissingEnvVar("STOREFRONT_DATABASE_URL"))?;

    tracing::info!("Connecting to storefront database...");
    Ok(sinocoffee_storefront::db::create_pool(&database_url).await?)
}
