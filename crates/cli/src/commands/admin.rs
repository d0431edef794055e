//! Admin role management.
//!
//! Users sign up through the storefront; these commands only flip the
//! `admin` role on an existing auth user ID.
//!
//! # Usage
//!
//! ```bash
//! sc-cli admin grant 7f1c7a52-2f0e-4c1e-9d3b-1f6e2b8c9a10
//! sc-cli admin revoke 7f1c7a52-2f0e-4c1e-9d3b-1f6e2b8c9a10
//! sc-cli admin list
//! ```

use sinocoffee_core::{AppRole, UserId};
use sinocoffee_storefront::db::{RepositoryError, UserRoleRepository};
use thiserror::Error;

use super::{DatabaseError, connect};

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// The argument is not a UUID.
    #[error("Invalid user ID: {0}")]
    InvalidUserId(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("Database error: {0}")]
    Repository(#[from] RepositoryError),
}

fn parse_user_id(raw: &str) -> Result<UserId, AdminError> {
    raw.trim()
        .parse()
        .map_err(|_| AdminError::InvalidUserId(raw.to_owned()))
}

/// Grant the admin role.
///
/// # Errors
///
/// Returns an error for a malformed ID or a database failure.
pub async fn grant(user_id: &str) -> Result<(), AdminError> {
    let user_id = parse_user_id(user_id)?;
    let pool = connect().await?;

    if UserRoleRepository::new(&pool)
        .grant(user_id, AppRole::Admin)
        .await?
    {
        tracing::info!(%user_id, "Admin role granted");
    } else {
        tracing::info!(%user_id, "User is already an admin");
    }
    Ok(())
}

/// Revoke the admin role.
///
/// # Errors
///
/// Returns an error for a malformed ID or a database failure.
pub async fn revoke(user_id: &str) -> Result<(), AdminError> {
    let user_id = parse_user_id(user_id)?;
    let pool = connect().await?;

    if UserRoleRepository::new(&pool)
        .revoke(user_id, AppRole::Admin)
        .await?
    {
        tracing::info!(%user_id, "Admin role revoked");
    } else {
        tracing::warn!(%user_id, "User was not an admin");
    }
    Ok(())
}

/// Log every admin user ID.
///
/// # Errors
///
/// Returns an error if the database is unreachable.
pub async fn list() -> Result<(), AdminError> {
    let pool = connect().await?;
    let admins = UserRoleRepository::new(&pool)
        .users_with(AppRole::Admin)
        .await?;

    tracing::info!("Admins: {}", admins.len());
    for user_id in admins {
        tracing::info!("  {user_id}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_user_id() {
        assert!(parse_user_id(" 7f1c7a52-2f0e-4c1e-9d3b-1f6e2b8c9a10 ").is_ok());
        assert!(matches!(
            parse_user_id("alice"),
            Err(AdminError::InvalidUserId(_))
        ));
    }
}
