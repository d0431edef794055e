//! Session-related types.
//!
//! Types stored in the session for authentication and cart state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sinocoffee_core::{Email, UserId};

/// Refresh this long before the access token actually expires.
const EXPIRY_LEEWAY_SECONDS: i64 = 60;

/// Session-stored user identity.
///
/// Holds the auth service tokens so requests to storage can act on behalf
/// of the user. `Debug` redacts both tokens.
#[derive(Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Auth user ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
    /// Bearer token for the auth and storage APIs.
    pub access_token: String,
    /// Token used to obtain a fresh access token.
    pub refresh_token: String,
    /// When `access_token` stops being accepted.
    pub expires_at: DateTime<Utc>,
}

impl CurrentUser {
    /// Whether the access token is expired (or about to be) at `now`.
    #[must_use]
    pub fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        now + chrono::Duration::seconds(EXPIRY_LEEWAY_SECONDS) >= self.expires_at
    }
}

impl std::fmt::Debug for CurrentUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurrentUser")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Session keys.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the visitor's cart.
    pub const CART: &str = "cart";

    /// Key for the cart snapshot of the open checkout.
    pub const PENDING_CHECKOUT: &str = "pending_checkout";
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn user(expires_in: i64) -> CurrentUser {
        CurrentUser {
            id: UserId::generate(),
            email: Email::parse("sarah@example.com").unwrap(),
            access_token: "eyJhbGciOi.access".to_string(),
            refresh_token: "refresh-token-value".to_string(),
            expires_at: Utc::now() + chrono::Duration::seconds(expires_in),
        }
    }

    #[test]
    fn test_needs_refresh() {
        let now = Utc::now();
        assert!(!user(3600).needs_refresh(now));
        assert!(user(30).needs_refresh(now));
        assert!(user(-10).needs_refresh(now));
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let debug = format!("{:?}", user(3600));
        assert!(debug.contains("sarah@example.com"));
        assert!(!debug.contains("eyJhbGciOi"));
        assert!(!debug.contains("refresh-token-value"));
    }
}
