//! Data every full page needs for the layout: nonce, navbar user, cart badge
//! and a toast carried over from the previous request.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use sinocoffee_core::Cart;

use crate::db::UserRoleRepository;
use crate::middleware::{CspNonce, OptionalAuth};
use crate::models::{CurrentUser, FLASH_KEY, Toast, session_keys};
use crate::state::AppState;

/// Layout data for full-page templates.
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    pub nonce: String,
    pub current_path: String,
    pub user: Option<CurrentUser>,
    pub is_admin: bool,
    pub cart_count: u32,
    pub flash: Option<Toast>,
}

impl PageContext {
    #[must_use]
    pub const fn signed_in(&self) -> bool {
        self.user.is_some()
    }

    /// Email shown in the navbar menu.
    #[must_use]
    pub fn user_email(&self) -> &str {
        self.user.as_ref().map_or("", |u| u.email.as_str())
    }

    /// Avatar fallback letters for the navbar.
    #[must_use]
    pub fn user_initials(&self) -> String {
        self.user
            .as_ref()
            .map(|u| u.email.initials())
            .unwrap_or_default()
    }

    /// Whether `path` is the active nav entry.
    #[must_use]
    pub fn is_active(&self, path: &str) -> bool {
        if path == "/" {
            self.current_path == "/"
        } else {
            self.current_path.starts_with(path)
        }
    }
}

impl FromRequestParts<AppState> for PageContext {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CspNonce(nonce) = CspNonce::from_request_parts(parts, state).await?;
        let OptionalAuth(user) = OptionalAuth::from_request_parts(parts, state).await?;
        let session = parts.extensions.get::<Session>().cloned();

        let is_admin = match &user {
            Some(user) => UserRoleRepository::new(state.pool())
                .is_admin(user.id)
                .await
                .unwrap_or_else(|e| {
                    tracing::warn!(error = %e, "Failed to check admin role");
                    false
                }),
            None => false,
        };

        let (cart_count, flash) = match &session {
            Some(session) => (
                load_cart(session).await.total_items(),
                take_flash(session).await,
            ),
            None => (0, None),
        };

        Ok(Self {
            nonce,
            current_path: parts.uri.path().to_string(),
            user,
            is_admin,
            cart_count,
            flash,
        })
    }
}

// =============================================================================
// Session Helpers
// =============================================================================

/// Visitor's cart, empty when missing or unreadable.
pub async fn load_cart(session: &Session) -> Cart {
    match session.get::<Cart>(session_keys::CART).await {
        Ok(cart) => cart.unwrap_or_default(),
        Err(e) => {
            tracing::warn!(error = %e, "Discarding unreadable cart");
            Cart::default()
        }
    }
}

/// Write the cart back to the session.
///
/// # Errors
///
/// Returns an error if the session store rejects the write.
pub async fn save_cart(session: &Session, cart: &Cart) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CART, cart).await
}

/// Show `toast` on the next full page load.
pub async fn set_flash(session: &Session, toast: &Toast) {
    if let Err(e) = session.insert(FLASH_KEY, toast).await {
        tracing::warn!(error = %e, "Failed to store flash toast");
    }
}

async fn take_flash(session: &Session) -> Option<Toast> {
    session.remove::<Toast>(FLASH_KEY).await.ok().flatten()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_nav() {
        let ctx = PageContext {
            current_path: "/blog/pour-over".to_string(),
            ..PageContext::default()
        };
        assert!(ctx.is_active("/blog"));
        assert!(!ctx.is_active("/"));
        assert!(!ctx.signed_in());
        assert_eq!(ctx.user_email(), "");
    }
}
