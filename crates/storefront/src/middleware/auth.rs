//! Authentication extractors.
//!
//! The signed-in user is stored in the session as [`CurrentUser`]. Extractors
//! refresh an expiring access token on the way in; a refresh that fails signs
//! the user out.

use axum::{
    extract::FromRequestParts,
    http::{HeaderValue, StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use tower_sessions::Session;

use crate::db::UserRoleRepository;
use crate::models::{CurrentUser, session_keys};
use crate::services::AuthService;
use crate::state::AppState;

/// Where guests are sent.
pub const LOGIN_PATH: &str = "/auth/login";

/// Extractor that requires a signed-in user.
///
/// Page requests are redirected to the login page; HTMX requests get an
/// `HX-Redirect` so the whole page navigates.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.email)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Error returned when authentication is required but the user is not logged in.
#[derive(Debug)]
pub enum AuthRejection {
    /// Redirect to login page (for HTML requests), returning to `next` after.
    RedirectToLogin { next: String },
    /// Client-side redirect for HTMX requests.
    HxRedirectToLogin,
    /// Unauthorized response (for API requests).
    Unauthorized,
    /// Signed in but not an admin; sent home.
    NotAdmin,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin { next } => Redirect::to(&login_url(&next)).into_response(),
            Self::HxRedirectToLogin => hx_redirect(LOGIN_PATH),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
            Self::NotAdmin => Redirect::to("/").into_response(),
        }
    }
}

/// Empty response that makes HTMX navigate the whole page to `location`.
#[must_use]
pub fn hx_redirect(location: &str) -> Response {
    let mut response = StatusCode::OK.into_response();
    if let Ok(value) = HeaderValue::from_str(location) {
        response.headers_mut().insert("HX-Redirect", value);
    }
    response
}

/// Login page URL that sends the user back to `next` once signed in.
#[must_use]
pub fn login_url(next: &str) -> String {
    if next.is_empty() || next == "/" {
        return LOGIN_PATH.to_string();
    }
    format!("{LOGIN_PATH}?next={}", urlencoding::encode(next))
}

/// Only same-site absolute paths are accepted as a post-login destination.
#[must_use]
pub fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => {
            path
        }
        _ => "/",
    }
}

/// Whether the request was issued by HTMX.
#[must_use]
pub fn is_htmx(parts: &Parts) -> bool {
    parts.headers.contains_key("hx-request")
}

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or(AuthRejection::Unauthorized)?;

        match load_current_user(&session, state).await {
            Some(user) => Ok(Self(user)),
            None if parts.uri.path().starts_with("/api/") => Err(AuthRejection::Unauthorized),
            None if is_htmx(parts) => Err(AuthRejection::HxRedirectToLogin),
            None => Err(AuthRejection::RedirectToLogin {
                next: parts.uri.path().to_string(),
            }),
        }
    }
}

/// Extractor that optionally gets the current user.
///
/// Unlike `RequireAuth`, this does not reject the request if the user is not logged in.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl FromRequestParts<AppState> for OptionalAuth {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = match parts.extensions.get::<Session>().cloned() {
            Some(session) => load_current_user(&session, state).await,
            None => None,
        };
        Ok(Self(user))
    }
}

/// Extractor that requires a signed-in user holding the `admin` role.
///
/// Guests go to the login page; signed-in non-admins are sent home.
pub struct RequireAdmin(pub CurrentUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireAuth(user) = RequireAuth::from_request_parts(parts, state).await?;

        match UserRoleRepository::new(state.pool()).is_admin(user.id).await {
            Ok(true) => Ok(Self(user)),
            Ok(false) => {
                tracing::warn!(user_id = %user.id, "Non-admin tried to open the admin panel");
                Err(AuthRejection::NotAdmin)
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to check admin role");
                Err(AuthRejection::NotAdmin)
            }
        }
    }
}

/// Read the session user, refreshing the access token when it is about to
/// expire.
async fn load_current_user(session: &Session, state: &AppState) -> Option<CurrentUser> {
    let user: CurrentUser = session
        .get(session_keys::CURRENT_USER)
        .await
        .ok()
        .flatten()?;

    if !user.needs_refresh(Utc::now()) {
        return Some(user);
    }

    match AuthService::new(state.auth()).refresh(&user).await {
        Ok(fresh) => {
            if let Err(e) = set_current_user(session, &fresh).await {
                tracing::error!(error = %e, "Failed to store refreshed session");
            }
            tracing::debug!(user_id = %fresh.id, "Access token refreshed");
            Some(fresh)
        }
        Err(e) => {
            tracing::info!(user_id = %user.id, error = %e, "Token refresh failed, signing out");
            if let Err(e) = clear_current_user(session).await {
                tracing::error!(error = %e, "Failed to clear session");
            }
            None
        }
    }
}

/// Helper to set the current user in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Helper to clear the current user from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentUser>(session_keys::CURRENT_USER)
        .await?;
    Ok(())
}
