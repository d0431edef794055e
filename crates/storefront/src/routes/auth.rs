//! Authentication route handlers.
//!
//! Email and password sign-in, sign-up and sign-out against the hosted auth
//! service. Forms re-render with an error message on failure.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::PageContext;
use super::context::set_flash;
use crate::error::{clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{clear_current_user, safe_next, set_current_user};
use crate::models::{CurrentUser, Toast, session_keys};
use crate::services::auth::MIN_PASSWORD_LENGTH;
use crate::services::{AuthError, AuthService, Registration};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub next: Option<String>,
}

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

/// Query parameters of the login page.
#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    #[serde(default)]
    pub next: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub ctx: PageContext,
    pub email: String,
    pub next: String,
    pub error: Option<String>,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub ctx: PageContext,
    pub email: String,
    pub min_password_length: usize,
    pub error: Option<String>,
    /// Set once sign-up succeeded but the address must be confirmed first.
    pub confirmation_sent_to: Option<String>,
}

impl RegisterTemplate {
    fn new(ctx: PageContext) -> Self {
        Self {
            ctx,
            email: String::new(),
            min_password_length: MIN_PASSWORD_LENGTH,
            error: None,
            confirmation_sent_to: None,
        }
    }
}

/// Store the signed-in user under a fresh session ID.
async fn start_session(session: &Session, user: &CurrentUser) -> Result<(), Response> {
    if let Err(e) = session.cycle_id().await {
        tracing::warn!(error = %e, "Failed to rotate session id");
    }
    set_current_user(session, user).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to store session");
        Redirect::to("/auth/login").into_response()
    })?;
    set_sentry_user(&user.id, Some(user.email.as_str()));
    Ok(())
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
#[instrument(skip(ctx))]
pub async fn login_page(ctx: PageContext, Query(query): Query<LoginQuery>) -> Response {
    if ctx.signed_in() {
        return Redirect::to(safe_next(query.next.as_deref())).into_response();
    }
    LoginTemplate {
        ctx,
        email: String::new(),
        next: safe_next(query.next.as_deref()).to_string(),
        error: None,
    }
    .into_response()
}

/// Handle login form submission.
#[instrument(skip(state, session, ctx, form), fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    ctx: PageContext,
    Form(form): Form<LoginForm>,
) -> Response {
    let next = safe_next(form.next.as_deref()).to_string();

    match AuthService::new(state.auth())
        .login(&form.email, &form.password)
        .await
    {
        Ok(user) => {
            if let Err(response) = start_session(&session, &user).await {
                return response;
            }
            tracing::info!(user_id = %user.id, "User signed in");
            set_flash(
                &session,
                &Toast::success("Welcome back!", "You are now signed in."),
            )
            .await;
            Redirect::to(&next).into_response()
        }
        Err(e) => {
            log_auth_failure("Login", &e);
            LoginTemplate {
                ctx,
                email: form.email,
                next,
                error: Some(e.user_message()),
            }
            .into_response()
        }
    }
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
#[instrument(skip(ctx))]
pub async fn register_page(ctx: PageContext) -> Response {
    if ctx.signed_in() {
        return Redirect::to("/").into_response();
    }
    RegisterTemplate::new(ctx).into_response()
}

/// Handle registration form submission.
///
/// When the auth service requires email confirmation the page shows a
/// "check your inbox" notice instead of signing the user in.
#[instrument(skip(state, session, ctx, form), fields(email = %form.email))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    ctx: PageContext,
    Form(form): Form<RegisterForm>,
) -> Response {
    let mut page = RegisterTemplate::new(ctx);
    page.email.clone_from(&form.email);

    if form.password != form.password_confirm {
        page.error = Some("Passwords do not match.".to_string());
        return page.into_response();
    }

    let redirect_to = format!("{}/auth/login", state.config().base_url.trim_end_matches('/'));
    match AuthService::new(state.auth())
        .register(&form.email, &form.password, &redirect_to)
        .await
    {
        Ok(Registration::SignedIn(user)) => {
            if let Err(response) = start_session(&session, &user).await {
                return response;
            }
            tracing::info!(user_id = %user.id, "User registered");
            set_flash(
                &session,
                &Toast::success("Welcome to SinoCoffee!", "Your account has been created."),
            )
            .await;
            Redirect::to("/").into_response()
        }
        Ok(Registration::ConfirmationRequired(email)) => {
            tracing::info!("Registration awaiting email confirmation");
            page.confirmation_sent_to = Some(email.to_string());
            page.into_response()
        }
        Err(e) => {
            log_auth_failure("Registration", &e);
            page.error = Some(e.user_message());
            page.into_response()
        }
    }
}

fn log_auth_failure(action: &str, error: &AuthError) {
    match error {
        AuthError::Service(_) | AuthError::InvalidTokenResponse(_) => {
            tracing::error!(error = %error, "{action} failed");
        }
        _ => tracing::info!(error = %error, "{action} rejected"),
    }
}

// =============================================================================
// Logout Route
// =============================================================================

/// Handle logout.
///
/// Revokes the tokens (best effort) and destroys the session, cart included.
#[instrument(skip(state, session))]
pub async fn logout(State(state): State<AppState>, session: Session) -> Response {
    if let Ok(Some(user)) = session
        .get::<CurrentUser>(session_keys::CURRENT_USER)
        .await
        && let Err(e) = AuthService::new(state.auth()).logout(&user).await
    {
        tracing::warn!(error = %e, "Failed to revoke auth tokens");
    }

    if let Err(e) = clear_current_user(&session).await {
        tracing::error!(error = %e, "Failed to clear session");
    }

    if let Err(e) = session.flush().await {
        tracing::error!(error = %e, "Failed to flush session");
    }
    clear_sentry_user();

    Redirect::to("/").into_response()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_login_page_keeps_next_and_email() {
        let html = LoginTemplate {
            ctx: PageContext::default(),
            email: "maria@example.com".to_string(),
            next: "/favorites".to_string(),
            error: Some("Invalid email or password".to_string()),
        }
        .render()
        .unwrap();
        assert!(html.contains("value=\"/favorites\""));
        assert!(html.contains("value=\"maria@example.com\""));
        assert!(html.contains("Invalid email or password"));
    }

    #[test]
    fn test_register_confirmation_notice() {
        let mut page = RegisterTemplate::new(PageContext::default());
        page.confirmation_sent_to = Some("david@example.com".to_string());
        let html = page.render().unwrap();
        assert!(html.contains("Check your email"));
        assert!(html.contains("david@example.com"));
        assert!(!html.contains("name=\"password_confirm\""));
    }
}
