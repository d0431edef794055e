//! Authentication service.
//!
//! Email/password accounts live in the hosted auth service; this wraps the
//! API client with input validation, error classification and conversion of
//! token responses into the session's [`CurrentUser`].

mod error;

pub use error::AuthError;

use chrono::{DateTime, Utc};

use sinocoffee_core::Email;

use crate::models::CurrentUser;
use crate::supabase::{AuthClient, SignUpOutcome, TokenResponse};

/// Minimum password length (the auth service default).
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// What a registration produced.
#[derive(Debug, Clone)]
pub enum Registration {
    /// Signed in immediately.
    SignedIn(CurrentUser),
    /// A confirmation email was sent.
    ConfirmationRequired(Email),
}

/// Authentication service.
pub struct AuthService<'a> {
    client: &'a AuthClient,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(client: &'a AuthClient) -> Self {
        Self { client }
    }

    // =========================================================================
    // Password Authentication
    // =========================================================================

    /// Register a new user with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        redirect_to: &str,
    ) -> Result<Registration, AuthError> {
        let email = Email::parse(email)?;
        validate_password(password)?;

        let outcome = self
            .client
            .sign_up(email.as_str(), password, redirect_to)
            .await
            .map_err(AuthError::from_service)?;

        match outcome {
            SignUpOutcome::SignedIn(tokens) => Ok(Registration::SignedIn(current_user(
                tokens,
                Utc::now(),
            )?)),
            SignUpOutcome::ConfirmationRequired(_) => Ok(Registration::ConfirmationRequired(email)),
        }
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    pub async fn login(&self, email: &str, password: &str) -> Result<CurrentUser, AuthError> {
        let email = Email::parse(email)?;
        if password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        let tokens = self
            .client
            .sign_in_with_password(email.as_str(), password)
            .await
            .map_err(AuthError::from_service)?;
        current_user(tokens, Utc::now())
    }

    /// Exchange the stored refresh token for a fresh session.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::SessionExpired` if the refresh token is no longer valid.
    pub async fn refresh(&self, user: &CurrentUser) -> Result<CurrentUser, AuthError> {
        let tokens = self
            .client
            .refresh(&user.refresh_token)
            .await
            .map_err(|e| match AuthError::from_service(e) {
                AuthError::InvalidCredentials => AuthError::SessionExpired,
                other => other,
            })?;
        current_user(tokens, Utc::now())
    }

    /// Revoke the user's tokens. The caller clears the local session either way.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Service` if the auth service rejects the request.
    pub async fn logout(&self, user: &CurrentUser) -> Result<(), AuthError> {
        self.client
            .sign_out(&user.access_token)
            .await
            .map_err(AuthError::from_service)
    }
}

/// Build the session identity from a token response.
///
/// # Errors
///
/// Returns `AuthError::InvalidTokenResponse` if the user has no usable email.
pub fn current_user(tokens: TokenResponse, now: DateTime<Utc>) -> Result<CurrentUser, AuthError> {
    let raw_email = tokens
        .user
        .email
        .as_deref()
        .ok_or_else(|| AuthError::InvalidTokenResponse("user has no email".to_string()))?;
    let email =
        Email::parse(raw_email).map_err(|e| AuthError::InvalidTokenResponse(e.to_string()))?;

    let expires_at = tokens
        .expires_at
        .and_then(|ts| DateTime::from_timestamp(ts, 0))
        .unwrap_or_else(|| now + chrono::Duration::seconds(tokens.expires_in));

    Ok(CurrentUser {
        id: tokens.user.id,
        email,
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        expires_at,
    })
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::supabase::AuthUser;
    use sinocoffee_core::UserId;

    fn tokens(email: Option<&str>, expires_at: Option<i64>) -> TokenResponse {
        TokenResponse {
            access_token: "access".to_string(),
            refresh_token: "refresh".to_string(),
            expires_in: 3600,
            expires_at,
            user: AuthUser {
                id: UserId::generate(),
                email: email.map(String::from),
            },
        }
    }

    #[test]
    fn test_current_user_from_tokens() {
        let now = Utc::now();
        let user = current_user(tokens(Some("David.Wu@Example.com"), None), now).unwrap();
        assert_eq!(user.email.as_str(), "david.wu@example.com");
        assert_eq!(user.expires_at, now + chrono::Duration::seconds(3600));
        assert!(!user.needs_refresh(now));
    }

    #[test]
    fn test_absolute_expiry_wins() {
        let user = current_user(tokens(Some("a@b.co"), Some(1_700_000_000)), Utc::now()).unwrap();
        assert_eq!(user.expires_at.timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_missing_email_is_rejected() {
        assert!(matches!(
            current_user(tokens(None, None), Utc::now()),
            Err(AuthError::InvalidTokenResponse(_))
        ));
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("12345").is_err());
        assert!(validate_password("123456").is_ok());
    }
}
