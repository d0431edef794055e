//! Authentication error types.

use thiserror::Error;

use crate::supabase::SupabaseError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] sinocoffee_core::EmailError),

    /// Invalid credentials (wrong password or user not found).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// User already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// The account exists but its email was never confirmed.
    #[error("email not confirmed")]
    EmailNotConfirmed,

    /// Refresh token was rejected; the user must sign in again.
    #[error("session expired")]
    SessionExpired,

    /// Token response did not include what we need.
    #[error("invalid token response: {0}")]
    InvalidTokenResponse(String),

    /// Any other auth service failure.
    #[error("auth service error: {0}")]
    Service(#[from] SupabaseError),
}

impl AuthError {
    /// Classify an auth API failure by its error code, falling back to the
    /// message text for older service versions.
    #[must_use]
    pub fn from_service(err: SupabaseError) -> Self {
        let SupabaseError::Api {
            status,
            ref code,
            ref message,
        } = err
        else {
            return Self::Service(err);
        };

        let message_lower = message.to_lowercase();
        match code.as_deref() {
            Some("invalid_credentials" | "invalid_grant") => Self::InvalidCredentials,
            Some("user_already_exists" | "email_exists") => Self::UserAlreadyExists,
            Some("weak_password") => Self::WeakPassword(message.clone()),
            Some("email_not_confirmed") => Self::EmailNotConfirmed,
            Some("refresh_token_not_found" | "refresh_token_already_used" | "session_not_found") => {
                Self::SessionExpired
            }
            _ if message_lower.contains("invalid login credentials") => Self::InvalidCredentials,
            _ if message_lower.contains("already registered") => Self::UserAlreadyExists,
            _ if message_lower.contains("email not confirmed") => Self::EmailNotConfirmed,
            _ if status == 422 && message_lower.contains("password") => {
                Self::WeakPassword(message.clone())
            }
            _ => Self::Service(err),
        }
    }

    /// Message safe to show on the sign-in and sign-up forms.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidEmail(_) => "Please enter a valid email address.".to_string(),
            Self::InvalidCredentials => "Invalid email or password.".to_string(),
            Self::UserAlreadyExists => {
                "An account with this email already exists. Please sign in.".to_string()
            }
            Self::WeakPassword(reason) => format!("Password is too weak: {reason}"),
            Self::EmailNotConfirmed => {
                "Please confirm your email address before signing in.".to_string()
            }
            Self::SessionExpired => "Your session has expired. Please sign in again.".to_string(),
            Self::InvalidTokenResponse(_) | Self::Service(_) => {
                "Something went wrong. Please try again.".to_string()
            }
        }
    }
}
