//! Wire types of the backend auth API.

use serde::Deserialize;

use sinocoffee_core::UserId;

/// User object returned by the auth API.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthUser {
    pub id: UserId,
    #[serde(default)]
    pub email: Option<String>,
}

/// Response of the token endpoint (password and refresh grants).
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Lifetime in seconds.
    pub expires_in: i64,
    /// Absolute expiry as a unix timestamp, when provided.
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: AuthUser,
}

/// What sign-up produced.
#[derive(Debug, Clone)]
pub enum SignUpOutcome {
    /// Account created and signed in immediately.
    SignedIn(TokenResponse),
    /// Account created; the user must confirm their email first.
    ConfirmationRequired(AuthUser),
}

/// Sign-up returns a session when auto-confirm is on, otherwise the bare user.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum SignUpBody {
    Session(TokenResponse),
    User(AuthUser),
}

impl From<SignUpBody> for SignUpOutcome {
    fn from(body: SignUpBody) -> Self {
        match body {
            SignUpBody::Session(tokens) => Self::SignedIn(tokens),
            SignUpBody::User(user) => Self::ConfirmationRequired(user),
        }
    }
}

/// Error bodies come in a few shapes depending on the service and version.
#[derive(Debug, Default)]
pub(crate) struct ErrorBody {
    pub code: Option<String>,
    pub message: String,
}

#[derive(Debug, Deserialize)]
struct RawErrorBody {
    #[serde(default)]
    error_code: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl ErrorBody {
    /// Best-effort parse; falls back to the raw body text.
    pub(crate) fn parse(body: &str) -> Self {
        let Ok(raw) = serde_json::from_str::<RawErrorBody>(body) else {
            return Self {
                code: None,
                message: body.trim().to_string(),
            };
        };
        let message = raw
            .msg
            .or(raw.message)
            .or(raw.error_description)
            .or_else(|| raw.error.clone())
            .unwrap_or_else(|| body.trim().to_string());
        Self {
            code: raw.error_code.or(raw.error),
            message,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const USER_ID: &str = "6f1c1f2e-8a4b-4d59-9a5c-0f6d2b1e3c4a";

    #[test]
    fn test_signup_with_session() {
        let body = format!(
            r#"{{"access_token":"at","token_type":"bearer","expires_in":3600,"expires_at":1900000000,
                "refresh_token":"rt","user":{{"id":"{USER_ID}","email":"a@b.co"}}}}"#
        );
        let parsed: SignUpBody = serde_json::from_str(&body).unwrap();
        assert!(matches!(SignUpOutcome::from(parsed), SignUpOutcome::SignedIn(_)));
    }

    #[test]
    fn test_signup_requires_confirmation() {
        let body = format!(r#"{{"id":"{USER_ID}","email":"a@b.co","confirmation_sent_at":"2026-01-01T00:00:00Z"}}"#);
        let parsed: SignUpBody = serde_json::from_str(&body).unwrap();
        match SignUpOutcome::from(parsed) {
            SignUpOutcome::ConfirmationRequired(user) => {
                assert_eq!(user.id.to_string(), USER_ID);
            }
            SignUpOutcome::SignedIn(_) => panic!("expected confirmation"),
        }
    }

    #[test]
    fn test_error_body_shapes() {
        let a = ErrorBody::parse(r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#);
        assert_eq!(a.code.as_deref(), Some("invalid_grant"));
        assert_eq!(a.message, "Invalid login credentials");

        let b = ErrorBody::parse(r#"{"code":422,"error_code":"user_already_exists","msg":"User already registered"}"#);
        assert_eq!(b.code.as_deref(), Some("user_already_exists"));
        assert_eq!(b.message, "User already registered");

        let c = ErrorBody::parse(r#"{"statusCode":"403","error":"Unauthorized","message":"new row violates row-level security policy"}"#);
        assert_eq!(c.message, "new row violates row-level security policy");

        let d = ErrorBody::parse("Bad Gateway");
        assert_eq!(d.code, None);
        assert_eq!(d.message, "Bad Gateway");
    }
}
