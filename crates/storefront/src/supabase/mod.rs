//! Clients for the hosted backend's REST APIs.
//!
//! Table data goes through the `sqlx` pool (see [`crate::db`]); this module
//! covers the parts that only exist as HTTP services:
//!
//! - [`AuthClient`] - email/password accounts and tokens (`/auth/v1`)
//! - [`StorageClient`] - file uploads and public URLs (`/storage/v1`)

pub mod auth;
pub mod storage;
pub mod types;

pub use auth::AuthClient;
pub use storage::StorageClient;
pub use types::{AuthUser, SignUpOutcome, TokenResponse};

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use thiserror::Error;

use crate::config::SupabaseConfig;

/// Errors that can occur when calling the hosted backend.
#[derive(Debug, Error)]
pub enum SupabaseError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api {
        status: u16,
        /// Machine-readable code when the service sends one (e.g. `invalid_credentials`).
        code: Option<String>,
        message: String,
    },

    /// Failed to parse response or build a request.
    #[error("Parse error: {0}")]
    Parse(String),
}

impl SupabaseError {
    /// HTTP status of an API error.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Headers every backend request carries: the anon `apikey`.
fn default_headers(config: &SupabaseConfig) -> Result<HeaderMap, SupabaseError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        "apikey",
        HeaderValue::from_str(config.anon_key.expose_secret())
            .map_err(|e| SupabaseError::Parse(format!("Invalid anon key format: {e}")))?,
    );
    Ok(headers)
}

/// Turn a non-success response into `SupabaseError::Api`.
async fn api_error(response: reqwest::Response) -> SupabaseError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let parsed = types::ErrorBody::parse(&body);
    SupabaseError::Api {
        status,
        code: parsed.code,
        message: parsed.message,
    }
}
