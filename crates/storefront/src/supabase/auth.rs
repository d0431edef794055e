//! Auth API client (email/password accounts and tokens).

use serde::Serialize;
use url::Url;

use super::types::{SignUpBody, SignUpOutcome, TokenResponse};
use super::{SupabaseError, api_error, default_headers};
use crate::config::SupabaseConfig;

#[derive(Serialize)]
struct PasswordCredentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RefreshGrant<'a> {
    refresh_token: &'a str,
}

/// Client for `/auth/v1`.
#[derive(Clone)]
pub struct AuthClient {
    client: reqwest::Client,
    base_url: Url,
}

impl AuthClient {
    /// Create a new auth client.
    ///
    /// # Errors
    ///
    /// Returns error if the anon key is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &SupabaseConfig) -> Result<Self, SupabaseError> {
        let client = reqwest::Client::builder()
            .default_headers(default_headers(config)?)
            .build()?;
        Ok(Self {
            client,
            base_url: config.url.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/auth/v1/{path}", self.base_url.as_str().trim_end_matches('/'))
    }

    /// Endpoint URL with one query parameter, percent-encoded.
    fn endpoint_with(&self, path: &str, key: &str, value: &str) -> Result<Url, SupabaseError> {
        let mut url =
            Url::parse(&self.endpoint(path)).map_err(|e| SupabaseError::Parse(e.to_string()))?;
        url.query_pairs_mut().append_pair(key, value);
        Ok(url)
    }

    /// Create an account.
    ///
    /// `redirect_to` is where the confirmation email link should land.
    ///
    /// # Errors
    ///
    /// Returns `SupabaseError::Api` if the service rejects the sign-up
    /// (e.g. the email is already registered or the password is weak).
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        redirect_to: &str,
    ) -> Result<SignUpOutcome, SupabaseError> {
        let response = self
            .client
            .post(self.endpoint_with("signup", "redirect_to", redirect_to)?)
            .json(&PasswordCredentials { email, password })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let body: SignUpBody = response
            .json()
            .await
            .map_err(|e| SupabaseError::Parse(e.to_string()))?;
        Ok(body.into())
    }

    /// Exchange email and password for tokens.
    ///
    /// # Errors
    ///
    /// Returns `SupabaseError::Api` with status 400 for wrong credentials.
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<TokenResponse, SupabaseError> {
        let response = self
            .client
            .post(self.endpoint_with("token", "grant_type", "password")?)
            .json(&PasswordCredentials { email, password })
            .send()
            .await?;
        Self::tokens(response).await
    }

    /// Exchange a refresh token for a new token pair.
    ///
    /// # Errors
    ///
    /// Returns `SupabaseError::Api` if the refresh token was revoked or already used.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, SupabaseError> {
        let response = self
            .client
            .post(self.endpoint_with("token", "grant_type", "refresh_token")?)
            .json(&RefreshGrant { refresh_token })
            .send()
            .await?;
        Self::tokens(response).await
    }

    /// Revoke the session behind `access_token`.
    ///
    /// # Errors
    ///
    /// Returns `SupabaseError::Api` if the service rejects the token.
    pub async fn sign_out(&self, access_token: &str) -> Result<(), SupabaseError> {
        let response = self
            .client
            .post(self.endpoint("logout"))
            .bearer_auth(access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }
        Ok(())
    }

    async fn tokens(response: reqwest::Response) -> Result<TokenResponse, SupabaseError> {
        if !response.status().is_success() {
            return Err(api_error(response).await);
        }
        response
            .json()
            .await
            .map_err(|e| SupabaseError::Parse(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::tests::test_config;

    #[test]
    fn test_endpoint_joins_without_double_slash() {
        let client = AuthClient::new(&test_config().supabase).unwrap();
        assert_eq!(
            client.endpoint("token"),
            "https://abc.supabase.co/auth/v1/token"
        );
        assert_eq!(
            client
                .endpoint_with("signup", "redirect_to", "http://localhost:3000/auth/login")
                .unwrap()
                .as_str(),
            "https://abc.supabase.co/auth/v1/signup?redirect_to=http%3A%2F%2Flocalhost%3A3000%2Fauth%2Flogin"
        );
    }
}
