//! Storage API client (avatar uploads).

use url::Url;

use super::{SupabaseError, api_error, default_headers};
use crate::config::SupabaseConfig;

/// Client for `/storage/v1`.
#[derive(Clone)]
pub struct StorageClient {
    client: reqwest::Client,
    base_url: Url,
}

impl StorageClient {
    /// Create a new storage client.
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

    fn root(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    /// Scheme, host and port serving public objects, e.g. `https://abc.supabase.co`.
    #[must_use]
    pub fn origin(&self) -> String {
        self.base_url.origin().ascii_serialization()
    }

    /// Upload `bytes` to `bucket/path` as the signed-in user, replacing any
    /// existing object.
    ///
    /// # Errors
    ///
    /// Returns `SupabaseError::Api` if the upload is rejected (bucket policy,
    /// size limit, expired token).
    pub async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
        access_token: &str,
    ) -> Result<(), SupabaseError> {
        let url = format!("{}/storage/v1/object/{bucket}/{path}", self.root());
        let response = self
            .client
            .post(url)
            .bearer_auth(access_token)
            .header("x-upsert", "true")
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }
        Ok(())
    }

    /// Public URL of an object in a public bucket.
    #[must_use]
    pub fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/storage/v1/object/public/{bucket}/{path}", self.root())
    }
}

/// Object path of a user's avatar: `{user_id}/avatar.{ext}`.
#[must_use]
pub fn avatar_path(user_id: &impl std::fmt::Display, ext: &str) -> String {
    format!("{user_id}/avatar.{ext}")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::tests::test_config;

    #[test]
    fn test_public_url() {
        let client = StorageClient::new(&test_config().supabase).unwrap();
        assert_eq!(
            client.public_url("avatars", "u1/avatar.png"),
            "https://abc.supabase.co/storage/v1/object/public/avatars/u1/avatar.png"
        );
    }

    #[test]
    fn test_origin() {
        let client = StorageClient::new(&test_config().supabase).unwrap();
        assert_eq!(client.origin(), "https://abc.supabase.co");
    }

    #[test]
    fn test_avatar_path() {
        assert_eq!(
            avatar_path(&"6f1c1f2e-8a4b-4d59-9a5c-0f6d2b1e3c4a", "jpg"),
            "6f1c1f2e-8a4b-4d59-9a5c-0f6d2b1e3c4a/avatar.jpg"
        );
    }
}
