//! Application state shared across handlers.

use std::path::Path;
use std::sync::Arc;

use sqlx::PgPool;

use crate::config::StorefrontConfig;
use crate::content::{ContentError, ContentStore};
use crate::payments::{StripeClient, StripeError};
use crate::services::{Catalog, EmailClient, MailerError};
use crate::supabase::{AuthClient, StorageClient, SupabaseError};

/// Error building the application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("backend client: {0}")]
    Supabase(#[from] SupabaseError),
    #[error("payment client: {0}")]
    Stripe(#[from] StripeError),
    #[error("email client: {0}")]
    Email(#[from] MailerError),
    #[error("content: {0}")]
    Content(#[from] ContentError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    auth: AuthClient,
    storage: StorageClient,
    stripe: StripeClient,
    email: Option<EmailClient>,
    catalog: Catalog,
    content: ContentStore,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `pool` - `PostgreSQL` connection pool
    /// * `content_dir` - Directory holding `blog/*.md`
    ///
    /// # Errors
    ///
    /// Returns an error if an API client cannot be built or the content
    /// directory cannot be read.
    pub fn new(
        config: StorefrontConfig,
        pool: PgPool,
        content_dir: &Path,
    ) -> Result<Self, StateError> {
        let auth = AuthClient::new(&config.supabase)?;
        let storage = StorageClient::new(&config.supabase)?;
        let stripe = StripeClient::new(&config.stripe)?;
        let email = EmailClient::from_config(&config.email)?;
        if email.is_none() {
            tracing::warn!("RESEND_API_KEY not set; contact form is disabled");
        }
        let catalog = Catalog::new(pool.clone());
        let content = ContentStore::load(content_dir)?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                auth,
                storage,
                stripe,
                email,
                catalog,
                content,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    #[must_use]
    pub fn auth(&self) -> &AuthClient {
        &self.inner.auth
    }

    #[must_use]
    pub fn storage(&self) -> &StorageClient {
        &self.inner.storage
    }

    #[must_use]
    pub fn stripe(&self) -> &StripeClient {
        &self.inner.stripe
    }

    /// Contact email client, `None` when email is not configured.
    #[must_use]
    pub fn email(&self) -> Option<&EmailClient> {
        self.inner.email.as_ref()
    }

    /// Cached menu and location reads.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// Blog posts loaded at startup.
    #[must_use]
    pub fn content(&self) -> &ContentStore {
        &self.inner.content
    }
}
