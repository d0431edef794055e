//! Integration tests for the SinoCoffee storefront.
//!
//! The tests talk to a running server over HTTP and are `#[ignore]`d by
//! default.
//!
//! # Running Tests
//!
//! ```bash
//! cargo run -p sinocoffee-cli -- migrate
//! cargo run -p sinocoffee-cli -- seed --menu crates/cli/seed/menu.yaml --shops crates/cli/seed/coffee_shops.yaml
//! cargo run -p sinocoffee-storefront &
//! cargo test -p sinocoffee-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_TEST_URL` - server under test (default `http://localhost:3000`)
//! - `STOREFRONT_DATABASE_URL` / `DATABASE_URL` - used to look up seeded rows
//! - `TEST_USER_EMAIL` / `TEST_USER_PASSWORD` - a confirmed account for
//!   signed-in flows

use reqwest::{Client, Response, redirect};
use sinocoffee_core::MenuItemId;
use sqlx::PgPool;

/// Base URL of the storefront under test.
#[must_use]
pub fn base_url() -> String {
    std::env::var("STOREFRONT_TEST_URL")
        .unwrap_or_else(|_| "http://localhost:3000".to_string())
        .trim_end_matches('/')
        .to_string()
}

/// A browser-like client: keeps cookies, does not follow redirects.
///
/// # Panics
///
/// Panics if the TLS backend cannot be initialised.
#[must_use]
pub fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(redirect::Policy::none())
        .build()
        .expect("Failed to create HTTP client")
}

/// Shared handle for one test.
pub struct TestContext {
    pub client: Client,
    pub base_url: String,
}

impl TestContext {
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: client(),
            base_url: base_url(),
        }
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Plain page load.
    ///
    /// # Panics
    ///
    /// Panics if the server is unreachable.
    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to reach storefront")
    }

    /// HTMX-style form post.
    ///
    /// # Panics
    ///
    /// Panics if the server is unreachable.
    pub async fn hx_post(&self, path: &str, form: &[(&str, &str)]) -> Response {
        self.client
            .post(self.url(path))
            .header("HX-Request", "true")
            .form(form)
            .send()
            .await
            .expect("Failed to reach storefront")
    }

    /// HTMX-style GET.
    ///
    /// # Panics
    ///
    /// Panics if the server is unreachable.
    pub async fn hx_get(&self, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .header("HX-Request", "true")
            .send()
            .await
            .expect("Failed to reach storefront")
    }
}

impl TestContext {
    /// A context whose cookie jar holds a signed-in session.
    ///
    /// # Panics
    ///
    /// Panics if the test credentials are missing or rejected.
    pub async fn signed_in() -> Self {
        dotenvy::dotenv().ok();
        let email = std::env::var("TEST_USER_EMAIL").expect("TEST_USER_EMAIL must be set");
        let password =
            std::env::var("TEST_USER_PASSWORD").expect("TEST_USER_PASSWORD must be set");

        let ctx = Self::new();
        let resp = ctx
            .client
            .post(ctx.url("/auth/login"))
            .form(&[("email", email.as_str()), ("password", password.as_str()), ("next", "/")])
            .send()
            .await
            .expect("Failed to reach storefront");
        assert!(
            resp.status().is_redirection(),
            "sign-in failed with {}",
            resp.status()
        );
        ctx
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Connect to the storefront database.
///
/// # Panics
///
/// Panics if no database URL is configured or the connection fails.
pub async fn pool() -> PgPool {
    dotenvy::dotenv().ok();
    let url = std::env::var("STOREFRONT_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .expect("STOREFRONT_DATABASE_URL or DATABASE_URL must be set");
    PgPool::connect(&url)
        .await
        .expect("Failed to connect to database")
}

/// A seeded menu item: `(id, name)`.
///
/// # Panics
///
/// Panics if the menu is empty; run `sc-cli seed` first.
pub async fn any_menu_item(pool: &PgPool) -> (MenuItemId, String) {
    let (id, name): (uuid::Uuid, String) =
        sqlx::query_as("SELECT id, name FROM menu_items ORDER BY created_at LIMIT 1")
            .fetch_one(pool)
            .await
            .expect("Menu is empty; seed it first");
    (MenuItemId::from(id), name)
}
