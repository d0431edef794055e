//! Stripe Checkout Sessions client.
//!
//! The API takes `application/x-www-form-urlencoded` bodies with bracketed
//! keys for nested fields (`line_items[0][price_data][currency]`), so the
//! request is flattened into key/value pairs by [`CheckoutRequest::form_params`].

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Deserialize;
use thiserror::Error;

use sinocoffee_core::Cart;

use crate::config::StripeConfig;

/// Stripe API base URL.
const BASE_URL: &str = "https://api.stripe.com/v1";

/// Pinned API version.
const API_VERSION: &str = "2023-10-16";

/// Customer email used when nobody is signed in.
pub const GUEST_EMAIL: &str = "guest@sinocoffee.com";

/// Countries a checkout may ship to.
pub const ALLOWED_SHIPPING_COUNTRIES: &[&str] = &[
    "US", "CA", "GB", "AU", "DE", "FR", "IT", "ES", "NL", "BE", "AT", "CH", "SE", "DK", "NO", "FI",
];

/// Errors that can occur when talking to Stripe.
#[derive(Debug, Error)]
pub enum StripeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Session was created but Stripe sent no redirect URL.
    #[error("checkout session {0} has no URL")]
    MissingUrl(String),

    /// Nothing to pay for.
    #[error("cart is empty")]
    EmptyCart,

    /// Failed to parse response or build a request.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// A checkout session as returned by Stripe (fields we use).
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
    /// `paid`, `unpaid` or `no_payment_required`.
    #[serde(default)]
    pub payment_status: String,
    /// Amount charged, in cents.
    #[serde(default)]
    pub amount_total: Option<i64>,
}

impl CheckoutSession {
    #[must_use]
    pub fn is_paid(&self) -> bool {
        matches!(self.payment_status.as_str(), "paid" | "no_payment_required")
    }
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: Option<String>,
}

/// Everything needed to open a checkout for one cart.
#[derive(Debug)]
pub struct CheckoutRequest<'a> {
    pub cart: &'a Cart,
    /// Signed-in user's email; `None` uses [`GUEST_EMAIL`].
    pub customer_email: Option<&'a str>,
    /// Public base URL of the storefront, without trailing slash.
    pub base_url: &'a str,
    /// Lowercase ISO currency.
    pub currency: &'a str,
}

impl CheckoutRequest<'_> {
    /// Total Stripe will charge for the cart, in cents: each unit price is
    /// rounded before it is multiplied by the quantity.
    #[must_use]
    pub fn amount_cents(&self) -> i64 {
        self.cart
            .lines()
            .iter()
            .map(|line| {
                line.unit_price
                    .to_cents()
                    .saturating_mul(i64::from(line.quantity))
            })
            .fold(0i64, i64::saturating_add)
    }

    /// Flatten into Stripe's bracketed form encoding.
    ///
    /// # Errors
    ///
    /// Returns `StripeError::EmptyCart` if the cart has no lines.
    pub fn form_params(&self) -> Result<Vec<(String, String)>, StripeError> {
        if self.cart.is_empty() {
            return Err(StripeError::EmptyCart);
        }

        let mut params: Vec<(String, String)> = vec![
            (
                "customer_email".into(),
                self.customer_email.unwrap_or(GUEST_EMAIL).to_string(),
            ),
            ("mode".into(), "payment".into()),
            (
                "success_url".into(),
                format!(
                    "{}/payment-success?session_id={{CHECKOUT_SESSION_ID}}",
                    self.base_url
                ),
            ),
            ("cancel_url".into(), format!("{}/?canceled=true", self.base_url)),
            ("payment_method_types[0]".into(), "card".into()),
            ("billing_address_collection".into(), "required".into()),
        ];

        for (i, country) in ALLOWED_SHIPPING_COUNTRIES.iter().enumerate() {
            params.push((
                format!("shipping_address_collection[allowed_countries][{i}]"),
                (*country).to_string(),
            ));
        }

        for (i, line) in self.cart.lines().iter().enumerate() {
            let prefix = format!("line_items[{i}]");
            params.push((
                format!("{prefix}[price_data][currency]"),
                self.currency.to_string(),
            ));
            params.push((
                format!("{prefix}[price_data][product_data][name]"),
                line.name.clone(),
            ));
            params.push((
                format!("{prefix}[price_data][product_data][description]"),
                format!("Delicious {} from SinoCoffee", line.name),
            ));
            params.push((
                format!("{prefix}[price_data][unit_amount]"),
                line.unit_price.to_cents().to_string(),
            ));
            params.push((format!("{prefix}[quantity]"), line.quantity.to_string()));
            params.push((
                format!("{prefix}[price_data][product_data][metadata][item_id]"),
                line.item_id.to_string(),
            ));
        }

        Ok(params)
    }
}

/// Stripe API client.
#[derive(Clone)]
pub struct StripeClient {
    client: reqwest::Client,
    currency: String,
}

impl StripeClient {
    /// Create a new Stripe client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &StripeConfig) -> Result<Self, StripeError> {
        let mut headers = HeaderMap::new();

        let auth_value = format!("Bearer {}", config.secret_key.expose_secret());
        let mut auth = HeaderValue::from_str(&auth_value)
            .map_err(|e| StripeError::Parse(format!("Invalid API key format: {e}")))?;
        auth.set_sensitive(true);
        headers.insert(reqwest::header::AUTHORIZATION, auth);
        headers.insert("Stripe-Version", HeaderValue::from_static(API_VERSION));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            currency: config.currency.clone(),
        })
    }

    /// Checkout currency.
    #[must_use]
    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Create a checkout session and return it with its redirect URL.
    ///
    /// # Errors
    ///
    /// Returns `StripeError::EmptyCart` for an empty cart,
    /// `StripeError::Api` if Stripe rejects the request and
    /// `StripeError::MissingUrl` if the session has no URL.
    pub async fn create_checkout_session(
        &self,
        request: &CheckoutRequest<'_>,
    ) -> Result<(CheckoutSession, String), StripeError> {
        let params = request.form_params()?;
        let response = self
            .client
            .post(format!("{BASE_URL}/checkout/sessions"))
            .form(&params)
            .send()
            .await?;

        let session = Self::parse(response).await?;
        let url = session
            .url
            .clone()
            .ok_or_else(|| StripeError::MissingUrl(session.id.clone()))?;
        Ok((session, url))
    }

    /// Fetch a checkout session by ID.
    ///
    /// # Errors
    ///
    /// Returns `StripeError::Api` if the session does not exist.
    pub async fn retrieve_checkout_session(
        &self,
        session_id: &str,
    ) -> Result<CheckoutSession, StripeError> {
        if !is_session_id(session_id) {
            return Err(StripeError::Parse(format!(
                "invalid checkout session id: {session_id}"
            )));
        }
        let response = self
            .client
            .get(format!("{BASE_URL}/checkout/sessions/{session_id}"))
            .send()
            .await?;
        Self::parse(response).await
    }

    async fn parse(response: reqwest::Response) -> Result<CheckoutSession, StripeError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .ok()
                .and_then(|e| e.error.message)
                .unwrap_or(body);
            return Err(StripeError::Api {
                status: status.as_u16(),
                message,
            });
        }
        response
            .json()
            .await
            .map_err(|e| StripeError::Parse(e.to_string()))
    }
}

/// Checkout session IDs look like `cs_test_a1B2...`; reject anything that
/// could alter the request path.
fn is_session_id(id: &str) -> bool {
    id.starts_with("cs_")
        && id.len() <= 255
        && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sinocoffee_core::{MenuItemId, NewCartLine, Price};

    fn cart() -> Cart {
        let mut cart = Cart::default();
        cart.add_quantity(
            NewCartLine {
                item_id: MenuItemId::generate(),
                name: "Cappuccino".to_string(),
                unit_price: Price::parse("4.995").unwrap(),
                image: None,
            },
            2,
        );
        cart.add(NewCartLine {
            item_id: MenuItemId::generate(),
            name: "Cold Brew".to_string(),
            unit_price: Price::parse("5.50").unwrap(),
            image: None,
        });
        cart
    }

    fn param<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn request(cart: &Cart) -> CheckoutRequest<'_> {
        CheckoutRequest {
            cart,
            customer_email: None,
            base_url: "https://sinocoffee.com",
            currency: "usd",
        }
    }

    #[test]
    fn test_line_items_are_flattened() {
        let cart = cart();
        let params = request(&cart).form_params().unwrap();
        assert_eq!(param(&params, "line_items[0][price_data][unit_amount]"), Some("500"));
        assert_eq!(param(&params, "line_items[0][quantity]"), Some("2"));
        assert_eq!(
            param(&params, "line_items[0][price_data][product_data][description]"),
            Some("Delicious Cappuccino from SinoCoffee")
        );
        assert_eq!(param(&params, "line_items[1][price_data][unit_amount]"), Some("550"));
        assert_eq!(param(&params, "line_items[1][price_data][currency]"), Some("usd"));
        assert!(param(&params, "line_items[2][quantity]").is_none());
    }

    #[test]
    fn test_session_settings() {
        let cart = cart();
        let params = request(&cart).form_params().unwrap();
        assert_eq!(param(&params, "customer_email"), Some(GUEST_EMAIL));
        assert_eq!(param(&params, "mode"), Some("payment"));
        assert_eq!(param(&params, "payment_method_types[0]"), Some("card"));
        assert_eq!(param(&params, "billing_address_collection"), Some("required"));
        assert_eq!(
            param(&params, "success_url"),
            Some("https://sinocoffee.com/payment-success?session_id={CHECKOUT_SESSION_ID}")
        );
        assert_eq!(param(&params, "cancel_url"), Some("https://sinocoffee.com/?canceled=true"));
    }

    #[test]
    fn test_allowed_countries() {
        let cart = cart();
        let params = request(&cart).form_params().unwrap();
        let countries: Vec<&str> = params
            .iter()
            .filter(|(k, _)| k.starts_with("shipping_address_collection[allowed_countries]"))
            .map(|(_, v)| v.as_str())
            .collect();
        assert_eq!(countries, ALLOWED_SHIPPING_COUNTRIES);
        assert_eq!(
            param(&params, "shipping_address_collection[allowed_countries][15]"),
            Some("FI")
        );
    }

    #[test]
    fn test_signed_in_email_is_used() {
        let cart = cart();
        let mut req = request(&cart);
        req.customer_email = Some("maria@example.com");
        let params = req.form_params().unwrap();
        assert_eq!(param(&params, "customer_email"), Some("maria@example.com"));
    }

    #[test]
    fn test_amount_matches_line_items() {
        let cart = cart();
        // 2 x 500 (4.995 rounded) + 550
        assert_eq!(request(&cart).amount_cents(), 1550);
        assert_eq!(request(&Cart::default()).amount_cents(), 0);
    }

    #[test]
    fn test_empty_cart_is_rejected() {
        let empty = Cart::default();
        assert!(matches!(request(&empty).form_params(), Err(StripeError::EmptyCart)));
    }

    #[test]
    fn test_session_paid_states() {
        let mut session: CheckoutSession = serde_json::from_str(
            r#"{"id":"cs_test_1","payment_status":"paid","amount_total":1550}"#,
        )
        .unwrap();
        assert!(session.is_paid());
        assert_eq!(session.amount_total, Some(1550));
        session.payment_status = "unpaid".to_string();
        assert!(!session.is_paid());
    }

    #[test]
    fn test_session_id_validation() {
        assert!(is_session_id("cs_test_a1B2c3"));
        assert!(!is_session_id("cs_test/../../v1/charges"));
        assert!(!is_session_id("pi_123"));
    }
}
