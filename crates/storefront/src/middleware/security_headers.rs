//! Security headers middleware for XSS, clickjacking, and isolation protection.
//!
//! Adds restrictive security headers to all responses. The CSP is opened only
//! as far as the site needs:
//! - HTMX and Mapbox GL scripts from their CDNs, inline scripts by nonce
//! - images from anywhere over HTTPS (menu images are admin-supplied URLs)
//! - Mapbox tile and style requests
//! - form posts that redirect to Stripe Checkout

use axum::{
    extract::{Request, State},
    http::{
        HeaderName, HeaderValue,
        header::{
            CONTENT_SECURITY_POLICY, REFERRER_POLICY, X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS,
        },
    },
    middleware::Next,
    response::Response,
};

use super::csp::CspNonce;
use crate::state::AppState;

/// Script CDN for HTMX.
const HTMX_ORIGIN: &str = "https://unpkg.com";

/// Mapbox GL JS, CSS, styles and tiles.
const MAPBOX_ORIGINS: &str = "https://api.mapbox.com https://*.tiles.mapbox.com https://events.mapbox.com";

/// Hosted payment page.
const STRIPE_CHECKOUT_ORIGIN: &str = "https://checkout.stripe.com";

/// Build the `Content-Security-Policy` value.
///
/// `nonce` is the per-request script nonce, `storage_origin` the backend
/// origin serving avatar images.
#[must_use]
pub fn content_security_policy(nonce: Option<&CspNonce>, storage_origin: &str) -> String {
    let nonce_source = nonce
        .filter(|n| !n.value().is_empty())
        .map(|n| format!(" {}", n.source()))
        .unwrap_or_default();

    format!(
        "default-src 'none'; \
         script-src 'self' {HTMX_ORIGIN} https://api.mapbox.com{nonce_source}; \
         style-src 'self' https://api.mapbox.com; \
         font-src 'self'; \
         img-src 'self' data: blob: https: {storage_origin}; \
         connect-src 'self' {MAPBOX_ORIGINS}; \
         worker-src blob:; \
         frame-src 'none'; \
         object-src 'none'; \
         base-uri 'self'; \
         form-action 'self' {STRIPE_CHECKOUT_ORIGIN}; \
         frame-ancestors 'none'"
    )
}

/// Add security headers to all responses.
///
/// Headers applied:
/// - `X-Frame-Options: DENY` - Prevent clickjacking
/// - `X-Content-Type-Options: nosniff` - Prevent MIME sniffing
/// - `Referrer-Policy: strict-origin-when-cross-origin` - Mapbox needs the origin
/// - `Content-Security-Policy` - see [`content_security_policy`]
/// - `Permissions-Policy` - Deny sensitive features except geolocation on self
/// - `Cache-Control: no-store, max-age=0` on pages (not `/static`)
/// - `Cross-Origin-Opener-Policy: same-origin` - Process isolation
pub async fn security_headers_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let nonce = request.extensions().get::<CspNonce>().cloned();
    let is_static = request.uri().path().starts_with("/static/");
    let storage_origin = state.storage().origin();

    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert(X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(
        REFERRER_POLICY,
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );

    match HeaderValue::from_str(&content_security_policy(nonce.as_ref(), &storage_origin)) {
        Ok(value) => {
            headers.insert(CONTENT_SECURITY_POLICY, value);
        }
        Err(e) => tracing::error!(error = %e, "Invalid CSP header value"),
    }

    headers.insert(
        HeaderName::from_static("permissions-policy"),
        HeaderValue::from_static(
            "accelerometer=(), \
             camera=(), \
             display-capture=(), \
             geolocation=(self), \
             gyroscope=(), \
             magnetometer=(), \
             microphone=(), \
             midi=(), \
             payment=(), \
             usb=(), \
             xr-spatial-tracking=()",
        ),
    );

    if !is_static {
        headers.insert(
            HeaderName::from_static("cache-control"),
            HeaderValue::from_static("no-store, max-age=0"),
        );
    }

    headers.insert(
        HeaderName::from_static("cross-origin-opener-policy"),
        HeaderValue::from_static("same-origin"),
    );

    response
}
