//! Rate limiting middleware using governor and `tower_governor`.
//!
//! Three limiters, all keyed by client IP:
//! - `auth_rate_limiter`: sign-in and sign-up (~10/min)
//! - `contact_rate_limiter`: contact form, each request sends an email (~3/min)
//! - `checkout_rate_limiter`: payment session creation (~20/min)

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::extract::ConnectInfo;
use axum::http::Request;
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

// =============================================================================
// Client IP Key Extractor
// =============================================================================

/// Key extractor that reads the client IP from reverse-proxy headers:
/// first `X-Forwarded-For` entry, then `X-Real-IP`, then the peer address.
#[derive(Clone, Copy)]
pub struct ForwardedIpKeyExtractor;

impl tower_governor::key_extractor::KeyExtractor for ForwardedIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        client_ip(req.headers())
            .or_else(|| {
                req.extensions()
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|info| info.0.ip())
            })
            .ok_or(GovernorError::UnableToExtractKey)
    }
}

fn client_ip(headers: &axum::http::HeaderMap) -> Option<IpAddr> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .and_then(|s| s.trim().parse::<IpAddr>().ok())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.trim().parse::<IpAddr>().ok())
        })
}

// =============================================================================
// Rate Limiter Configuration
// =============================================================================

/// Rate limiter layer type for Axum.
pub type RateLimiterLayer =
    GovernorLayer<ForwardedIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

fn limiter(replenish_seconds: u64, burst: u32) -> Option<RateLimiterLayer> {
    GovernorConfigBuilder::default()
        .key_extractor(ForwardedIpKeyExtractor)
        .per_second(replenish_seconds)
        .burst_size(burst)
        .finish()
        .map(|config| GovernorLayer::new(Arc::new(config)))
}

/// Create rate limiter for auth endpoints: ~10 requests per minute per IP.
///
/// Replenishes 1 token every 6 seconds, burst of 5.
///
/// # Panics
///
/// Never in practice: the constants are positive, which `GovernorConfigBuilder`
/// always accepts.
#[must_use]
pub fn auth_rate_limiter() -> RateLimiterLayer {
    limiter(6, 5).expect("rate limiter config with per_second(6) and burst_size(5) is valid")
}

/// Create rate limiter for the contact form: ~3 requests per minute per IP.
///
/// # Panics
///
/// Never in practice, see [`auth_rate_limiter`].
#[must_use]
pub fn contact_rate_limiter() -> RateLimiterLayer {
    limiter(20, 3).expect("rate limiter config with per_second(20) and burst_size(3) is valid")
}

/// Create rate limiter for checkout: ~20 requests per minute per IP.
///
/// # Panics
///
/// Never in practice, see [`auth_rate_limiter`].
#[must_use]
pub fn checkout_rate_limiter() -> RateLimiterLayer {
    limiter(3, 10).expect("rate limiter config with per_second(3) and burst_size(10) is valid")
}
