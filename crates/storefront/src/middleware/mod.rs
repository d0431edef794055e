//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request span with `request_id` field)
//! 3. Request ID (add unique ID to each request)
//! 4. CSP nonce (generate per-request nonce for inline scripts)
//! 5. Security headers (CSP, frame and referrer policy)
//! 6. Session lock (requests sharing a session run one at a time)
//! 7. Session layer (tower-sessions with `PostgreSQL` store)
//! 8. Rate limiting on auth, contact and checkout routes (governor)
//!
//! Authentication is done by extractors rather than a layer.

pub mod auth;
pub mod csp;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;
pub mod session_lock;

pub use auth::{
    OptionalAuth, RequireAdmin, RequireAuth, clear_current_user, hx_redirect, login_url,
    safe_next, set_current_user,
};
pub use csp::{CspNonce, csp_nonce_middleware};
pub use rate_limit::{auth_rate_limiter, checkout_rate_limiter, contact_rate_limiter};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
pub use session_lock::{SessionLocks, serialize_session_requests};
