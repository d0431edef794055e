//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Single-page home (hero, about, menu, blog,
//!                                subscription, gallery, contact)
//! GET  /health                 - Health check
//! GET  /health/ready           - Readiness check (database)
//!
//! # Menu & Gallery (HTMX fragments)
//! GET  /menu                   - Menu grid fragment
//! POST /menu/{id}/favorite     - Toggle favorite, returns the heart button
//! GET  /gallery?filter=        - Gallery grid fragment
//!
//! # Blog
//! GET  /blog                   - Post listing
//! GET  /blog/{slug}            - Post detail
//!
//! # Contact
//! POST /contact                - Send the contact form (rate limited)
//!
//! # Locations
//! GET  /locations              - Map and shop list
//! GET  /api/locations          - Filtered shops as JSON for the map script
//!
//! # Cart (HTMX fragments)
//! GET  /cart                   - Cart drawer
//! POST /cart/add               - Add a menu item (requires auth)
//! POST /cart/update            - Set a line's quantity
//! POST /cart/remove            - Remove a line
//! POST /cart/clear             - Empty the cart
//! POST /cart/toggle|open|close - Drawer visibility
//! GET  /cart/count             - Cart count badge
//!
//! # Checkout
//! POST /checkout               - Create a payment session (rate limited)
//! GET  /payment-success        - Return page after payment
//!
//! # Auth
//! GET  /auth/login             - Login page
//! POST /auth/login             - Login action (rate limited)
//! GET  /auth/register          - Register page
//! POST /auth/register          - Register action (rate limited)
//! POST /auth/logout            - Logout action
//!
//! # Account (requires auth)
//! GET  /account                - Profile
//! POST /account/profile        - Update display name
//! POST /account/avatar         - Upload avatar (multipart)
//! GET  /favorites              - Saved items
//! POST /favorites/{id}/remove  - Unsave an item
//! POST /favorites/{id}/cart    - Add a saved item to the cart
//! GET  /history                - Past orders
//! POST /history/{id}/reorder   - Add a past order back to the cart
//!
//! # Admin (requires the admin role)
//! GET  /admin/menu             - Menu item table
//! GET  /admin/menu/new         - New item form
//! POST /admin/menu             - Create item
//! GET  /admin/menu/{id}/edit   - Edit item form
//! POST /admin/menu/{id}        - Update item
//! POST /admin/menu/{id}/delete - Delete item
//! ```

pub mod account;
pub mod admin;
pub mod auth;
pub mod blog;
pub mod cart;
pub mod checkout;
pub mod contact;
pub mod context;
pub mod favorites;
pub mod history;
pub mod home;
pub mod locations;
pub mod menu;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    response::{AppendHeaders, IntoResponse, Response},
    routing::{get, post},
};

pub use context::PageContext;

use crate::middleware::{auth_rate_limiter, checkout_rate_limiter, contact_rate_limiter};
use crate::models::Toast;
use crate::state::AppState;

/// Multipart bodies may carry a 5 MiB avatar plus form overhead.
const AVATAR_BODY_LIMIT: usize = 6 * 1024 * 1024;

// =============================================================================
// Shared Fragments
// =============================================================================

/// Out-of-band toast appended to the page's toast region.
#[derive(Template, WebTemplate)]
#[template(path = "partials/toast_oob.html")]
pub struct ToastTemplate {
    pub toast: Toast,
}

/// Respond with a toast only.
#[must_use]
pub fn toast_response(toast: Toast) -> Response {
    ToastTemplate { toast }.into_response()
}

/// Respond with a toast and tell listeners the cart changed.
#[must_use]
pub fn cart_toast_response(toast: Toast) -> Response {
    (
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        ToastTemplate { toast },
    )
        .into_response()
}

// =============================================================================
// Routers
// =============================================================================

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    let limited = Router::new()
        .route("/login", post(auth::login))
        .route("/register", post(auth::register))
        .route_layer(auth_rate_limiter());

    Router::new()
        .route("/login", get(auth::login_page))
        .route("/register", get(auth::register_page))
        .route("/logout", post(auth::logout))
        .merge(limited)
}

/// Create the blog routes router.
pub fn blog_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(blog::index))
        .route("/{slug}", get(blog::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/toggle", post(cart::toggle))
        .route("/open", post(cart::open))
        .route("/close", post(cart::close))
        .route("/count", get(cart::count))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(account::index))
        .route("/profile", post(account::update_profile))
        .route(
            "/avatar",
            post(account::upload_avatar).layer(DefaultBodyLimit::max(AVATAR_BODY_LIMIT)),
        )
}

/// Create the favorites routes router.
pub fn favorite_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(favorites::index))
        .route("/{item_id}/remove", post(favorites::remove))
        .route("/{item_id}/cart", post(favorites::add_to_cart))
}

/// Create the order history routes router.
pub fn history_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(history::index))
        .route("/{order_id}/reorder", post(history::reorder))
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(admin::dashboard))
        .route("/menu", get(admin::index).post(admin::create))
        .route("/menu/new", get(admin::new))
        .route("/menu/{id}", post(admin::update))
        .route("/menu/{id}/edit", get(admin::edit))
        .route("/menu/{id}/delete", post(admin::delete))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    let contact = Router::new()
        .route("/contact", post(contact::submit))
        .route_layer(contact_rate_limiter());

    let checkout = Router::new()
        .route("/checkout", post(checkout::create))
        .route_layer(checkout_rate_limiter());

    Router::new()
        // Home page
        .route("/", get(home::home))
        .route("/gallery", get(home::gallery))
        // Menu fragments
        .route("/menu", get(menu::grid))
        .route("/menu/{id}/favorite", post(menu::toggle_favorite))
        // Blog
        .nest("/blog", blog_routes())
        // Locations
        .route("/locations", get(locations::index))
        .route("/api/locations", get(locations::api))
        // Cart and checkout
        .nest("/cart", cart_routes())
        .route("/payment-success", get(checkout::success))
        .merge(checkout)
        .merge(contact)
        // Signed-in pages
        .nest("/auth", auth_routes())
        .nest("/account", account_routes())
        .nest("/favorites", favorite_routes())
        .nest("/history", history_routes())
        .nest("/admin", admin_routes())
}
