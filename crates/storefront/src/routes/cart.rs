//! Cart route handlers.
//!
//! The cart lives in the visitor's session. Every handler loads it, applies
//! one operation and writes it back. Handlers return HTMX fragments: the
//! drawer, the count badge or a toast.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{AppendHeaders, IntoResponse, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use sinocoffee_core::{Cart, MenuItemId};

use super::context::{load_cart, save_cart};
use super::{cart_toast_response, toast_response};
use crate::error::add_breadcrumb;
use crate::middleware::RequireAuth;
use crate::models::Toast;
use crate::state::AppState;

/// Event the navbar badge listens for.
pub const CART_UPDATED: &str = "cart-updated";

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub item_id: MenuItemId,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub item_id: MenuItemId,
    pub quantity: u32,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub item_id: MenuItemId,
}

/// Cart drawer fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_drawer.html")]
pub struct CartDrawerTemplate {
    pub cart: Cart,
    pub toast: Option<Toast>,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

// =============================================================================
// Helpers
// =============================================================================

/// Persist `updated` and render it, telling the badge to refresh when lines
/// changed. If the write fails the drawer shows `loaded` with an error toast.
async fn respond_with_drawer(
    session: &Session,
    loaded: Cart,
    updated: Cart,
    changes_lines: bool,
) -> Response {
    if let Err(e) = save_cart(session, &updated).await {
        tracing::error!(error = %e, "Failed to save cart to session");
        return CartDrawerTemplate {
            cart: loaded,
            toast: Some(save_failed()),
        }
        .into_response();
    }

    let drawer = CartDrawerTemplate {
        cart: updated,
        toast: None,
    };
    if changes_lines {
        (AppendHeaders([("HX-Trigger", CART_UPDATED)]), drawer).into_response()
    } else {
        drawer.into_response()
    }
}

fn save_failed() -> Toast {
    Toast::error("Error", "Your cart could not be updated. Please try again.")
}

/// Apply `op` to the session cart and return the updated drawer.
async fn with_cart(session: &Session, changes_lines: bool, op: impl FnOnce(&mut Cart)) -> Response {
    let loaded = load_cart(session).await;
    let mut updated = loaded.clone();
    op(&mut updated);
    respond_with_drawer(session, loaded, updated, changes_lines).await
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the cart drawer.
#[instrument(skip(session))]
pub async fn show(session: Session) -> impl IntoResponse {
    CartDrawerTemplate {
        cart: load_cart(&session).await,
        toast: None,
    }
}

/// Add one unit of a menu item to the cart (HTMX).
///
/// Guests are sent to the login page by [`RequireAuth`].
#[instrument(skip(state, session, user), fields(user_id = %user.id))]
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
    Form(form): Form<AddToCartForm>,
) -> Response {
    let item = match state.catalog().menu_item(form.item_id).await {
        Ok(Some(item)) => item,
        Ok(None) => {
            return toast_response(Toast::error(
                "Item unavailable",
                "This item is no longer on the menu.",
            ));
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to load menu item");
            return toast_response(Toast::error(
                "Error",
                "Failed to add item to cart. Please try again.",
            ));
        }
    };

    let mut cart = load_cart(&session).await;
    cart.add(item.to_cart_line());
    if let Err(e) = save_cart(&session, &cart).await {
        tracing::error!(error = %e, "Failed to save cart to session");
        return toast_response(Toast::error(
            "Error",
            "Failed to add item to cart. Please try again.",
        ));
    }

    let item_id = item.id.to_string();
    add_breadcrumb("cart", "Added item", Some(&[("item_id", item_id.as_str())]));
    tracing::info!(item = %item.name, "Added to cart");

    cart_toast_response(Toast::success(
        "Added to cart!",
        format!("{} has been added to your cart.", item.name),
    ))
}

/// Update cart line quantity (HTMX). Zero removes the line.
#[instrument(skip(session))]
pub async fn update(session: Session, Form(form): Form<UpdateCartForm>) -> Response {
    with_cart(&session, true, |cart| {
        cart.update_quantity(form.item_id, form.quantity);
    })
    .await
}

/// Remove a line from the cart (HTMX).
#[instrument(skip(session))]
pub async fn remove(session: Session, Form(form): Form<RemoveFromCartForm>) -> Response {
    with_cart(&session, true, |cart| {
        cart.remove(form.item_id);
    })
    .await
}

/// Empty the cart (HTMX).
#[instrument(skip(session))]
pub async fn clear(session: Session) -> Response {
    with_cart(&session, true, Cart::clear).await
}

/// Flip drawer visibility (HTMX).
#[instrument(skip(session))]
pub async fn toggle(session: Session) -> Response {
    with_cart(&session, false, Cart::toggle).await
}

/// Open the drawer (HTMX).
#[instrument(skip(session))]
pub async fn open(session: Session) -> Response {
    with_cart(&session, false, Cart::open).await
}

/// Close the drawer (HTMX).
#[instrument(skip(session))]
pub async fn close(session: Session) -> Response {
    with_cart(&session, false, Cart::close).await
}

/// Get cart count badge (HTMX).
#[instrument(skip(session))]
pub async fn count(session: Session) -> impl IntoResponse {
    CartCountTemplate {
        count: load_cart(&session).await.total_items(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sinocoffee_core::{NewCartLine, Price};

    fn cart_with_latte() -> Cart {
        let mut cart = Cart::default();
        cart.add_quantity(
            NewCartLine {
                item_id: MenuItemId::generate(),
                name: "Latte".to_string(),
                unit_price: Price::from_cents(450),
                image: Some("/static/images/menu/latte.jpg".to_string()),
            },
            2,
        );
        cart
    }

    #[test]
    fn test_drawer_renders_lines_and_total() {
        let mut cart = cart_with_latte();
        cart.open();
        let html = CartDrawerTemplate { cart, toast: None }.render().unwrap();
        assert!(html.contains("Latte"));
        assert!(html.contains("$9.00"));
        assert!(html.contains("Proceed to Checkout"));
    }

    #[test]
    fn test_empty_drawer() {
        let mut cart = Cart::default();
        cart.open();
        let html = CartDrawerTemplate { cart, toast: None }.render().unwrap();
        assert!(html.contains("Your cart is empty"));
        assert!(!html.contains("Proceed to Checkout"));
    }

    #[test]
    fn test_count_badge_hidden_when_zero() {
        let html = CartCountTemplate { count: 0 }.render().unwrap();
        assert!(!html.contains(">0<"));
        let html = CartCountTemplate { count: 3 }.render().unwrap();
        assert!(html.contains(">3<"));
    }

    /// Store that is unreachable.
    #[derive(Debug, Clone, Default)]
    struct DownStore;

    #[async_trait::async_trait]
    impl tower_sessions::SessionStore for DownStore {
        async fn save(
            &self,
            _record: &tower_sessions::session::Record,
        ) -> tower_sessions::session_store::Result<()> {
            Err(tower_sessions::session_store::Error::Backend("down".to_string()))
        }

        async fn load(
            &self,
            _id: &tower_sessions::session::Id,
        ) -> tower_sessions::session_store::Result<Option<tower_sessions::session::Record>> {
            Err(tower_sessions::session_store::Error::Backend("down".to_string()))
        }

        async fn delete(
            &self,
            _id: &tower_sessions::session::Id,
        ) -> tower_sessions::session_store::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_failed_save_shows_loaded_cart_without_trigger() {
        let session = Session::new(
            Some(tower_sessions::session::Id::default()),
            std::sync::Arc::new(DownStore),
            None,
        );
        let response = with_cart(&session, true, |cart| {
            cart.add(NewCartLine {
                item_id: MenuItemId::generate(),
                name: "Cortado".to_string(),
                unit_price: Price::from_cents(400),
                image: None,
            });
        })
        .await;

        assert!(response.headers().get("HX-Trigger").is_none());
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let html = String::from_utf8(body.to_vec()).unwrap();
        assert!(!html.contains("Cortado"));
        assert!(html.contains("Your cart could not be updated"));
    }

    #[test]
    fn test_update_form_parses() {
        let id = MenuItemId::generate();
        let form: UpdateCartForm =
            serde_json::from_value(serde_json::json!({ "item_id": id.to_string(), "quantity": 0 }))
                .unwrap();
        assert_eq!(form.item_id, id);
        assert_eq!(form.quantity, 0);
    }
}
