//! Order history page and re-ordering.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use super::context::{load_cart, save_cart};
use super::{PageContext, cart_toast_response, toast_response};
use crate::db::HistoryRepository;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::{OrderRecord, Toast};
use crate::services::plan_reorder;
use crate::state::AppState;

/// Order history page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/history.html")]
pub struct HistoryTemplate {
    pub ctx: PageContext,
    pub orders: Vec<OrderRecord>,
}

fn reorder_failed() -> Toast {
    Toast::error("Reorder failed", "Failed to reorder items. Please try again.")
}

/// Display the signed-in user's past orders, newest first.
#[instrument(skip(state, ctx, user))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    mut ctx: PageContext,
) -> impl IntoResponse {
    let orders = match HistoryRepository::new(state.pool()).list(user.id).await {
        Ok(orders) => orders,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load order history");
            ctx.flash = Some(Toast::error(
                "Error loading history",
                "Failed to load your order history. Please try again.",
            ));
            Vec::new()
        }
    };

    HistoryTemplate { ctx, orders }
}

/// Add a past order's items back to the cart at current menu prices (HTMX).
///
/// Items no longer on the menu are skipped and named in the toast.
#[instrument(skip(state, session, user))]
pub async fn reorder(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
    Path(order_id): Path<String>,
) -> Response {
    let order = match HistoryRepository::new(state.pool())
        .get(user.id, &order_id)
        .await
    {
        Ok(Some(order)) => order,
        Ok(None) => {
            return toast_response(Toast::error(
                "Order not found",
                "This order is not in your history.",
            ));
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to load order");
            return toast_response(reorder_failed());
        }
    };

    let menu = match state.catalog().menu().await {
        Ok(menu) => menu,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load menu for reorder");
            return toast_response(reorder_failed());
        }
    };

    let plan = plan_reorder(&order.items, &menu);
    if plan.additions.is_empty() {
        return toast_response(Toast::error(
            "Nothing to reorder",
            "None of the items from this order are on the menu anymore.",
        ));
    }

    let mut cart = load_cart(&session).await;
    let mut added = 0u32;
    for (line, quantity) in plan.additions.iter().cloned() {
        added = added.saturating_add(quantity);
        cart.add_quantity(line, quantity);
    }
    cart.open();

    if let Err(e) = save_cart(&session, &cart).await {
        tracing::error!(error = %e, "Failed to save cart to session");
        return toast_response(reorder_failed());
    }

    tracing::info!(
        order_id = %order.order_id,
        added,
        skipped = plan.skipped.len(),
        "Reordered past order"
    );

    cart_toast_response(Toast::success(
        "Items reordered!",
        format!(
            "{added} item(s) have been added to your cart. {}",
            plan.notice()
        ),
    ))
}
