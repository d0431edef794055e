//! Checkout route handlers.
//!
//! `POST /checkout` opens a hosted payment page for the session cart;
//! `GET /payment-success` is where the payment provider sends the buyer back.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use sinocoffee_core::OrderStatus;

use super::context::{load_cart, save_cart};
use super::{PageContext, toast_response};
use crate::db::HistoryRepository;
use crate::error::add_breadcrumb;
use crate::filters;
use crate::middleware::{OptionalAuth, hx_redirect};
use crate::models::order::{NewOrder, PendingCheckout, generate_order_number};
use crate::models::{Toast, session_keys};
use crate::payments::{CheckoutRequest, CheckoutSession};
use crate::state::AppState;

/// Return-page query string.
#[derive(Debug, Deserialize)]
pub struct PaymentSuccessQuery {
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Payment success page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/payment_success.html")]
pub struct PaymentSuccessTemplate {
    pub ctx: PageContext,
    pub order_number: String,
    pub session_id: Option<String>,
    /// Whether the provider confirmed the payment.
    pub confirmed: bool,
}

fn checkout_error() -> Toast {
    Toast::error(
        "Checkout Error",
        "Unable to process payment. Please try again or contact support.",
    )
}

/// Create a payment session for the cart and navigate to it (HTMX).
#[instrument(skip(state, session, user))]
pub async fn create(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    session: Session,
) -> Response {
    let cart = load_cart(&session).await;
    if cart.is_empty() {
        return toast_response(Toast::error(
            "Cart is empty",
            "Add some items to your cart before checkout.",
        ));
    }

    let request = CheckoutRequest {
        cart: &cart,
        customer_email: user.as_ref().map(|u| u.email.as_str()),
        base_url: state.config().base_url.trim_end_matches('/'),
        currency: state.stripe().currency(),
    };

    match state.stripe().create_checkout_session(&request).await {
        Ok((checkout, url)) => {
            let pending = PendingCheckout::new(&checkout.id, &cart, request.amount_cents());
            if let Err(e) = session.insert(session_keys::PENDING_CHECKOUT, &pending).await {
                tracing::error!(error = %e, "Failed to store pending checkout");
                return toast_response(checkout_error());
            }
            add_breadcrumb(
                "checkout",
                "Created payment session",
                Some(&[("session_id", checkout.id.as_str())]),
            );
            tracing::info!(
                session_id = %checkout.id,
                items = cart.total_items(),
                total = %cart.total_price(),
                "Redirecting to checkout"
            );
            hx_redirect(&url)
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to create checkout session");
            toast_response(checkout_error())
        }
    }
}

/// The order to record for a paid checkout.
///
/// Built from the cart snapshot taken when the checkout opened, and only when
/// that snapshot belongs to this checkout and matches what Stripe charged.
fn paid_order(checkout: &CheckoutSession, pending: Option<PendingCheckout>) -> Option<NewOrder> {
    let Some(pending) = pending else {
        tracing::warn!(session_id = %checkout.id, "No cart snapshot for paid checkout");
        return None;
    };
    if pending.session_id != checkout.id {
        tracing::warn!(
            session_id = %checkout.id,
            snapshot = %pending.session_id,
            "Cart snapshot belongs to another checkout"
        );
        return None;
    }
    if checkout.amount_total != Some(pending.amount_cents) {
        tracing::warn!(
            session_id = %checkout.id,
            charged = ?checkout.amount_total,
            expected = pending.amount_cents,
            "Charged amount does not match cart snapshot"
        );
        return None;
    }
    Some(pending.into_order(OrderStatus::Processing))
}

/// Payment return page.
///
/// A paid session is written to the signed-in user's history (once, keyed by
/// the session ID). The cart is cleared either way.
#[instrument(skip(state, session, ctx))]
pub async fn success(
    State(state): State<AppState>,
    ctx: PageContext,
    session: Session,
    Query(query): Query<PaymentSuccessQuery>,
) -> impl IntoResponse {
    let mut cart = load_cart(&session).await;
    let session_id = query.session_id.filter(|id| !id.trim().is_empty());
    let pending = session
        .remove::<PendingCheckout>(session_keys::PENDING_CHECKOUT)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to read pending checkout");
            None
        });

    let mut confirmed = false;
    if let Some(id) = session_id.as_deref() {
        match state.stripe().retrieve_checkout_session(id).await {
            Ok(checkout) if checkout.is_paid() => {
                confirmed = true;
                if let Some(user) = &ctx.user
                    && let Some(order) = paid_order(&checkout, pending)
                {
                    match HistoryRepository::new(state.pool()).record(user.id, &order).await {
                        Ok(true) => tracing::info!(session_id = %id, "Order recorded"),
                        Ok(false) => tracing::debug!(session_id = %id, "Order already recorded"),
                        Err(e) => tracing::error!(error = %e, "Failed to record order"),
                    }
                }
            }
            Ok(checkout) => {
                tracing::warn!(
                    session_id = %id,
                    payment_status = %checkout.payment_status,
                    "Returned from unpaid checkout"
                );
            }
            Err(e) => tracing::warn!(error = %e, "Failed to verify checkout session"),
        }
    }

    cart.clear();
    cart.close();
    if let Err(e) = save_cart(&session, &cart).await {
        tracing::error!(error = %e, "Failed to clear cart after payment");
    }

    PaymentSuccessTemplate {
        ctx: PageContext { cart_count: 0, ..ctx },
        order_number: generate_order_number(),
        session_id,
        confirmed,
    }
}
