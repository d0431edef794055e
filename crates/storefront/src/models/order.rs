//! Past orders stored in the `history` table.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use sinocoffee_core::{Cart, HistoryId, MenuItemId, OrderStatus, Price, UserId};

/// Length of the customer-facing order number.
const ORDER_NUMBER_LEN: usize = 9;
const ORDER_NUMBER_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// One line of a past order, stored inside the `items` JSON array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    /// Absent on rows written before lines carried the menu item id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<MenuItemId>,
    pub name: String,
    pub quantity: u32,
    pub price: Price,
}

impl OrderLine {
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.price.times(self.quantity)
    }
}

/// Raw `history` row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct HistoryRow {
    pub id: HistoryId,
    pub user_id: UserId,
    pub order_id: String,
    pub items: serde_json::Value,
    pub total: Price,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

/// A past order as shown on the history page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRecord {
    pub id: HistoryId,
    pub order_id: String,
    pub items: Vec<OrderLine>,
    pub total: Price,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl From<HistoryRow> for OrderRecord {
    fn from(row: HistoryRow) -> Self {
        Self {
            id: row.id,
            order_id: row.order_id,
            items: decode_lines(row.items),
            total: row.total,
            status: row.status,
            created_at: row.created_at,
        }
    }
}

impl OrderRecord {
    /// Sum of quantities across lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0u32, |acc, line| acc.saturating_add(line.quantity))
    }

    /// Date shown on the order card, e.g. `Mar 4, 2026`.
    #[must_use]
    pub fn date_label(&self) -> String {
        self.created_at.format("%b %-d, %Y").to_string()
    }
}

/// An order about to be written to history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub order_id: String,
    pub items: Vec<OrderLine>,
    pub total: Price,
    pub status: OrderStatus,
}

impl NewOrder {
    /// Snapshot a cart as a paid order.
    #[must_use]
    pub fn from_cart(order_id: impl Into<String>, cart: &Cart, status: OrderStatus) -> Self {
        let items = cart
            .lines()
            .iter()
            .map(|line| OrderLine {
                item_id: Some(line.item_id),
                name: line.name.clone(),
                quantity: line.quantity,
                price: line.unit_price,
            })
            .collect();
        Self {
            order_id: order_id.into(),
            items,
            total: cart.total_price(),
            status,
        }
    }

    /// The `items` column value.
    #[must_use]
    pub fn items_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.items).unwrap_or_else(|_| serde_json::Value::Array(Vec::new()))
    }
}

/// The cart as it was when a checkout session was opened, kept in the
/// session until the buyer returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingCheckout {
    /// Stripe checkout session ID.
    pub session_id: String,
    pub items: Vec<OrderLine>,
    pub total: Price,
    /// What Stripe was asked to charge, in cents.
    pub amount_cents: i64,
}

impl PendingCheckout {
    #[must_use]
    pub fn new(session_id: impl Into<String>, cart: &Cart, amount_cents: i64) -> Self {
        let order = NewOrder::from_cart(String::new(), cart, OrderStatus::Processing);
        Self {
            session_id: session_id.into(),
            items: order.items,
            total: order.total,
            amount_cents,
        }
    }

    /// The snapshot as a history row for its checkout session.
    #[must_use]
    pub fn into_order(self, status: OrderStatus) -> NewOrder {
        NewOrder {
            order_id: self.session_id,
            items: self.items,
            total: self.total,
            status,
        }
    }
}

/// Decode the `items` column. Anything but an array yields no lines, and
/// malformed elements are skipped.
#[must_use]
pub fn decode_lines(value: serde_json::Value) -> Vec<OrderLine> {
    match value {
        serde_json::Value::Array(elements) => elements
            .into_iter()
            .filter_map(|element| match serde_json::from_value::<OrderLine>(element) {
                Ok(line) => Some(line),
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping malformed order line");
                    None
                }
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Random customer-facing order number (nine upper-case alphanumerics).
#[must_use]
pub fn generate_order_number() -> String {
    let mut rng = rand::rng();
    (0..ORDER_NUMBER_LEN)
        .map(|_| {
            let idx = rng.random_range(0..ORDER_NUMBER_ALPHABET.len());
            char::from(ORDER_NUMBER_ALPHABET.get(idx).copied().unwrap_or(b'X'))
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;
    use sinocoffee_core::NewCartLine;

    #[test]
    fn test_decode_lines_accepts_legacy_numeric_prices() {
        let lines = decode_lines(json!([
            { "name": "Latte", "quantity": 2, "price": 4.5 },
            { "name": "Mocha", "quantity": 1, "price": "5.25",
              "item_id": "6f1c1f2e-8a4b-4d59-9a5c-0f6d2b1e3c4a" }
        ]));
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].price, Price::from_cents(450));
        assert!(lines[0].item_id.is_none());
        assert!(lines[1].item_id.is_some());
    }

    #[test]
    fn test_decode_lines_non_array_is_empty() {
        assert!(decode_lines(json!({ "name": "Latte" })).is_empty());
        assert!(decode_lines(json!(null)).is_empty());
        assert!(decode_lines(json!("oops")).is_empty());
    }

    #[test]
    fn test_decode_lines_skips_malformed_elements() {
        let lines = decode_lines(json!([
            { "name": "Latte", "quantity": 1, "price": 4.5 },
            { "name": "Broken" },
            42
        ]));
        assert_eq!(lines.len(), 1);
    }

    #[test]
    fn test_new_order_from_cart() {
        let mut cart = Cart::default();
        let id = MenuItemId::generate();
        cart.add_quantity(
            NewCartLine {
                item_id: id,
                name: "Espresso".to_string(),
                unit_price: Price::from_cents(300),
                image: None,
            },
            3,
        );
        let order = NewOrder::from_cart("cs_test_123", &cart, OrderStatus::Processing);
        assert_eq!(order.total, Price::from_cents(900));
        assert_eq!(order.items[0].item_id, Some(id));
        let json = order.items_json();
        assert_eq!(json[0]["quantity"], 3);
        assert_eq!(decode_lines(json), order.items);
    }

    #[test]
    fn test_order_number_shape() {
        let number = generate_order_number();
        assert_eq!(number.len(), 9);
        assert!(number.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }
}
