//! Shopping cart state container.
//!
//! The cart is a plain value: handlers load it from the visitor's session,
//! apply one operation and write it back. Nothing here performs I/O.

use serde::{Deserialize, Serialize};

use crate::types::{MenuItemId, Price};

/// A menu item about to be placed in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCartLine {
    pub item_id: MenuItemId,
    pub name: String,
    pub unit_price: Price,
    pub image: Option<String>,
}

/// One line of the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub item_id: MenuItemId,
    pub name: String,
    pub unit_price: Price,
    pub quantity: u32,
    pub image: Option<String>,
}

impl CartLine {
    /// `unit_price * quantity`.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.unit_price.times(self.quantity)
    }
}

/// Ordered list of cart lines plus the drawer visibility flag.
///
/// ```
/// use sinocoffee_core::{Cart, MenuItemId, NewCartLine, Price};
///
/// let mut cart = Cart::default();
/// let latte = NewCartLine {
///     item_id: MenuItemId::generate(),
///     name: "Latte".into(),
///     unit_price: Price::from_cents(450),
///     image: None,
/// };
/// cart.add(latte.clone());
/// cart.add(latte);
/// assert_eq!(cart.len(), 1);
/// assert_eq!(cart.total_items(), 2);
/// assert_eq!(cart.total_price().to_string(), "$9.00");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
    #[serde(default)]
    is_open: bool,
}

impl Cart {
    /// Add one unit of `item`.
    pub fn add(&mut self, item: NewCartLine) {
        self.add_quantity(item, 1);
    }

    /// Add `quantity` units of `item`, merging with an existing line.
    pub fn add_quantity(&mut self, item: NewCartLine, quantity: u32) {
        if quantity == 0 {
            return;
        }
        if let Some(line) = self.find_mut(item.item_id) {
            line.quantity = line.quantity.saturating_add(quantity);
            return;
        }
        self.lines.push(CartLine {
            item_id: item.item_id,
            name: item.name,
            unit_price: item.unit_price,
            quantity,
            image: item.image,
        });
    }

    /// Drop the line for `item_id`. Returns whether a line was removed.
    pub fn remove(&mut self, item_id: MenuItemId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| line.item_id != item_id);
        self.lines.len() != before
    }

    /// Replace the quantity of `item_id`; zero removes the line.
    ///
    /// Returns whether the cart changed.
    pub fn update_quantity(&mut self, item_id: MenuItemId, quantity: u32) -> bool {
        if quantity == 0 {
            return self.remove(item_id);
        }
        match self.find_mut(item_id) {
            Some(line) => {
                line.quantity = quantity;
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Sum of all quantities (the badge count).
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.lines
            .iter()
            .fold(0u32, |acc, line| acc.saturating_add(line.quantity))
    }

    #[must_use]
    pub fn total_price(&self) -> Price {
        self.lines.iter().map(CartLine::subtotal).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn get(&self, item_id: MenuItemId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.item_id == item_id)
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.is_open
    }

    pub const fn open(&mut self) {
        self.is_open = true;
    }

    pub const fn close(&mut self) {
        self.is_open = false;
    }

    pub const fn toggle(&mut self) {
        self.is_open = !self.is_open;
    }

    fn find_mut(&mut self, item_id: MenuItemId) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|line| line.item_id == item_id)
    }
}
