//! Saved favorites.

use chrono::{DateTime, Utc};
use serde::Serialize;

use sinocoffee_core::{FavoriteId, MenuItemId, NewCartLine, Price, UserId};

use super::menu_item::fallback_image;

/// A menu item a user saved, with the name and price captured at save time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Favorite {
    pub id: FavoriteId,
    pub user_id: UserId,
    pub item_id: MenuItemId,
    pub name: String,
    pub price: Price,
    pub image: Option<String>,
    pub category: String,
    pub created_at: DateTime<Utc>,
}

impl Favorite {
    #[must_use]
    pub fn display_image(&self) -> &str {
        match self.image.as_deref() {
            Some(url) if !url.trim().is_empty() => url,
            _ => fallback_image(&self.name),
        }
    }

    /// Adds the saved snapshot, not the current menu price.
    #[must_use]
    pub fn to_cart_line(&self) -> NewCartLine {
        NewCartLine {
            item_id: self.item_id,
            name: self.name.clone(),
            unit_price: self.price,
            image: Some(self.display_image().to_string()),
        }
    }
}
