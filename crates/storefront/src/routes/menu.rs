//! Menu grid and favorite toggle (HTMX fragments).

use std::collections::HashSet;

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, State};
use tracing::instrument;

use sinocoffee_core::MenuItemId;

use crate::db::FavoriteRepository;
use crate::middleware::OptionalAuth;
use crate::models::{MenuItem, Toast};
use crate::state::AppState;

/// A menu card with the viewer's favorite state.
#[derive(Debug, Clone)]
pub struct MenuCard {
    pub item: MenuItem,
    pub favorited: bool,
}

/// Build cards in menu order.
#[must_use]
pub fn menu_cards(items: &[MenuItem], favorite_ids: &HashSet<MenuItemId>) -> Vec<MenuCard> {
    items
        .iter()
        .map(|item| MenuCard {
            item: item.clone(),
            favorited: favorite_ids.contains(&item.id),
        })
        .collect()
}

/// Menu grid fragment template.
#[derive(Template, WebTemplate)]
#[template(path = "partials/menu_grid.html")]
pub struct MenuGridTemplate {
    pub cards: Vec<MenuCard>,
    pub toast: Option<Toast>,
}

/// Heart button fragment template.
#[derive(Template, WebTemplate)]
#[template(path = "partials/favorite_button.html")]
pub struct FavoriteButtonTemplate {
    pub item_id: MenuItemId,
    pub favorited: bool,
    pub toast: Option<Toast>,
}

/// Menu grid (HTMX). Hearts are filled for the signed-in user's favorites.
#[instrument(skip(state, user))]
pub async fn grid(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
) -> MenuGridTemplate {
    let items = match state.catalog().menu().await {
        Ok(items) => items,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load menu items");
            return MenuGridTemplate {
                cards: Vec::new(),
                toast: Some(Toast::error("Error", "Failed to load menu items.")),
            };
        }
    };

    let favorite_ids = match &user {
        Some(user) => FavoriteRepository::new(state.pool())
            .item_ids(user.id)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Failed to load favorites for menu");
                HashSet::new()
            }),
        None => HashSet::new(),
    };

    MenuGridTemplate {
        cards: menu_cards(&items, &favorite_ids),
        toast: None,
    }
}

/// Toggle a favorite (HTMX). Guests get an "Authentication Required" toast.
#[instrument(skip(state, user))]
pub async fn toggle_favorite(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Path(item_id): Path<MenuItemId>,
) -> FavoriteButtonTemplate {
    let button = |favorited: bool, toast: Toast| FavoriteButtonTemplate {
        item_id,
        favorited,
        toast: Some(toast),
    };
    let failed = || {
        Toast::error(
            "Error updating favorites",
            "Failed to update favorites. Please try again.",
        )
    };

    let Some(user) = user else {
        return button(false, Toast::auth_required("add favorites"));
    };

    let item = match state.catalog().menu_item(item_id).await {
        Ok(Some(item)) => item,
        Ok(None) => return button(false, failed()),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load menu item");
            return button(false, failed());
        }
    };

    match FavoriteRepository::new(state.pool()).toggle(user.id, &item).await {
        Ok(true) => {
            tracing::info!(user_id = %user.id, item = %item.name, "Favorite added");
            button(
                true,
                Toast::success(
                    "Added to favorites!",
                    format!("{} has been added to your favorites.", item.name),
                ),
            )
        }
        Ok(false) => {
            tracing::info!(user_id = %user.id, item = %item.name, "Favorite removed");
            button(
                false,
                Toast::success(
                    "Removed from favorites",
                    format!("{} has been removed from your favorites.", item.name),
                ),
            )
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to toggle favorite");
            button(false, failed())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use sinocoffee_core::Price;

    fn item(name: &str) -> MenuItem {
        MenuItem {
            id: MenuItemId::generate(),
            name: name.to_string(),
            description: "Rich and smooth".to_string(),
            price: Price::from_cents(425),
            image_url: None,
            rating: Decimal::new(49, 1),
            popular: true,
            category: "Coffee".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_menu_cards_mark_favorites() {
        let items = vec![item("Espresso"), item("Latte")];
        let favorites: HashSet<MenuItemId> = [items[1].id].into_iter().collect();
        let cards = menu_cards(&items, &favorites);
        assert!(!cards[0].favorited);
        assert!(cards[1].favorited);
    }

    #[test]
    fn test_grid_renders_cards() {
        let cards = menu_cards(&[item("Flat White")], &HashSet::new());
        let html = MenuGridTemplate { cards, toast: None }.render().unwrap();
        assert!(html.contains("Flat White"));
        assert!(html.contains("$4.25"));
        assert!(html.contains("4.9"));
        assert!(html.contains("/static/images/menu/cold-brew.jpg"));
    }

    #[test]
    fn test_guest_toggle_toast() {
        let html = FavoriteButtonTemplate {
            item_id: MenuItemId::generate(),
            favorited: false,
            toast: Some(Toast::auth_required("add favorites")),
        }
        .render()
        .unwrap();
        assert!(html.contains("Authentication Required"));
        assert!(html.contains("Please sign in to add favorites."));
    }
}
