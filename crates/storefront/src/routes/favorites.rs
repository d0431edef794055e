//! Saved favorites page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use sinocoffee_core::MenuItemId;

use super::context::{load_cart, save_cart};
use super::{PageContext, cart_toast_response, toast_response};
use crate::db::FavoriteRepository;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::{Favorite, Toast};
use crate::state::AppState;

/// Favorites grid fragment template.
#[derive(Template, WebTemplate)]
#[template(path = "partials/favorites_list.html")]
pub struct FavoritesListTemplate {
    pub favorites: Vec<Favorite>,
    pub toast: Option<Toast>,
}

/// Favorites page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/favorites.html")]
pub struct FavoritesTemplate {
    pub ctx: PageContext,
    pub list: FavoritesListTemplate,
}

fn load_failed() -> Toast {
    Toast::error(
        "Error loading favorites",
        "Failed to load your favorites. Please try again.",
    )
}

/// Display the signed-in user's favorites, newest first.
#[instrument(skip(state, ctx, user))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    mut ctx: PageContext,
) -> impl IntoResponse {
    let favorites = match FavoriteRepository::new(state.pool()).list(user.id).await {
        Ok(favorites) => favorites,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load favorites");
            ctx.flash = Some(load_failed());
            Vec::new()
        }
    };

    FavoritesTemplate {
        ctx,
        list: FavoritesListTemplate {
            favorites,
            toast: None,
        },
    }
}

/// Unsave an item and return the updated grid (HTMX).
#[instrument(skip(state, user))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(item_id): Path<MenuItemId>,
) -> FavoritesListTemplate {
    let repo = FavoriteRepository::new(state.pool());

    let toast = match repo.remove(user.id, item_id).await {
        Ok(_) => Toast::success(
            "Removed from favorites",
            "Item has been removed from your favorites.",
        ),
        Err(e) => {
            tracing::error!(error = %e, "Failed to remove favorite");
            Toast::error(
                "Error updating favorites",
                "Failed to remove the item. Please try again.",
            )
        }
    };

    let favorites = repo.list(user.id).await.unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to reload favorites");
        Vec::new()
    });

    FavoritesListTemplate {
        favorites,
        toast: Some(toast),
    }
}

/// Add a saved item to the cart at its saved price (HTMX).
#[instrument(skip(state, session, user))]
pub async fn add_to_cart(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
    Path(item_id): Path<MenuItemId>,
) -> Response {
    let favorite = match FavoriteRepository::new(state.pool()).get(user.id, item_id).await {
        Ok(Some(favorite)) => favorite,
        Ok(None) => {
            return toast_response(Toast::error(
                "Not in favorites",
                "This item is no longer in your favorites.",
            ));
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to load favorite");
            return toast_response(load_failed());
        }
    };

    let mut cart = load_cart(&session).await;
    cart.add(favorite.to_cart_line());
    if let Err(e) = save_cart(&session, &cart).await {
        tracing::error!(error = %e, "Failed to save cart to session");
        return toast_response(Toast::error(
            "Error",
            "Failed to add item to cart. Please try again.",
        ));
    }

    tracing::info!(item = %favorite.name, "Added favorite to cart");
    cart_toast_response(Toast::success(
        "Added to cart!",
        format!("{} has been added to your cart.", favorite.name),
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sinocoffee_core::{FavoriteId, Price, UserId};

    fn favorite(name: &str) -> Favorite {
        Favorite {
            id: FavoriteId::generate(),
            user_id: UserId::generate(),
            item_id: MenuItemId::generate(),
            name: name.to_string(),
            price: Price::from_cents(550),
            image: None,
            category: "Coffee".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_list_renders_saved_price() {
        let fav = favorite("Caramel Macchiato");
        let html = FavoritesListTemplate {
            favorites: vec![fav.clone()],
            toast: None,
        }
        .render()
        .unwrap();
        assert!(html.contains("Caramel Macchiato"));
        assert!(html.contains("$5.50"));
        assert!(html.contains(&format!("/favorites/{}/cart", fav.item_id)));
    }

    #[test]
    fn test_empty_list() {
        let html = FavoritesListTemplate {
            favorites: Vec::new(),
            toast: Some(Toast::success("Removed from favorites", "x")),
        }
        .render()
        .unwrap();
        assert!(html.contains("No Favorites Yet"));
        assert!(html.contains("hx-swap-oob"));
    }
}
