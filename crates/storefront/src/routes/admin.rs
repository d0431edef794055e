//! Menu management route handlers.
//!
//! Every handler requires the `admin` role. Successful writes redirect back to
//! the item table with a flash toast; invalid submissions re-render the form.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use sinocoffee_core::MenuItemId;

use super::PageContext;
use super::context::set_flash;
use crate::db::RepositoryError;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::models::{FormErrors, MenuItem, MenuItemInput, Toast};
use crate::state::AppState;

const MENU_PATH: &str = "/admin/menu";

/// Menu item table template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/menu_index.html")]
pub struct MenuIndexTemplate {
    pub ctx: PageContext,
    pub items: Vec<MenuItem>,
}

/// Create/edit form template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/menu_form.html")]
pub struct MenuFormTemplate {
    pub ctx: PageContext,
    /// `None` when creating.
    pub item_id: Option<MenuItemId>,
    pub input: MenuItemInput,
    pub errors: FormErrors,
}

impl MenuFormTemplate {
    /// Where the form posts.
    #[must_use]
    pub fn action(&self) -> String {
        match self.item_id {
            Some(id) => format!("{MENU_PATH}/{id}"),
            None => MENU_PATH.to_string(),
        }
    }

    #[must_use]
    pub const fn is_edit(&self) -> bool {
        self.item_id.is_some()
    }
}

fn save_failed() -> Toast {
    Toast::error("Error", "Failed to save menu item.")
}

/// Admin landing page.
pub async fn dashboard(RequireAdmin(_admin): RequireAdmin) -> Redirect {
    Redirect::to(MENU_PATH)
}

/// List every menu item.
#[instrument(skip(state, ctx, _admin))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    mut ctx: PageContext,
) -> impl IntoResponse {
    let items = match state.catalog().menu().await {
        Ok(items) => items.as_ref().clone(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load menu items");
            ctx.flash = Some(Toast::error("Error", "Failed to load menu items."));
            Vec::new()
        }
    };

    MenuIndexTemplate { ctx, items }
}

/// New item form.
#[instrument(skip(ctx, _admin))]
pub async fn new(RequireAdmin(_admin): RequireAdmin, ctx: PageContext) -> impl IntoResponse {
    MenuFormTemplate {
        ctx,
        item_id: None,
        input: MenuItemInput::default(),
        errors: FormErrors::new(),
    }
}

/// Create an item.
#[instrument(skip(state, session, ctx, admin, input), fields(admin_id = %admin.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    session: Session,
    mut ctx: PageContext,
    Form(input): Form<MenuItemInput>,
) -> Response {
    let draft = match input.validate() {
        Ok(draft) => draft,
        Err(errors) => {
            return MenuFormTemplate {
                ctx,
                item_id: None,
                input,
                errors,
            }
            .into_response();
        }
    };

    match state.catalog().create_item(&draft).await {
        Ok(item) => {
            tracing::info!(item_id = %item.id, name = %item.name, "Menu item created");
            set_flash(
                &session,
                &Toast::success("Success", "Menu item created successfully."),
            )
            .await;
            Redirect::to(MENU_PATH).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, name = %draft.name, "Failed to create menu item");
            ctx.flash = Some(save_failed());
            MenuFormTemplate {
                ctx,
                item_id: None,
                input,
                errors: FormErrors::new(),
            }
            .into_response()
        }
    }
}

/// Edit form for an existing item.
///
/// # Errors
///
/// Returns 404 for an unknown item and 500 if the menu cannot be read.
#[instrument(skip(state, ctx, _admin))]
pub async fn edit(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ctx: PageContext,
    Path(id): Path<MenuItemId>,
) -> Result<MenuFormTemplate> {
    let item = state
        .catalog()
        .menu_item(id)
        .await?
        .ok_or_else(|| AppError::NotFound("menu item".to_string()))?;

    Ok(MenuFormTemplate {
        ctx,
        item_id: Some(id),
        input: MenuItemInput::from_item(&item),
        errors: FormErrors::new(),
    })
}

/// Update an item.
#[instrument(skip(state, session, ctx, admin, input), fields(admin_id = %admin.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    session: Session,
    mut ctx: PageContext,
    Path(id): Path<MenuItemId>,
    Form(input): Form<MenuItemInput>,
) -> Response {
    let draft = match input.validate() {
        Ok(draft) => draft,
        Err(errors) => {
            return MenuFormTemplate {
                ctx,
                item_id: Some(id),
                input,
                errors,
            }
            .into_response();
        }
    };

    match state.catalog().update_item(id, &draft).await {
        Ok(item) => {
            tracing::info!(item_id = %item.id, "Menu item updated");
            set_flash(
                &session,
                &Toast::success("Success", "Menu item updated successfully."),
            )
            .await;
            Redirect::to(MENU_PATH).into_response()
        }
        Err(RepositoryError::NotFound) => {
            (StatusCode::NOT_FOUND, "Menu item not found").into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, item_id = %id, "Failed to update menu item");
            ctx.flash = Some(save_failed());
            MenuFormTemplate {
                ctx,
                item_id: Some(id),
                input,
                errors: FormErrors::new(),
            }
            .into_response()
        }
    }
}

/// Delete an item.
///
/// Favorites and past orders keep their own snapshot of the item.
#[instrument(skip(state, session, admin), fields(admin_id = %admin.id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    session: Session,
    Path(id): Path<MenuItemId>,
) -> Redirect {
    let toast = match state.catalog().delete_item(id).await {
        Ok(()) => {
            tracing::info!(item_id = %id, "Menu item deleted");
            Toast::success("Success", "Menu item deleted successfully.")
        }
        Err(RepositoryError::NotFound) => {
            Toast::error("Error", "That menu item no longer exists.")
        }
        Err(e) => {
            tracing::error!(error = %e, item_id = %id, "Failed to delete menu item");
            Toast::error("Error", "Failed to delete menu item.")
        }
    };
    set_flash(&session, &toast).await;
    Redirect::to(MENU_PATH)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_form_action() {
        let id = MenuItemId::generate();
        let form = MenuFormTemplate {
            ctx: PageContext::default(),
            item_id: Some(id),
            input: MenuItemInput::default(),
            errors: FormErrors::new(),
        };
        assert_eq!(form.action(), format!("/admin/menu/{id}"));
        assert!(form.is_edit());
    }

    #[test]
    fn test_form_shows_errors_and_values() {
        let input = MenuItemInput {
            name: "Honey Oat Latte".to_string(),
            price: "abc".to_string(),
            ..MenuItemInput::default()
        };
        let errors = input.validate().unwrap_err();
        let html = MenuFormTemplate {
            ctx: PageContext::default(),
            item_id: None,
            input,
            errors,
        }
        .render()
        .unwrap();
        assert!(html.contains("value=\"Honey Oat Latte\""));
        assert!(html.contains("Description is required"));
        assert!(html.contains("Price must be a non-negative number"));
        assert!(html.contains("action=\"/admin/menu\""));
    }
}
