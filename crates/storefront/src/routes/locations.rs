//! Coffee-shop locations: the map page and its JSON feed.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Serialize;
use tracing::instrument;

use super::PageContext;
use crate::error::{AppError, Result};
use crate::filters;
use crate::models::coffee_shop::SPECIALTIES;
use crate::models::{CoffeeShop, ShopFilter, Toast};
use crate::state::AppState;

/// A shop as sent to the map script.
#[derive(Debug, Clone, Serialize)]
pub struct LocationJson {
    #[serde(flatten)]
    pub shop: CoffeeShop,
    pub directions_url: String,
}

impl From<&CoffeeShop> for LocationJson {
    fn from(shop: &CoffeeShop) -> Self {
        Self {
            shop: shop.clone(),
            directions_url: shop.directions_url(),
        }
    }
}

/// Locations page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/locations.html")]
pub struct LocationsTemplate {
    pub ctx: PageContext,
    pub filter: ShopFilter,
    pub specialties: &'static [(&'static str, &'static str)],
    pub shops: Vec<CoffeeShop>,
    pub total: usize,
    /// Public Mapbox token; the map is hidden without it.
    pub mapbox_token: Option<String>,
}

impl LocationsTemplate {
    /// `3 locations found` / `1 location found`.
    #[must_use]
    pub fn result_label(&self) -> String {
        match self.shops.len() {
            1 => "1 location found".to_string(),
            n => format!("{n} locations found"),
        }
    }

    /// JSON feed for the map script, carrying the current filter.
    #[must_use]
    pub fn api_url(&self) -> String {
        format!(
            "/api/locations?q={}&specialty={}",
            urlencoding::encode(self.filter.query.trim()),
            urlencoding::encode(self.filter.selected_specialty())
        )
    }

    /// Whether `value` is the chosen specialty option.
    #[must_use]
    pub fn is_selected(&self, value: &str) -> bool {
        self.filter.selected_specialty().eq_ignore_ascii_case(value)
    }
}

/// Display the locations page.
#[instrument(skip(state, ctx))]
pub async fn index(
    State(state): State<AppState>,
    mut ctx: PageContext,
    Query(filter): Query<ShopFilter>,
) -> impl IntoResponse {
    let all = match state.catalog().shops().await {
        Ok(shops) => shops,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load coffee shops");
            ctx.flash = Some(Toast::error(
                "Error",
                "Failed to load coffee shop locations",
            ));
            std::sync::Arc::default()
        }
    };

    let shops = filter.apply(&all).into_iter().cloned().collect();

    LocationsTemplate {
        ctx,
        specialties: SPECIALTIES,
        shops,
        total: all.len(),
        mapbox_token: state.config().mapbox_token.clone(),
        filter,
    }
}

/// Filtered shops as JSON for the map markers.
///
/// # Errors
///
/// Returns 500 if the shops cannot be loaded.
#[instrument(skip(state))]
pub async fn api(
    State(state): State<AppState>,
    Query(filter): Query<ShopFilter>,
) -> Result<Json<Vec<LocationJson>>> {
    let all = state.catalog().shops().await.map_err(AppError::from)?;
    Ok(Json(
        filter
            .apply(&all)
            .into_iter()
            .map(LocationJson::from)
            .collect(),
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use sinocoffee_core::CoffeeShopId;

    fn shop(name: &str) -> CoffeeShop {
        CoffeeShop {
            id: CoffeeShopId::generate(),
            name: name.to_string(),
            address: "123 Coffee Street".to_string(),
            latitude: 40.7128,
            longitude: -74.006,
            phone: Some("+1 (555) 123-4567".to_string()),
            hours: Some("6:00 AM - 9:00 PM".to_string()),
            rating: Decimal::new(48, 1),
            image_url: None,
            description: None,
            specialty: Some("Single Origin".to_string()),
        }
    }

    #[test]
    fn test_location_json_has_directions() {
        let json = serde_json::to_value(LocationJson::from(&shop("Downtown"))).unwrap();
        assert_eq!(json["name"], "Downtown");
        assert_eq!(
            json["directions_url"],
            "https://www.google.com/maps/dir/?api=1&destination=40.7128,-74.006"
        );
        assert_eq!(json["latitude"], 40.7128);
    }

    #[test]
    fn test_page_without_token_hides_map() {
        let page = LocationsTemplate {
            ctx: PageContext::default(),
            filter: ShopFilter::default(),
            specialties: SPECIALTIES,
            shops: vec![shop("Downtown")],
            total: 1,
            mapbox_token: None,
        };
        assert_eq!(page.result_label(), "1 location found");
        assert_eq!(page.api_url(), "/api/locations?q=&specialty=all");
        let html = page.render().unwrap();
        assert!(html.contains("Downtown"));
        assert!(html.contains("href=\"tel:+15551234567\""));
        assert!(!html.contains("id=\"map\""));
    }
}
