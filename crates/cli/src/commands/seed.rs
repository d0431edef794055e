//! Seed the menu and coffee-shop tables from YAML.
//!
//! Both loaders are idempotent: an item whose name already exists (or a shop
//! with the same name and address) is skipped.
//!
//! ```yaml
//! # menu.yaml
//! - name: Cappuccino
//!   description: Rich espresso with steamed milk foam
//!   price: 4.25
//!   rating: 4.8
//!   popular: true
//! ```

use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;

use sinocoffee_core::{Price, PriceError};
use sinocoffee_storefront::db::coffee_shops::NewCoffeeShop;
use sinocoffee_storefront::db::{CoffeeShopRepository, MenuItemRepository, RepositoryError};
use sinocoffee_storefront::models::MenuItemDraft;

use super::{DatabaseError, connect};

/// Highest rating a menu item or shop may carry.
const MAX_RATING: Decimal = Decimal::from_parts(5, 0, 0, false, 0);

/// Errors from seeding.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("{name}: {reason}")]
    Invalid { name: String, reason: String },

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("Insert failed: {0}")]
    Repository(#[from] RepositoryError),
}

/// One menu item as written in the seed file.
#[derive(Debug, Deserialize)]
pub struct SeedMenuItem {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub rating: Decimal,
    #[serde(default)]
    pub popular: bool,
    #[serde(default)]
    pub category: Option<String>,
}

impl TryFrom<SeedMenuItem> for MenuItemDraft {
    type Error = SeedError;

    fn try_from(item: SeedMenuItem) -> Result<Self, Self::Error> {
        let invalid = |reason: String| SeedError::Invalid {
            name: item.name.clone(),
            reason,
        };
        if item.name.trim().is_empty() {
            return Err(invalid("name is blank".to_string()));
        }
        let price = Price::new(item.price).map_err(|e: PriceError| invalid(e.to_string()))?;
        if item.rating < Decimal::ZERO || item.rating > MAX_RATING {
            return Err(invalid(format!("rating {} is outside 0-5", item.rating)));
        }

        Ok(Self {
            name: item.name.trim().to_string(),
            description: item.description.trim().to_string(),
            price,
            image_url: item.image_url.filter(|url| !url.trim().is_empty()),
            rating: item.rating,
            popular: item.popular,
            category: item
                .category
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| "Coffee".to_string()),
        })
    }
}

/// Parse and validate a menu seed file.
///
/// # Errors
///
/// Returns the first invalid entry, or the YAML error.
pub fn parse_menu(yaml: &str) -> Result<Vec<MenuItemDraft>, SeedError> {
    let items: Vec<SeedMenuItem> = serde_yaml::from_str(yaml)?;
    items.into_iter().map(MenuItemDraft::try_from).collect()
}

/// Parse and validate a coffee-shop seed file.
///
/// # Errors
///
/// Returns the first shop with out-of-range coordinates or rating.
pub fn parse_coffee_shops(yaml: &str) -> Result<Vec<NewCoffeeShop>, SeedError> {
    let shops: Vec<NewCoffeeShop> = serde_yaml::from_str(yaml)?;
    for shop in &shops {
        let invalid = |reason: &str| SeedError::Invalid {
            name: shop.name.clone(),
            reason: reason.to_string(),
        };
        if !(-90.0..=90.0).contains(&shop.latitude) || !(-180.0..=180.0).contains(&shop.longitude)
        {
            return Err(invalid("coordinates are out of range"));
        }
        if shop.rating < Decimal::ZERO || shop.rating > MAX_RATING {
            return Err(invalid("rating is outside 0-5"));
        }
    }
    Ok(shops)
}

async fn read(path: &Path) -> Result<String, SeedError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| SeedError::Read {
            path: path.display().to_string(),
            source,
        })
}

/// Insert menu items from `path`.
///
/// # Errors
///
/// Returns an error if the file is invalid or the database rejects a row.
pub async fn menu(path: &Path) -> Result<(), SeedError> {
    tracing::info!(path = %path.display(), "Loading menu items");
    let drafts = parse_menu(&read(path).await?)?;

    let pool = connect().await?;
    let repo = MenuItemRepository::new(&pool);

    let mut inserted = 0usize;
    for draft in &drafts {
        if repo.insert_if_missing(draft).await? {
            inserted += 1;
        } else {
            tracing::debug!(name = %draft.name, "Menu item exists, skipped");
        }
    }

    tracing::info!(
        inserted,
        skipped = drafts.len() - inserted,
        "Menu seeding complete!"
    );
    Ok(())
}

/// Insert coffee shops from `path`.
///
/// # Errors
///
/// Returns an error if the file is invalid or the database rejects a row.
pub async fn coffee_shops(path: &Path) -> Result<(), SeedError> {
    tracing::info!(path = %path.display(), "Loading coffee shops");
    let shops = parse_coffee_shops(&read(path).await?)?;

    let pool = connect().await?;
    let repo = CoffeeShopRepository::new(&pool);

    let mut inserted = 0usize;
    for shop in &shops {
        if repo.insert_if_missing(shop).await? {
            inserted += 1;
        }
    }

    tracing::info!(
        inserted,
        skipped = shops.len() - inserted,
        "Coffee shop seeding complete!"
    );
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_menu_defaults() {
        let drafts = parse_menu(
            "- name: Espresso\n  description: Pure and intense\n  price: 3.50\n",
        )
        .unwrap();
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].price, Price::from_cents(350));
        assert_eq!(drafts[0].category, "Coffee");
        assert!(!drafts[0].popular);
        assert_eq!(drafts[0].rating, Decimal::ZERO);
    }

    #[test]
    fn test_parse_menu_rejects_negative_price() {
        let err = parse_menu("- name: Refund\n  description: x\n  price: -1\n").unwrap_err();
        assert!(matches!(err, SeedError::Invalid { ref name, .. } if name == "Refund"));
    }

    #[test]
    fn test_parse_menu_rejects_rating_above_five() {
        assert!(
            parse_menu("- name: Latte\n  description: x\n  price: 4\n  rating: 6\n").is_err()
        );
    }

    #[test]
    fn test_parse_coffee_shops_checks_coordinates() {
        let ok = "- name: SinoCoffee Downtown\n  address: 123 Main St\n  latitude: 40.71\n  longitude: -74.0\n";
        assert_eq!(parse_coffee_shops(ok).unwrap().len(), 1);

        let bad = "- name: Nowhere\n  address: x\n  latitude: 123.0\n  longitude: 0.0\n";
        assert!(parse_coffee_shops(bad).is_err());
    }

    #[test]
    fn test_bundled_seed_files_parse() {
        let menu = include_str!("../../seed/menu.yaml");
        assert!(parse_menu(menu).unwrap().len() >= 6);
        let shops = include_str!("../../seed/coffee_shops.yaml");
        assert!(!parse_coffee_shops(shops).unwrap().is_empty());
    }
}
