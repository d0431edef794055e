//! Menu items and the admin form that edits them.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use url::Url;

use sinocoffee_core::{MenuItemId, NewCartLine, Price};

use super::form::{FormErrors, non_blank};

/// Category assigned when the admin leaves it blank.
pub const DEFAULT_CATEGORY: &str = "Coffee";

/// Highest allowed rating.
pub const MAX_RATING: Decimal = Decimal::from_parts(5, 0, 0, false, 0);

const ESPRESSO_IMAGE: &str = "/static/images/menu/espresso.jpg";
const CAPPUCCINO_IMAGE: &str = "/static/images/menu/cappuccino.jpg";
const LATTE_IMAGE: &str = "/static/images/menu/latte.jpg";
const COLD_BREW_IMAGE: &str = "/static/images/menu/cold-brew.jpg";

/// A purchasable product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct MenuItem {
    pub id: MenuItemId,
    pub name: String,
    pub description: String,
    pub price: Price,
    pub image_url: Option<String>,
    pub rating: Decimal,
    pub popular: bool,
    pub category: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MenuItem {
    /// Uploaded image, or a bundled photo chosen by name.
    #[must_use]
    pub fn display_image(&self) -> &str {
        match self.image_url.as_deref() {
            Some(url) if !url.trim().is_empty() => url,
            _ => fallback_image(&self.name),
        }
    }

    /// Rating with one decimal, as shown on the card badge.
    #[must_use]
    pub fn rating_label(&self) -> String {
        format!("{:.1}", self.rating.round_dp(1))
    }

    /// What goes into the cart when this item is added.
    #[must_use]
    pub fn to_cart_line(&self) -> NewCartLine {
        NewCartLine {
            item_id: self.id,
            name: self.name.clone(),
            unit_price: self.price,
            image: Some(self.display_image().to_string()),
        }
    }
}

/// Bundled photo for items without an uploaded image.
#[must_use]
pub fn fallback_image(name: &str) -> &'static str {
    match name {
        "Cappuccino" | "Mocha" => CAPPUCCINO_IMAGE,
        "Latte" | "Macchiato" => LATTE_IMAGE,
        "Cold Brew" | "Flat White" => COLD_BREW_IMAGE,
        _ => ESPRESSO_IMAGE,
    }
}

/// Raw admin form submission.
///
/// Every field arrives as text so a bad value can be echoed back with an
/// error instead of failing extraction.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MenuItemInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub rating: String,
    /// Checkbox: present (any value) when ticked.
    #[serde(default)]
    pub popular: Option<String>,
    #[serde(default)]
    pub category: String,
}

/// A validated menu item ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItemDraft {
    pub name: String,
    pub description: String,
    pub price: Price,
    pub image_url: Option<String>,
    pub rating: Decimal,
    pub popular: bool,
    pub category: String,
}

impl MenuItemInput {
    /// Pre-fill the edit form from an existing item.
    #[must_use]
    pub fn from_item(item: &MenuItem) -> Self {
        Self {
            name: item.name.clone(),
            description: item.description.clone(),
            price: item.price.plain(),
            image_url: item.image_url.clone().unwrap_or_default(),
            rating: item.rating_label(),
            popular: item.popular.then(|| "on".to_string()),
            category: item.category.clone(),
        }
    }

    #[must_use]
    pub const fn is_popular(&self) -> bool {
        self.popular.is_some()
    }

    /// Validate the submission.
    ///
    /// # Errors
    ///
    /// Returns every failing field: missing name or description, a price
    /// that is not a non-negative number, a rating outside `0..=5`, or an
    /// image URL that is not http(s).
    pub fn validate(&self) -> Result<MenuItemDraft, FormErrors> {
        let mut errors = FormErrors::new();

        let name = non_blank(&self.name);
        if name.is_none() {
            errors.add("name", "Name is required");
        }

        let description = non_blank(&self.description);
        if description.is_none() {
            errors.add("description", "Description is required");
        }

        let price = match Price::parse(&self.price) {
            Ok(price) => Some(price),
            Err(e) => {
                errors.add("price", format!("Price must be a non-negative number ({e})"));
                None
            }
        };

        let rating = match non_blank(&self.rating) {
            None => Some(Decimal::ZERO),
            Some(raw) => match raw.parse::<Decimal>() {
                Ok(r) if r >= Decimal::ZERO && r <= MAX_RATING => Some(r),
                _ => {
                    errors.add("rating", "Rating must be between 0 and 5");
                    None
                }
            },
        };

        let image_url = non_blank(&self.image_url);
        if let Some(ref raw) = image_url
            && !is_http_url(raw)
        {
            errors.add("image_url", "Image URL must start with http:// or https://");
        }

        let category = non_blank(&self.category).unwrap_or_else(|| DEFAULT_CATEGORY.to_string());

        match (name, description, price, rating) {
            (Some(name), Some(description), Some(price), Some(rating)) if errors.is_empty() => {
                Ok(MenuItemDraft {
                    name,
                    description,
                    price,
                    image_url,
                    rating,
                    popular: self.is_popular(),
                    category,
                })
            }
            _ => Err(errors),
        }
    }
}

fn is_http_url(raw: &str) -> bool {
    Url::parse(raw).is_ok_and(|u| matches!(u.scheme(), "http" | "https") && u.host().is_some())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn input() -> MenuItemInput {
        MenuItemInput {
            name: "Flat White".to_string(),
            description: "Velvety microfoam over a double ristretto".to_string(),
            price: "4.25".to_string(),
            image_url: String::new(),
            rating: "4.7".to_string(),
            popular: Some("on".to_string()),
            category: String::new(),
        }
    }

    fn item(name: &str, image_url: Option<&str>) -> MenuItem {
        MenuItem {
            id: MenuItemId::generate(),
            name: name.to_string(),
            description: String::new(),
            price: Price::from_cents(350),
            image_url: image_url.map(String::from),
            rating: Decimal::new(48, 1),
            popular: false,
            category: DEFAULT_CATEGORY.to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_valid_input() {
        let draft = input().validate().unwrap();
        assert_eq!(draft.name, "Flat White");
        assert_eq!(draft.price, Price::from_cents(425));
        assert_eq!(draft.rating, Decimal::new(47, 1));
        assert!(draft.popular);
        assert_eq!(draft.category, "Coffee");
        assert_eq!(draft.image_url, None);
    }

    #[test]
    fn test_empty_rating_defaults_to_zero() {
        let mut form = input();
        form.rating = "  ".to_string();
        assert_eq!(form.validate().unwrap().rating, Decimal::ZERO);
    }

    #[test]
    fn test_rating_bounds() {
        let mut form = input();
        form.rating = "5".to_string();
        assert!(form.validate().is_ok());
        form.rating = "5.1".to_string();
        assert!(form.validate().unwrap_err().has("rating"));
        form.rating = "-0.5".to_string();
        assert!(form.validate().unwrap_err().has("rating"));
        form.rating = "great".to_string();
        assert!(form.validate().unwrap_err().has("rating"));
    }

    #[test]
    fn test_price_must_be_non_negative_number() {
        let mut form = input();
        form.price = "-1".to_string();
        assert!(form.validate().unwrap_err().has("price"));
        form.price = "free".to_string();
        assert!(form.validate().unwrap_err().has("price"));
        form.price = "0".to_string();
        assert_eq!(form.validate().unwrap().price, Price::ZERO);
    }

    #[test]
    fn test_required_fields_reported_together() {
        let form = MenuItemInput {
            price: "3".to_string(),
            ..MenuItemInput::default()
        };
        let errors = form.validate().unwrap_err();
        assert!(errors.has("name"));
        assert!(errors.has("description"));
        assert!(!errors.has("price"));
    }

    #[test]
    fn test_image_url_scheme() {
        let mut form = input();
        form.image_url = "javascript:alert(1)".to_string();
        assert!(form.validate().unwrap_err().has("image_url"));
        form.image_url = "https://cdn.sinocoffee.com/latte.jpg".to_string();
        assert_eq!(
            form.validate().unwrap().image_url.as_deref(),
            Some("https://cdn.sinocoffee.com/latte.jpg")
        );
    }

    #[test]
    fn test_fallback_images() {
        assert_eq!(fallback_image("Americano"), ESPRESSO_IMAGE);
        assert_eq!(fallback_image("Mocha"), CAPPUCCINO_IMAGE);
        assert_eq!(fallback_image("Macchiato"), LATTE_IMAGE);
        assert_eq!(fallback_image("Flat White"), COLD_BREW_IMAGE);
        assert_eq!(fallback_image("Pumpkin Spice"), ESPRESSO_IMAGE);
    }

    #[test]
    fn test_display_image_prefers_upload() {
        assert_eq!(item("Latte", None).display_image(), LATTE_IMAGE);
        assert_eq!(item("Latte", Some(" ")).display_image(), LATTE_IMAGE);
        assert_eq!(
            item("Latte", Some("https://img/x.jpg")).display_image(),
            "https://img/x.jpg"
        );
    }

    #[test]
    fn test_edit_form_roundtrip() {
        let original = item("Cappuccino", None);
        let draft = MenuItemInput::from_item(&original).validate().unwrap();
        assert_eq!(draft.price, original.price);
        assert_eq!(draft.rating, original.rating);
        assert!(!draft.popular);
    }

    #[test]
    fn test_cart_line_uses_display_image() {
        let line = item("Mocha", None).to_cart_line();
        assert_eq!(line.image.as_deref(), Some(CAPPUCCINO_IMAGE));
    }
}
