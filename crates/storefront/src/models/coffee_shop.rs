//! Coffee-shop locations and the map search filter.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use sinocoffee_core::CoffeeShopId;

/// Specialty filter options shown on the locations page: `(value, label)`.
pub const SPECIALTIES: &[(&str, &str)] = &[
    ("all", "All Specialties"),
    ("single origin", "Single Origin"),
    ("espresso blends", "Espresso Blends"),
    ("french roast", "French Roast"),
    ("dark roast", "Dark Roast"),
    ("cold brew", "Cold Brew"),
];

/// A physical coffee shop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CoffeeShop {
    pub id: CoffeeShopId,
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub phone: Option<String>,
    pub hours: Option<String>,
    pub rating: Decimal,
    pub image_url: Option<String>,
    pub description: Option<String>,
    pub specialty: Option<String>,
}

impl CoffeeShop {
    /// Google Maps driving directions to this shop.
    #[must_use]
    pub fn directions_url(&self) -> String {
        format!(
            "https://www.google.com/maps/dir/?api=1&destination={},{}",
            self.latitude, self.longitude
        )
    }

    #[must_use]
    pub fn rating_label(&self) -> String {
        format!("{:.1}", self.rating.round_dp(1))
    }
}

/// Search box and specialty dropdown of the locations page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ShopFilter {
    #[serde(default, rename = "q")]
    pub query: String,
    #[serde(default)]
    pub specialty: String,
}

impl ShopFilter {
    /// Whether `shop` passes both the text search and the specialty filter.
    #[must_use]
    pub fn matches(&self, shop: &CoffeeShop) -> bool {
        self.matches_query(shop) && self.matches_specialty(shop)
    }

    /// Keep matching shops, preserving order.
    #[must_use]
    pub fn apply<'a>(&self, shops: &'a [CoffeeShop]) -> Vec<&'a CoffeeShop> {
        shops.iter().filter(|shop| self.matches(shop)).collect()
    }

    /// Selected specialty, with blank treated as `all`.
    #[must_use]
    pub fn selected_specialty(&self) -> &str {
        let trimmed = self.specialty.trim();
        if trimmed.is_empty() { "all" } else { trimmed }
    }

    fn matches_query(&self, shop: &CoffeeShop) -> bool {
        let needle = self.query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        shop.name.to_lowercase().contains(&needle)
            || shop.address.to_lowercase().contains(&needle)
            || shop
                .specialty
                .as_deref()
                .is_some_and(|s| s.to_lowercase().contains(&needle))
    }

    fn matches_specialty(&self, shop: &CoffeeShop) -> bool {
        let selected = self.selected_specialty();
        if selected.eq_ignore_ascii_case("all") {
            return true;
        }
        shop.specialty
            .as_deref()
            .is_some_and(|s| s.to_lowercase() == selected.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shop(name: &str, address: &str, specialty: Option<&str>) -> CoffeeShop {
        CoffeeShop {
            id: CoffeeShopId::generate(),
            name: name.to_string(),
            address: address.to_string(),
            latitude: 40.7128,
            longitude: -74.006,
            phone: None,
            hours: None,
            rating: Decimal::new(45, 1),
            image_url: None,
            description: None,
            specialty: specialty.map(String::from),
        }
    }

    fn shops() -> Vec<CoffeeShop> {
        vec![
            shop("SinoCoffee Downtown", "123 Coffee Street", Some("Single Origin")),
            shop("Bean There", "9 Harbor Ave", Some("Cold Brew")),
            shop("Roastery", "55 Elm Road", None),
        ]
    }

    fn filter(query: &str, specialty: &str) -> ShopFilter {
        ShopFilter {
            query: query.to_string(),
            specialty: specialty.to_string(),
        }
    }

    #[test]
    fn test_empty_filter_keeps_everything() {
        assert_eq!(ShopFilter::default().apply(&shops()).len(), 3);
        assert_eq!(filter("", "all").apply(&shops()).len(), 3);
    }

    #[test]
    fn test_query_is_case_insensitive_across_fields() {
        let all = shops();
        assert_eq!(filter("DOWNTOWN", "").apply(&all)[0].name, "SinoCoffee Downtown");
        assert_eq!(filter("harbor", "").apply(&all)[0].name, "Bean There");
        assert_eq!(filter("cold", "").apply(&all)[0].name, "Bean There");
        assert!(filter("nothing here", "").apply(&all).is_empty());
    }

    #[test]
    fn test_specialty_is_exact_match() {
        let all = shops();
        let hits = filter("", "single origin").apply(&all);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "SinoCoffee Downtown");
        assert!(filter("", "single").apply(&all).is_empty());
    }

    #[test]
    fn test_query_and_specialty_combine() {
        let all = shops();
        assert!(filter("harbor", "single origin").apply(&all).is_empty());
        assert_eq!(filter("bean", "cold brew").apply(&all).len(), 1);
    }

    #[test]
    fn test_directions_url() {
        let s = shop("A", "B", None);
        assert_eq!(
            s.directions_url(),
            "https://www.google.com/maps/dir/?api=1&destination=40.7128,-74.006"
        );
    }
}
