//! Static marketing content for the single-page home: about highlights,
//! subscription plans, the gallery and contact details.

use serde::Serialize;

// =============================================================================
// About
// =============================================================================

/// One of the four "why SinoCoffee" highlights.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Highlight {
    pub icon: &'static str,
    pub title: &'static str,
    pub description: &'static str,
}

pub const HIGHLIGHTS: &[Highlight] = &[
    Highlight {
        icon: "coffee",
        title: "Premium Quality",
        description: "We source the finest coffee beans from sustainable farms around the world, ensuring every cup meets our high standards.",
    },
    Highlight {
        icon: "heart",
        title: "Crafted with Love",
        description: "Every cup is prepared with passion and attention to detail by our skilled baristas who truly care about your experience.",
    },
    Highlight {
        icon: "leaf",
        title: "Sustainable Practices",
        description: "We are committed to ethical sourcing and environmental responsibility, supporting farmers and protecting our planet.",
    },
    Highlight {
        icon: "award",
        title: "Award Winning",
        description: "Recognized for excellence in coffee quality and customer service, SinoCoffee has won multiple industry awards.",
    },
];

// =============================================================================
// Subscription
// =============================================================================

/// A monthly coffee subscription tier.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Plan {
    pub name: &'static str,
    pub price: &'static str,
    pub period: &'static str,
    pub description: &'static str,
    pub features: &'static [&'static str],
    pub popular: bool,
}

pub const PLANS: &[Plan] = &[
    Plan {
        name: "Starter",
        price: "$19.99",
        period: "/month",
        description: "Perfect for casual coffee drinkers",
        features: &[
            "250g premium coffee beans",
            "Delivered monthly",
            "Free shipping",
            "Cancel anytime",
            "Coffee brewing guide",
        ],
        popular: false,
    },
    Plan {
        name: "Enthusiast",
        price: "$34.99",
        period: "/month",
        description: "For true coffee lovers",
        features: &[
            "500g premium coffee beans",
            "Delivered bi-weekly",
            "Free shipping",
            "Cancel anytime",
            "Coffee brewing guide",
            "Exclusive origin stories",
            "Early access to new blends",
        ],
        popular: true,
    },
    Plan {
        name: "Connoisseur",
        price: "$59.99",
        period: "/month",
        description: "Ultimate coffee experience",
        features: &[
            "1kg premium coffee beans",
            "Weekly delivery",
            "Free express shipping",
            "Cancel anytime",
            "Coffee brewing guide",
            "Exclusive origin stories",
            "Early access to new blends",
            "Virtual cupping sessions",
            "Personal coffee consultant",
        ],
        popular: false,
    },
];

/// Perks listed above the plan cards.
pub const BENEFITS: &[Highlight] = &[
    Highlight {
        icon: "coffee",
        title: "Freshly Roasted",
        description: "Beans roasted within 48 hours of delivery",
    },
    Highlight {
        icon: "truck",
        title: "Free Delivery",
        description: "Complimentary shipping on all subscriptions",
    },
    Highlight {
        icon: "calendar",
        title: "Flexible Schedule",
        description: "Pause, skip, or cancel anytime",
    },
];

// =============================================================================
// Gallery
// =============================================================================

/// A photo in the gallery grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GalleryImage {
    pub category: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub likes: u32,
    pub image: &'static str,
}

/// Filter tabs: `(id, label)`.
pub const GALLERY_FILTERS: &[(&str, &str)] = &[
    ("all", "All"),
    ("latte-art", "Latte Art"),
    ("cafe", "Café Life"),
    ("beans", "Coffee Beans"),
    ("brewing", "Brewing"),
];

pub const GALLERY: &[GalleryImage] = &[
    GalleryImage {
        category: "latte-art",
        title: "Heart Latte Art",
        description: "Perfect heart-shaped foam art",
        likes: 127,
        image: "/static/images/gallery/latte-art.jpg",
    },
    GalleryImage {
        category: "cafe",
        title: "Cozy Corner",
        description: "Our signature reading nook",
        likes: 89,
        image: "/static/images/gallery/cozy-corner.jpg",
    },
    GalleryImage {
        category: "beans",
        title: "Ethiopian Beans",
        description: "Premium single-origin beans",
        likes: 156,
        image: "/static/images/gallery/beans.jpg",
    },
    GalleryImage {
        category: "latte-art",
        title: "Rosetta Design",
        description: "Intricate leaf pattern foam",
        likes: 203,
        image: "/static/images/gallery/rosetta.jpg",
    },
    GalleryImage {
        category: "cafe",
        title: "Morning Light",
        description: "Golden hour at SinoCoffee",
        likes: 95,
        image: "/static/images/gallery/morning-light.jpg",
    },
    GalleryImage {
        category: "brewing",
        title: "Pour Over",
        description: "Precision brewing method",
        likes: 112,
        image: "/static/images/gallery/pour-over.jpg",
    },
];

/// Normalize a requested filter: unknown or blank values become `all`.
#[must_use]
pub fn gallery_filter(requested: Option<&str>) -> &'static str {
    let requested = requested.map(str::trim).unwrap_or_default();
    GALLERY_FILTERS
        .iter()
        .find(|(id, _)| *id == requested)
        .map_or("all", |(id, _)| id)
}

/// Gallery images for a filter tab, in display order.
#[must_use]
pub fn gallery(filter: &str) -> Vec<&'static GalleryImage> {
    match gallery_filter(Some(filter)) {
        "all" => GALLERY.iter().collect(),
        category => GALLERY.iter().filter(|img| img.category == category).collect(),
    }
}

// =============================================================================
// Contact
// =============================================================================

/// A block in the "Visit us" column.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ContactInfo {
    pub icon: &'static str,
    pub title: &'static str,
    pub details: &'static [&'static str],
}

pub const CONTACT_INFO: &[ContactInfo] = &[
    ContactInfo {
        icon: "map-pin",
        title: "Address",
        details: &["123 Coffee Street", "Downtown District", "City, State 12345"],
    },
    ContactInfo {
        icon: "phone",
        title: "Phone",
        details: &["+1 (555) 123-4567", "Call us anytime"],
    },
    ContactInfo {
        icon: "mail",
        title: "Email",
        details: &["hello@sinocoffee.com", "info@sinocoffee.com"],
    },
    ContactInfo {
        icon: "clock",
        title: "Hours",
        details: &["Mon-Fri: 6:00 AM - 9:00 PM", "Sat-Sun: 7:00 AM - 10:00 PM"],
    },
];

/// `(name, href)` of the social icons.
pub const SOCIAL_LINKS: &[(&str, &str)] = &[
    ("Instagram", "https://instagram.com/sinocoffee"),
    ("Facebook", "https://facebook.com/sinocoffee"),
    ("Twitter", "https://twitter.com/sinocoffee"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gallery_all_returns_everything() {
        assert_eq!(gallery("all").len(), 6);
    }

    #[test]
    fn test_gallery_by_category() {
        let latte = gallery("latte-art");
        assert_eq!(latte.len(), 2);
        assert!(latte.iter().all(|img| img.category == "latte-art"));
        assert_eq!(gallery("brewing")[0].title, "Pour Over");
    }

    #[test]
    fn test_unknown_gallery_filter_falls_back_to_all() {
        assert_eq!(gallery_filter(Some("sunsets")), "all");
        assert_eq!(gallery_filter(None), "all");
        assert_eq!(gallery_filter(Some(" cafe ")), "cafe");
        assert_eq!(gallery("sunsets").len(), GALLERY.len());
    }

    #[test]
    fn test_exactly_one_popular_plan() {
        let popular: Vec<_> = PLANS.iter().filter(|p| p.popular).collect();
        assert_eq!(popular.len(), 1);
        assert_eq!(popular[0].name, "Enthusiast");
        assert_eq!(popular[0].price, "$34.99");
    }

    #[test]
    fn test_every_image_has_a_filter_tab() {
        for img in GALLERY {
            assert!(GALLERY_FILTERS.iter().any(|(id, _)| *id == img.category));
        }
    }
}
