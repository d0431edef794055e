//! Home page route handler.
//!
//! The home page is a single scrolling page: hero, about, menu, coffee
//! stories, subscription plans, gallery and contact. The menu grid and the
//! gallery load as HTMX fragments.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::instrument;

use super::PageContext;
use super::blog::PostView;
use crate::content::HOME_POST_COUNT;
use crate::filters;
use crate::marketing::{
    self, BENEFITS, CONTACT_INFO, ContactInfo, GALLERY_FILTERS, GalleryImage, HIGHLIGHTS,
    Highlight, PLANS, Plan, SOCIAL_LINKS,
};
use crate::models::Toast;
use crate::state::AppState;

/// Query string of the home page.
#[derive(Debug, Default, Deserialize)]
pub struct HomeQuery {
    /// Set by the payment provider when the buyer backs out.
    #[serde(default)]
    pub canceled: Option<String>,
}

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/home.html")]
pub struct HomeTemplate {
    pub ctx: PageContext,
    pub highlights: &'static [Highlight],
    pub posts: Vec<PostView>,
    pub plans: &'static [Plan],
    pub benefits: &'static [Highlight],
    pub gallery: GalleryTemplate,
    pub contact_info: &'static [ContactInfo],
    pub social_links: &'static [(&'static str, &'static str)],
    /// Contact form is hidden when email delivery is not configured.
    pub contact_enabled: bool,
}

/// Gallery grid fragment template.
#[derive(Template, WebTemplate)]
#[template(path = "partials/gallery.html")]
pub struct GalleryTemplate {
    pub filter: &'static str,
    pub filters: &'static [(&'static str, &'static str)],
    pub images: Vec<&'static GalleryImage>,
}

impl GalleryTemplate {
    /// Gallery showing `filter` (unknown filters show everything).
    #[must_use]
    pub fn new(filter: Option<&str>) -> Self {
        let filter = marketing::gallery_filter(filter);
        Self {
            filter,
            filters: GALLERY_FILTERS,
            images: marketing::gallery(filter),
        }
    }

    /// Whether `id` is the selected tab.
    #[must_use]
    pub fn is_selected(&self, id: &str) -> bool {
        self.filter == id
    }
}

/// Gallery query string.
#[derive(Debug, Default, Deserialize)]
pub struct GalleryQuery {
    #[serde(default)]
    pub filter: Option<String>,
}

/// Display the home page.
#[instrument(skip(state, ctx))]
pub async fn home(
    State(state): State<AppState>,
    mut ctx: PageContext,
    Query(query): Query<HomeQuery>,
) -> impl IntoResponse {
    if query.canceled.is_some() && ctx.flash.is_none() {
        ctx.flash = Some(Toast::success(
            "Payment canceled",
            "Your cart is still here whenever you're ready.",
        ));
    }

    let posts = state
        .content()
        .get_recent_posts(HOME_POST_COUNT, None)
        .into_iter()
        .map(PostView::from)
        .collect();

    HomeTemplate {
        ctx,
        highlights: HIGHLIGHTS,
        posts,
        plans: PLANS,
        benefits: BENEFITS,
        gallery: GalleryTemplate::new(None),
        contact_info: CONTACT_INFO,
        social_links: SOCIAL_LINKS,
        contact_enabled: state.email().is_some(),
    }
}

/// Gallery grid for a filter tab (HTMX).
#[instrument]
pub async fn gallery(Query(query): Query<GalleryQuery>) -> GalleryTemplate {
    GalleryTemplate::new(query.filter.as_deref())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_gallery_fragment_filters() {
        let html = GalleryTemplate::new(Some("latte-art")).render().unwrap();
        assert!(html.contains("Heart Latte Art"));
        assert!(html.contains("Rosetta Design"));
        assert!(!html.contains("Cozy Corner"));
    }

    #[test]
    fn test_gallery_unknown_filter_shows_all() {
        let gallery = GalleryTemplate::new(Some("espresso"));
        assert_eq!(gallery.filter, "all");
        assert_eq!(gallery.images.len(), 6);
    }

    #[test]
    fn test_home_renders_sections() {
        let html = HomeTemplate {
            ctx: PageContext::default(),
            highlights: HIGHLIGHTS,
            posts: Vec::new(),
            plans: PLANS,
            benefits: BENEFITS,
            gallery: GalleryTemplate::new(None),
            contact_info: CONTACT_INFO,
            social_links: SOCIAL_LINKS,
            contact_enabled: true,
        }
        .render()
        .unwrap();
        assert!(html.contains("Premium Quality"));
        assert!(html.contains("Enthusiast"));
        assert!(html.contains("$34.99"));
        assert!(html.contains("Most Popular"));
        assert!(html.contains("hx-get=\"/menu\""));
        assert!(html.contains("hx-post=\"/contact\""));
    }

    #[test]
    fn test_contact_form_hidden_without_email() {
        let html = HomeTemplate {
            ctx: PageContext::default(),
            highlights: HIGHLIGHTS,
            posts: Vec::new(),
            plans: PLANS,
            benefits: BENEFITS,
            gallery: GalleryTemplate::new(None),
            contact_info: CONTACT_INFO,
            social_links: SOCIAL_LINKS,
            contact_enabled: false,
        }
        .render()
        .unwrap();
        assert!(!html.contains("hx-post=\"/contact\""));
    }
}
