//! Blog route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use tracing::instrument;

use super::PageContext;
use crate::content::Post;
use crate::error::{AppError, Result};
use crate::filters;
use crate::state::AppState;

/// Post view for templates.
#[derive(Clone)]
pub struct PostView {
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    pub author: Option<String>,
    pub date_label: String,
    pub category: String,
    pub image: Option<String>,
    pub content_html: String,
    pub reading_time_minutes: u32,
}

impl From<&Post> for PostView {
    fn from(post: &Post) -> Self {
        Self {
            slug: post.slug.clone(),
            title: post.meta.title.clone(),
            excerpt: post.meta.excerpt.clone(),
            author: post.meta.author.clone(),
            date_label: post.date_label(),
            category: post.meta.category.clone(),
            image: post.meta.image.clone(),
            content_html: post.content_html.clone(),
            reading_time_minutes: post.reading_time_minutes,
        }
    }
}

/// One step of the breadcrumb trail.
#[derive(Clone)]
pub struct BreadcrumbItem {
    pub name: String,
    pub url: Option<String>,
}

/// Blog index page template.
#[derive(Template, WebTemplate)]
#[template(path = "blog/index.html")]
pub struct BlogIndexTemplate {
    pub ctx: PageContext,
    pub posts: Vec<PostView>,
}

/// Blog post detail template.
#[derive(Template, WebTemplate)]
#[template(path = "blog/show.html")]
pub struct BlogShowTemplate {
    pub ctx: PageContext,
    pub post: PostView,
    pub recent_posts: Vec<PostView>,
    /// Base URL for the canonical link.
    pub base_url: String,
    pub breadcrumbs: Vec<BreadcrumbItem>,
}

/// Number of recent posts to show below a post.
const RECENT_POSTS_COUNT: usize = 3;

/// Display the blog index page with all published posts.
#[instrument(skip(state, ctx))]
pub async fn index(State(state): State<AppState>, ctx: PageContext) -> impl IntoResponse {
    let posts: Vec<PostView> = state
        .content()
        .get_published_posts()
        .map(PostView::from)
        .collect();
    BlogIndexTemplate { ctx, posts }
}

/// Display a single blog post by slug.
///
/// # Errors
///
/// Returns 404 if the post doesn't exist or is a draft.
#[instrument(skip(state, ctx))]
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    ctx: PageContext,
) -> Result<impl IntoResponse> {
    let post = state
        .content()
        .get_post(&slug)
        .ok_or_else(|| AppError::NotFound(format!("post {slug}")))?;

    let recent_posts: Vec<PostView> = state
        .content()
        .get_recent_posts(RECENT_POSTS_COUNT, Some(&slug))
        .into_iter()
        .map(PostView::from)
        .collect();

    let post_view = PostView::from(post);

    let breadcrumbs = vec![
        BreadcrumbItem {
            name: "Home".to_string(),
            url: Some("/".to_string()),
        },
        BreadcrumbItem {
            name: "Blog".to_string(),
            url: Some("/blog".to_string()),
        },
        BreadcrumbItem {
            name: post_view.title.clone(),
            url: None,
        },
    ];

    Ok(BlogShowTemplate {
        ctx,
        post: post_view,
        recent_posts,
        base_url: state.config().base_url.clone(),
        breadcrumbs,
    })
}
