//! Markdown blog posts.
//!
//! Posts are loaded from `content/blog/*.md` at startup. Each file starts with
//! YAML frontmatter:
//!
//! ```markdown
//! ---
//! title: The Art of Pour Over Coffee
//! excerpt: Precision and patience in every cup.
//! author: Maria Chen
//! published_at: 2024-03-15
//! category: Brewing
//! ---
//! ```
//!
//! A `YYYY-MM-DD-` filename prefix is stripped from the slug.

use chrono::NaiveDate;
use comrak::{Options, markdown_to_html};
use gray_matter::{Matter, ParsedEntity, engine::YAML};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;

/// Words read per minute when estimating reading time.
const WORDS_PER_MINUTE: usize = 200;

/// Posts shown in the home page "Coffee Stories" section.
pub const HOME_POST_COUNT: usize = 3;

/// Metadata for blog posts
#[derive(Debug, Clone, Deserialize)]
pub struct PostMeta {
    pub title: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub author: Option<String>,
    pub published_at: NaiveDate,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub draft: bool,
}

fn default_category() -> String {
    "Coffee".to_string()
}

/// A rendered blog post with metadata and HTML content
#[derive(Debug, Clone)]
pub struct Post {
    pub slug: String,
    pub meta: PostMeta,
    pub content_html: String,
    pub reading_time_minutes: u32,
}

impl Post {
    /// Publication date as shown on cards, e.g. `March 15, 2024`.
    #[must_use]
    pub fn date_label(&self) -> String {
        self.meta.published_at.format("%B %-d, %Y").to_string()
    }
}

/// Content store that holds all loaded posts in memory, newest first.
#[derive(Debug, Clone, Default)]
pub struct ContentStore {
    posts: Arc<Vec<Post>>,
}

impl ContentStore {
    /// Load all content from the filesystem.
    ///
    /// A missing `blog` directory yields an empty store. Files that fail to
    /// parse are logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the blog directory exists but cannot be read.
    pub fn load(content_dir: &Path) -> Result<Self, ContentError> {
        let dir = content_dir.join("blog");
        let mut posts = Vec::new();

        if !dir.exists() {
            tracing::info!("Blog directory does not exist yet: {:?}", dir);
            return Ok(Self::default());
        }

        let entries = std::fs::read_dir(&dir).map_err(|e| ContentError::Io(e.to_string()))?;

        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "md") {
                let loaded = std::fs::read_to_string(&path)
                    .map_err(|e| ContentError::Io(e.to_string()))
                    .and_then(|raw| parse_post(&slug_from_path(&path)?, &raw));
                match loaded {
                    Ok(post) => {
                        tracing::info!("Loaded post: {}", post.slug);
                        posts.push(post);
                    }
                    Err(e) => {
                        tracing::error!("Failed to load post {:?}: {}", path, e);
                    }
                }
            }
        }

        Ok(Self::from_posts(posts))
    }

    /// Build a store from already-parsed posts.
    #[must_use]
    pub fn from_posts(mut posts: Vec<Post>) -> Self {
        posts.sort_by(|a, b| {
            b.meta
                .published_at
                .cmp(&a.meta.published_at)
                .then_with(|| a.slug.cmp(&b.slug))
        });
        Self {
            posts: Arc::new(posts),
        }
    }

    /// Get a published blog post by slug
    #[must_use]
    pub fn get_post(&self, slug: &str) -> Option<&Post> {
        self.posts.iter().find(|p| p.slug == slug && !p.meta.draft)
    }

    /// Get all published blog posts (excludes drafts)
    pub fn get_published_posts(&self) -> impl Iterator<Item = &Post> {
        self.posts.iter().filter(|p| !p.meta.draft)
    }

    /// Get recent published posts, optionally excluding a specific slug
    #[must_use]
    pub fn get_recent_posts(&self, limit: usize, exclude_slug: Option<&str>) -> Vec<&Post> {
        self.get_published_posts()
            .filter(|p| exclude_slug.is_none_or(|s| p.slug != s))
            .take(limit)
            .collect()
    }
}

fn slug_from_path(path: &Path) -> Result<String, ContentError> {
    let filename = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| ContentError::Parse("Invalid filename".to_string()))?;
    Ok(strip_date_prefix(filename).to_string())
}

/// `2024-03-15-pour-over` becomes `pour-over`.
fn strip_date_prefix(filename: &str) -> &str {
    let bytes = filename.as_bytes();
    let dated = bytes.len() > 11
        && bytes.get(4) == Some(&b'-')
        && bytes.get(7) == Some(&b'-')
        && bytes.get(10) == Some(&b'-')
        && bytes.iter().take(4).all(u8::is_ascii_digit);
    if dated { filename.get(11..).unwrap_or(filename) } else { filename }
}

/// Parse one post from its raw file contents.
///
/// # Errors
///
/// Returns `ContentError::Parse` if the frontmatter is missing or invalid.
pub fn parse_post(slug: &str, raw: &str) -> Result<Post, ContentError> {
    let matter = Matter::<YAML>::new();
    let parsed: ParsedEntity<PostMeta> = matter
        .parse(raw)
        .map_err(|e| ContentError::Parse(format!("Failed to parse frontmatter: {e}")))?;
    let meta = parsed
        .data
        .ok_or_else(|| ContentError::Parse("Missing frontmatter".to_string()))?;

    Ok(Post {
        slug: slug.to_string(),
        meta,
        content_html: render_markdown(&parsed.content),
        reading_time_minutes: reading_time_minutes(&parsed.content),
    })
}

/// Estimated minutes to read `text`, never less than one.
#[must_use]
pub fn reading_time_minutes(text: &str) -> u32 {
    let words = text.split_whitespace().count();
    let minutes = words.div_ceil(WORDS_PER_MINUTE).max(1);
    u32::try_from(minutes).unwrap_or(u32::MAX)
}

/// Render markdown to HTML with GitHub Flavored Markdown support.
fn render_markdown(content: &str) -> String {
    let mut options = Options::default();

    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.header_ids = Some(String::new());

    // Posts are authored in-repo
    options.render.r#unsafe = true;

    markdown_to_html(content, &options)
}

/// Content loading errors
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn post(slug: &str, date: &str, draft: bool) -> Post {
        let raw = format!(
            "---\ntitle: {slug}\nexcerpt: x\npublished_at: {date}\ndraft: {draft}\n---\nHello **world**\n"
        );
        parse_post(slug, &raw).unwrap()
    }

    #[test]
    fn test_parse_post() {
        let raw = "---\ntitle: Cold Brew vs Iced Coffee\nexcerpt: Two drinks.\nauthor: Sarah Kim\npublished_at: 2024-03-05\ncategory: Tips\n---\n# Steeping\n\nSlow and cold.\n";
        let post = parse_post("cold-brew", raw).unwrap();
        assert_eq!(post.meta.title, "Cold Brew vs Iced Coffee");
        assert_eq!(post.meta.category, "Tips");
        assert_eq!(post.date_label(), "March 5, 2024");
        assert!(post.content_html.contains("<h1"));
        assert_eq!(post.reading_time_minutes, 1);
    }

    #[test]
    fn test_missing_frontmatter_is_error() {
        assert!(parse_post("x", "just text").is_err());
    }

    #[test]
    fn test_reading_time() {
        assert_eq!(reading_time_minutes(""), 1);
        assert_eq!(reading_time_minutes(&"word ".repeat(200)), 1);
        assert_eq!(reading_time_minutes(&"word ".repeat(201)), 2);
        assert_eq!(reading_time_minutes(&"word ".repeat(1000)), 5);
    }

    #[test]
    fn test_posts_sorted_and_drafts_hidden() {
        let store = ContentStore::from_posts(vec![
            post("old", "2024-01-01", false),
            post("draft", "2024-06-01", true),
            post("new", "2024-05-01", false),
            post("mid", "2024-03-01", false),
            post("oldest", "2023-01-01", false),
        ]);
        let slugs: Vec<&str> = store
            .get_recent_posts(HOME_POST_COUNT, None)
            .iter()
            .map(|p| p.slug.as_str())
            .collect();
        assert_eq!(slugs, ["new", "mid", "old"]);
        assert!(store.get_post("draft").is_none());
        assert!(store.get_post("mid").is_some());
        assert_eq!(store.get_recent_posts(10, Some("new")).len(), 3);
    }

    #[test]
    fn test_strip_date_prefix() {
        assert_eq!(strip_date_prefix("2024-03-15-pour-over"), "pour-over");
        assert_eq!(strip_date_prefix("pour-over-guide"), "pour-over-guide");
        assert_eq!(strip_date_prefix("abcd-ef-gh-ij"), "abcd-ef-gh-ij");
    }
}
