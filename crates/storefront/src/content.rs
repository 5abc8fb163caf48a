//! Markdown content pages (about, FAQ, legal).
//!
//! Pages are loaded from `<content_dir>/pages/*.md` once at startup. Each
//! file starts with YAML frontmatter:
//!
//! ```markdown
//! ---
//! title: Shipping Policy
//! description: How and when orders ship
//! updated_at: 2026-03-01
//! ---
//!
//! Orders placed before 2pm ship the same day...
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDate;
use comrak::{Options, markdown_to_html};
use gray_matter::{Matter, ParsedEntity, engine::YAML};
use serde::Deserialize;

/// Frontmatter of a content page.
#[derive(Debug, Clone, Deserialize)]
pub struct PageMeta {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub updated_at: Option<NaiveDate>,
}

/// A rendered page.
#[derive(Debug, Clone)]
pub struct Page {
    pub slug: String,
    pub meta: PageMeta,
    pub content_html: String,
}

/// All content pages, keyed by slug.
#[derive(Debug, Clone, Default)]
pub struct ContentStore {
    pages: Arc<HashMap<String, Page>>,
}

impl ContentStore {
    /// Load every page under `content_dir/pages`.
    ///
    /// A missing directory yields an empty store. Files that fail to parse
    /// are logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the pages directory exists but cannot be read.
    pub fn load(content_dir: &Path) -> Result<Self, ContentError> {
        let dir = content_dir.join("pages");
        let mut pages = HashMap::new();

        if !dir.exists() {
            tracing::warn!(dir = %dir.display(), "Pages directory does not exist");
            return Ok(Self::default());
        }

        let entries = std::fs::read_dir(&dir).map_err(|e| ContentError::Io(e.to_string()))?;

        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "md") {
                match Self::load_page(&path) {
                    Ok(page) => {
                        tracing::debug!(slug = %page.slug, "Loaded page");
                        pages.insert(page.slug.clone(), page);
                    }
                    Err(e) => {
                        tracing::error!(path = %path.display(), error = %e, "Failed to load page");
                    }
                }
            }
        }

        tracing::info!(count = pages.len(), "Content pages loaded");
        Ok(Self {
            pages: Arc::new(pages),
        })
    }

    fn load_page(path: &Path) -> Result<Page, ContentError> {
        let content = std::fs::read_to_string(path).map_err(|e| ContentError::Io(e.to_string()))?;

        let slug = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| ContentError::Parse("Invalid filename".to_string()))?
            .to_string();

        parse_page(slug, &content)
    }

    /// Get a page by slug.
    #[must_use]
    pub fn get_page(&self, slug: &str) -> Option<&Page> {
        self.pages.get(slug)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

/// Parse frontmatter and render the markdown body.
fn parse_page(slug: String, source: &str) -> Result<Page, ContentError> {
    let matter = Matter::<YAML>::new();
    let parsed: ParsedEntity<PageMeta> = matter
        .parse(source)
        .map_err(|e| ContentError::Parse(format!("Failed to parse frontmatter: {e}")))?;
    let meta = parsed
        .data
        .ok_or_else(|| ContentError::Parse("Missing frontmatter".to_string()))?;

    Ok(Page {
        slug,
        meta,
        content_html: render_markdown(&parsed.content),
    })
}

/// Render markdown to HTML with the GFM extensions pages use.
fn render_markdown(content: &str) -> String {
    let mut options = Options::default();
    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.header_ids = Some(String::new());

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

    #[test]
    fn test_parse_page_reads_frontmatter() {
        let page = parse_page(
            "returns".to_string(),
            "---\ntitle: Returns\ndescription: Send it back\nupdated_at: 2026-01-15\n---\n\n# Returns\n\nWithin **30 days**.\n",
        )
        .unwrap();

        assert_eq!(page.meta.title, "Returns");
        assert_eq!(page.meta.description.as_deref(), Some("Send it back"));
        assert_eq!(
            page.meta.updated_at,
            NaiveDate::from_ymd_opt(2026, 1, 15)
        );
        assert!(page.content_html.contains("<strong>30 days</strong>"));
    }

    #[test]
    fn test_parse_page_requires_frontmatter() {
        assert!(parse_page("x".to_string(), "# No frontmatter").is_err());
    }

    #[test]
    fn test_raw_html_is_not_rendered() {
        let page = parse_page(
            "x".to_string(),
            "---\ntitle: X\n---\n\n<script>alert(1)</script>\n",
        )
        .unwrap();
        assert!(!page.content_html.contains("<script>"));
    }

    #[test]
    fn test_load_bundled_pages() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("content");
        let store = ContentStore::load(&dir).unwrap();
        for slug in ["about", "contact", "faq", "privacy", "terms", "shipping", "returns"] {
            assert!(store.get_page(slug).is_some(), "missing page {slug}");
        }
    }

    #[test]
    fn test_missing_dir_is_empty() {
        let store = ContentStore::load(Path::new("/nonexistent/content")).unwrap();
        assert!(store.is_empty());
    }
}
