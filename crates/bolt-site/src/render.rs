//! Render hook used by the ingestion pipeline.
//!
//! The loader only knows the [`Render`] contract: source text in, rendered
//! text out, safe to call from several workers at once. [`MarkdownPage`] is
//! the implementation the server uses; tests pass plain closures.
//!
//! Shared chrome lives in [`PageChrome`], loaded once before ingestion starts
//! and never mutated afterwards, so workers can read it without locking.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bolt_renderer::MarkdownRenderer;

/// Transform from document source to rendered artifact.
///
/// Implementations must be pure with respect to concurrent calls: two
/// workers rendering different documents must not observe each other.
pub trait Render: Send + Sync {
    /// Render source text.
    fn render(&self, source: &str) -> String;
}

impl<F> Render for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn render(&self, source: &str) -> String {
        self(source)
    }
}

/// Error loading page chrome.
#[derive(Debug, thiserror::Error)]
pub enum ChromeError {
    /// Stylesheet could not be read.
    #[error("Failed to read stylesheet {}: {source}", path.display())]
    Stylesheet {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Site-wide chrome shared by every rendered page.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PageChrome {
    stylesheet: String,
    header: Option<String>,
}

impl PageChrome {
    /// Create chrome from in-memory values.
    #[must_use]
    pub fn new(stylesheet: impl Into<String>, header: Option<String>) -> Self {
        Self {
            stylesheet: stylesheet.into(),
            header: header.filter(|h| !h.trim().is_empty()),
        }
    }

    /// Load the stylesheet from disk.
    ///
    /// `None` yields an empty stylesheet.
    pub fn load(stylesheet: Option<&Path>, header: Option<String>) -> Result<Self, ChromeError> {
        let css = match stylesheet {
            Some(path) => std::fs::read_to_string(path).map_err(|source| {
                ChromeError::Stylesheet {
                    path: path.to_path_buf(),
                    source,
                }
            })?,
            None => String::new(),
        };
        tracing::debug!(
            stylesheet_bytes = css.len(),
            has_header = header.is_some(),
            "Page chrome loaded"
        );
        Ok(Self::new(css, header))
    }

    /// Stylesheet text served at `/css`.
    #[must_use]
    pub fn stylesheet(&self) -> &str {
        &self.stylesheet
    }

    /// Header HTML prepended to every page body.
    #[must_use]
    pub fn header(&self) -> Option<&str> {
        self.header.as_deref()
    }
}

/// Markdown renderer with page chrome.
#[derive(Clone, Debug)]
pub struct MarkdownPage {
    chrome: Arc<PageChrome>,
    gfm: bool,
}

impl MarkdownPage {
    /// Create a renderer over shared chrome. GFM extensions are enabled.
    #[must_use]
    pub fn new(chrome: Arc<PageChrome>) -> Self {
        Self { chrome, gfm: true }
    }

    /// Enable or disable GitHub Flavored Markdown extensions.
    #[must_use]
    pub fn with_gfm(mut self, enabled: bool) -> Self {
        self.gfm = enabled;
        self
    }

    /// Shared chrome.
    #[must_use]
    pub fn chrome(&self) -> &PageChrome {
        &self.chrome
    }
}

impl Render for MarkdownPage {
    fn render(&self, source: &str) -> String {
        let body = MarkdownRenderer::new()
            .with_gfm(self.gfm)
            .render_markdown(source);

        match self.chrome.header() {
            Some(header) => {
                let mut html = String::with_capacity(header.len() + body.len() + 1);
                html.push_str(header);
                html.push('\n');
                html.push_str(&body);
                html
            }
            None => body,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_closure_implements_render() {
        let upper = |s: &str| s.to_uppercase();
        assert_eq!(upper.render("abc"), "ABC");
    }

    #[test]
    fn test_markdown_page_renders_body() {
        let page = MarkdownPage::new(Arc::new(PageChrome::default()));
        assert_eq!(page.render("# A"), "<h1 id=\"a\">A</h1>");
    }

    #[test]
    fn test_markdown_page_prepends_header() {
        let chrome = PageChrome::new("", Some("<header>Docs</header>".to_owned()));
        let page = MarkdownPage::new(Arc::new(chrome));

        assert_eq!(
            page.render("Hello"),
            "<header>Docs</header>\n<div class=\"paragraph\"><p>Hello</p></div>"
        );
    }

    #[test]
    fn test_markdown_page_is_deterministic() {
        let page = MarkdownPage::new(Arc::new(PageChrome::default()));
        let source = "# Title\n\n- one\n- two\n\n| a | b |\n|---|---|\n| 1 | 2 |\n";
        assert_eq!(page.render(source), page.render(source));
    }

    #[test]
    fn test_blank_header_is_ignored() {
        let chrome = PageChrome::new("body {}", Some("   ".to_owned()));
        assert_eq!(chrome.header(), None);
        assert_eq!(chrome.stylesheet(), "body {}");
    }

    #[test]
    fn test_chrome_load_reads_stylesheet() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("styles.css");
        fs::write(&path, "h1 { color: red; }").unwrap();

        let chrome = PageChrome::load(Some(&path), None).unwrap();

        assert_eq!(chrome.stylesheet(), "h1 { color: red; }");
    }

    #[test]
    fn test_chrome_load_without_stylesheet() {
        let chrome = PageChrome::load(None, None).unwrap();
        assert_eq!(chrome.stylesheet(), "");
    }

    #[test]
    fn test_chrome_load_missing_stylesheet() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("missing.css");

        let err = PageChrome::load(Some(&path), None).unwrap_err();

        assert!(matches!(err, ChromeError::Stylesheet { .. }));
        assert!(err.to_string().contains("missing.css"));
    }
}
