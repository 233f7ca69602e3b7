//! Markdown to HTML renderer for Bolt.
//!
//! This crate provides [`MarkdownRenderer`], an event-driven renderer on top of
//! `pulldown-cmark` that produces semantic HTML5 with:
//! - Paragraphs wrapped in `<div class="paragraph">` blocks
//! - Unique anchor ids on headings
//!
//! # Example
//!
//! ```
//! use bolt_renderer::MarkdownRenderer;
//!
//! let html = MarkdownRenderer::new().render_markdown("# Hello\n\n**Bold** text");
//!
//! assert!(html.starts_with(r#"<h1 id="hello">Hello</h1>"#));
//! assert!(html.contains("<strong>Bold</strong>"));
//! ```

mod renderer;
mod state;
mod util;

pub use renderer::MarkdownRenderer;
pub use state::escape_html;
pub use util::slugify;
