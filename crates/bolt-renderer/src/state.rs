//! Render state tracking and HTML escaping.

use std::collections::HashMap;

use crate::util::slugify;

/// Escape text for safe inclusion in HTML content and attribute values.
///
/// # Examples
///
/// ```
/// use bolt_renderer::escape_html;
///
/// assert_eq!(escape_html("<a href=\"x\">&</a>"), "&lt;a href=&quot;x&quot;&gt;&amp;&lt;/a&gt;");
/// ```
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Heading currently being collected.
#[derive(Debug)]
struct ActiveHeading {
    level: u8,
    text: String,
    html: String,
}

/// Completed heading ready to be written.
#[derive(Debug)]
pub(crate) struct CompletedHeading {
    pub(crate) level: u8,
    pub(crate) id: String,
    pub(crate) html: String,
}

/// Tracks headings for anchor generation.
///
/// Heading content is buffered until the closing tag because the anchor id
/// depends on the full heading text.
#[derive(Debug, Default)]
pub(crate) struct HeadingState {
    active: Option<ActiveHeading>,
    used_ids: HashMap<String, usize>,
}

impl HeadingState {
    pub(crate) fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub(crate) fn start_heading(&mut self, level: u8) {
        self.active = Some(ActiveHeading {
            level,
            text: String::new(),
            html: String::new(),
        });
    }

    /// Append plain text (used for the anchor id).
    pub(crate) fn push_text(&mut self, text: &str) {
        if let Some(heading) = &mut self.active {
            heading.text.push_str(text);
        }
    }

    /// Append rendered HTML for the heading body.
    pub(crate) fn push_html(&mut self, html: &str) {
        if let Some(heading) = &mut self.active {
            heading.html.push_str(html);
        }
    }

    /// Finish the active heading, assigning an id unique within the document.
    pub(crate) fn complete_heading(&mut self) -> Option<CompletedHeading> {
        let heading = self.active.take()?;
        let id = self.unique_id(heading.text.trim());

        Some(CompletedHeading {
            level: heading.level,
            id,
            html: heading.html,
        })
    }

    fn unique_id(&mut self, text: &str) -> String {
        let mut base = slugify(text);
        if base.is_empty() {
            base.push_str("section");
        }

        let count = self.used_ids.entry(base.clone()).or_insert(0);
        let id = if *count == 0 {
            base
        } else {
            format!("{base}-{count}")
        };
        *count += 1;
        id
    }
}
