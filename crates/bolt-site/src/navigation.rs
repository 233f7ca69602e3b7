//! Navigation bar built from the loaded store.
//!
//! Built once after ingestion and handed to the serving layer; it lists only
//! top-level pages.

use bolt_renderer::escape_html;

use crate::address::AddressScheme;
use crate::store::ArtifactStore;

/// Navigation link.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavItem {
    /// Display title.
    pub title: String,
    /// URL path with a leading slash.
    pub url: String,
}

/// Site navigation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Navigation {
    items: Vec<NavItem>,
}

impl Navigation {
    /// Build navigation from every top-level record in `store`.
    ///
    /// `index` maps to `/` titled "Home"; other pages are titled from their
    /// slug. Items are sorted by URL.
    #[must_use]
    pub fn build(store: &ArtifactStore, scheme: &AddressScheme) -> Self {
        let mut items: Vec<NavItem> = store
            .addresses()
            .iter()
            .filter_map(|address| {
                let url = scheme.url_for(address);
                let slug = url.strip_prefix('/')?;
                if slug.is_empty() || slug.contains('/') {
                    return None;
                }
                Some(if slug == "index" {
                    NavItem {
                        title: "Home".to_owned(),
                        url: "/".to_owned(),
                    }
                } else {
                    NavItem {
                        title: title_from_slug(slug),
                        url,
                    }
                })
            })
            .collect();
        items.sort_by(|a, b| a.url.cmp(&b.url));

        tracing::debug!(items = items.len(), "Navigation built");
        Self { items }
    }

    /// Drop items whose URL is served by something other than a page.
    ///
    /// A top-level `css.md` would otherwise link to `/css`, which the server
    /// answers with the stylesheet.
    #[must_use]
    pub fn without(mut self, reserved: &[&str]) -> Self {
        self.items.retain(|item| {
            let shadowed = reserved.contains(&item.url.as_str());
            if shadowed {
                tracing::warn!(url = %item.url, "Page shadowed by a built-in route");
            }
            !shadowed
        });
        self
    }

    /// Navigation links.
    #[must_use]
    pub fn items(&self) -> &[NavItem] {
        &self.items
    }

    /// Render as a `<nav>` element.
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut html = String::from("<nav><ul>");
        for item in &self.items {
            html.push_str("<li><a href=\"");
            html.push_str(&escape_html(&item.url));
            html.push_str("\">");
            html.push_str(&escape_html(&item.title));
            html.push_str("</a></li>");
        }
        html.push_str("</ul></nav>");
        html
    }
}

/// Display title for a page slug: "setup-guide" -> "Setup Guide".
pub fn title_from_slug(slug: &str) -> String {
    slug.split(['-', '_'])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}
