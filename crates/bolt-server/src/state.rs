//! Application state.
//!
//! Built once before the listener is bound and shared read-only by every
//! handler.

use std::sync::Arc;

use bolt_site::{AddressScheme, ArtifactStore, PageChrome};

/// Application state shared across all handlers.
pub(crate) struct AppState {
    /// Store populated by ingestion.
    pub(crate) store: Arc<ArtifactStore>,
    /// Stylesheet and header.
    pub(crate) chrome: Arc<PageChrome>,
    /// Pre-rendered `<nav>` element.
    pub(crate) navigation_html: String,
    /// Maps request paths to store addresses.
    pub(crate) scheme: AddressScheme,
    /// Application version for `ETag` computation.
    pub(crate) version: String,
}

#[cfg(test)]
impl AppState {
    /// State over an in-memory store with `content` as the address prefix.
    ///
    /// Pages with a `None` body are inserted but left unrendered.
    pub(crate) fn for_tests(pages: &[(&str, Option<&str>)], stylesheet: &str) -> Arc<Self> {
        let scheme = AddressScheme::with_prefix("content");
        let store = Arc::new(ArtifactStore::new());
        for (url, body) in pages {
            let address = scheme.address_for_url(url);
            store.insert(address.clone(), "source");
            if let Some(body) = body {
                store.set_rendered(&address, *body);
            }
        }
        let navigation_html = bolt_site::Navigation::build(&store, &scheme).to_html();

        Arc::new(Self {
            store,
            chrome: Arc::new(PageChrome::new(stylesheet, None)),
            navigation_html,
            scheme,
            version: "test".to_owned(),
        })
    }
}
