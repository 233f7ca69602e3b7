//! Ingestion pipeline and artifact store for Bolt.
//!
//! This crate provides:
//! - [`ArtifactStore`]: concurrency-safe address to [`Document`] table
//! - [`Loader`]: walks a source directory and renders every markdown file
//!   on a fixed pool of worker threads
//! - [`Render`]: the render hook, with [`MarkdownPage`] as the HTML
//!   implementation over shared [`PageChrome`]
//! - [`Navigation`]: top-level page links built from the loaded store
//!
//! # Quick Start
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::path::Path;
//! use std::sync::Arc;
//! use bolt_site::{AddressScheme, ArtifactStore, Loader, MarkdownPage, Navigation, PageChrome};
//!
//! let chrome = Arc::new(PageChrome::load(Some(Path::new("styles.css")), None)?);
//! let store = Arc::new(ArtifactStore::new());
//!
//! let base_dir = Path::new("content");
//! Loader::new(Arc::clone(&store)).load(base_dir, &MarkdownPage::new(chrome))?;
//!
//! let page = store.get("content/about");
//! let nav = Navigation::build(&store, &AddressScheme::for_base_dir(base_dir));
//! # Ok(())
//! # }
//! ```

mod address;
mod loader;
mod navigation;
mod render;
mod store;

pub use address::{AddressScheme, SOURCE_SUFFIX, derive_address};
pub use loader::{
    DEFAULT_QUEUE_CAPACITY, DEFAULT_WORKERS, IngestFailure, IngestPolicy, LoadError, LoadReport,
    Loader, Outcome,
};
pub use navigation::{NavItem, Navigation, title_from_slug};
pub use render::{ChromeError, MarkdownPage, PageChrome, Render};
pub use store::{ArtifactStore, Document};
