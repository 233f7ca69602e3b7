//! In-memory artifact store.
//!
//! Maps a document address to its [`Document`] record: the raw source text
//! read at ingestion time and, once a render worker has finished, the
//! rendered HTML.
//!
//! # Thread Safety
//!
//! The whole table sits behind a single `RwLock`. Writers hold the lock only
//! for the duration of one map mutation and readers only for one lookup, so
//! render work never runs under the lock. Text is shared through `Arc<str>`,
//! which keeps [`ArtifactStore::get`] a cheap clone and makes a rendered value
//! visible either completely or not at all.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Stored record for one ingested document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Document {
    /// Logical address (e.g., "content/guide/setup").
    pub address: String,
    /// Raw source text as read from disk.
    pub source: Arc<str>,
    /// Rendered artifact. `None` until the render for this address completes.
    pub rendered: Option<Arc<str>>,
}

impl Document {
    /// Whether the render for this record has completed.
    #[must_use]
    pub fn is_rendered(&self) -> bool {
        self.rendered.is_some()
    }
}

/// Concurrency-safe address to [`Document`] table.
///
/// Created empty, populated by an ingestion cycle and read by the serving
/// layer afterwards.
#[derive(Debug, Default)]
pub struct ArtifactStore {
    documents: RwLock<HashMap<String, Document>>,
}

impl ArtifactStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record with no rendered value, replacing any existing record.
    pub fn insert(&self, address: impl Into<String>, source: impl Into<Arc<str>>) {
        let address = address.into();
        let document = Document {
            address: address.clone(),
            source: source.into(),
            rendered: None,
        };
        self.write().insert(address, document);
    }

    /// Store the rendered artifact for an address.
    ///
    /// A missing address is not an error: the record was withdrawn or never
    /// inserted, so the value is dropped. Returns whether the record existed.
    pub fn set_rendered(&self, address: &str, rendered: impl Into<Arc<str>>) -> bool {
        let mut documents = self.write();
        if let Some(document) = documents.get_mut(address) {
            document.rendered = Some(rendered.into());
            true
        } else {
            tracing::debug!(address, "Dropping render for missing record");
            false
        }
    }

    /// Get the current record for an address.
    #[must_use]
    pub fn get(&self, address: &str) -> Option<Document> {
        self.read().get(address).cloned()
    }

    /// Check whether an address has a record.
    #[must_use]
    pub fn contains(&self, address: &str) -> bool {
        self.read().contains_key(address)
    }

    /// Withdraw a record.
    ///
    /// Not part of normal ingestion; a render task whose record is gone is
    /// skipped by the worker that picks it up.
    pub fn remove(&self, address: &str) -> Option<Document> {
        self.write().remove(address)
    }

    /// Drop every record.
    pub fn clear(&self) {
        self.write().clear();
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Whether the store holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// All addresses, sorted.
    #[must_use]
    pub fn addresses(&self) -> Vec<String> {
        let mut addresses: Vec<String> = self.read().keys().cloned().collect();
        addresses.sort_unstable();
        addresses
    }

    /// Clone of every record, sorted by address.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Document> {
        let mut documents: Vec<Document> = self.read().values().cloned().collect();
        documents.sort_unstable_by(|a, b| a.address.cmp(&b.address));
        documents
    }

    // Records are replaced as whole values, so a panic in another thread
    // cannot leave one half-written and a poisoned lock is still usable.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Document>> {
        self.documents.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Document>> {
        self.documents.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use pretty_assertions::assert_eq;
    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(ArtifactStore: Send, Sync);

    #[test]
    fn test_insert_and_get() {
        let store = ArtifactStore::new();
        store.insert("content/a", "# A");

        let doc = store.get("content/a").unwrap();
        assert_eq!(doc.address, "content/a");
        assert_eq!(&*doc.source, "# A");
        assert_eq!(doc.rendered, None);
        assert!(!doc.is_rendered());
    }

    #[test]
    fn test_get_missing() {
        let store = ArtifactStore::new();
        assert!(store.get("content/missing").is_none());
        assert!(!store.contains("content/missing"));
    }

    #[test]
    fn test_set_rendered() {
        let store = ArtifactStore::new();
        store.insert("content/a", "# A");

        assert!(store.set_rendered("content/a", "<h1>A</h1>"));

        let doc = store.get("content/a").unwrap();
        assert_eq!(doc.rendered.as_deref(), Some("<h1>A</h1>"));
    }

    #[test]
    fn test_set_rendered_missing_is_noop() {
        let store = ArtifactStore::new();
        assert!(!store.set_rendered("content/ghost", "<p>boo</p>"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_insert_overwrites_and_resets_render() {
        let store = ArtifactStore::new();
        store.insert("content/a", "# A");
        store.set_rendered("content/a", "<h1>A</h1>");

        store.insert("content/a", "# A2");

        let doc = store.get("content/a").unwrap();
        assert_eq!(&*doc.source, "# A2");
        assert_eq!(doc.rendered, None);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let store = ArtifactStore::new();
        store.insert("content/a", "# A");
        let before = store.get("content/a").unwrap();

        store.set_rendered("content/a", "<h1>A</h1>");

        assert_eq!(before.rendered, None);
        assert!(store.get("content/a").unwrap().is_rendered());
    }

    #[test]
    fn test_addresses_sorted() {
        let store = ArtifactStore::new();
        store.insert("content/b", "b");
        store.insert("content/a", "a");
        store.insert("content/c/d", "d");

        assert_eq!(
            store.addresses(),
            vec!["content/a", "content/b", "content/c/d"]
        );
        let snapshot: Vec<_> = store.snapshot().into_iter().map(|d| d.address).collect();
        assert_eq!(snapshot, store.addresses());
    }

    #[test]
    fn test_remove_and_clear() {
        let store = ArtifactStore::new();
        store.insert("content/a", "a");
        store.insert("content/b", "b");

        assert_eq!(store.remove("content/a").unwrap().address, "content/a");
        assert!(store.remove("content/a").is_none());
        assert_eq!(store.len(), 1);

        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn test_concurrent_inserts_and_updates() {
        let store = ArtifactStore::new();

        thread::scope(|scope| {
            for worker in 0..8 {
                let store = &store;
                scope.spawn(move || {
                    for i in 0..100 {
                        let address = format!("content/{worker}/{i}");
                        store.insert(address.clone(), format!("# {i}"));
                        assert!(store.set_rendered(&address, format!("<h1>{i}</h1>")));
                        assert!(store.get(&address).is_some());
                    }
                });
            }
        });

        assert_eq!(store.len(), 800);
        assert!(store.snapshot().iter().all(Document::is_rendered));
    }
}
