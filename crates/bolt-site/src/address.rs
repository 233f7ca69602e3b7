//! Address derivation for source files.
//!
//! A document address is the file path relative to the source root, with the
//! `.md` suffix stripped and separators normalized to `/`, prefixed by the
//! name of the source root directory itself:
//!
//! | Source root | File             | Address        |
//! |-------------|------------------|----------------|
//! | `content`   | `about.md`       | `content/about`|
//! | `content`   | `b/c.md`         | `content/b/c`  |
//! | `docs`      | `guide/index.md` | `docs/guide/index` |
//!
//! The store key space has no leading slash. The serving layer builds lookup
//! keys with [`AddressScheme::address_for_url`].

use std::path::{Component, Path};

/// Suffix identifying document source files.
pub const SOURCE_SUFFIX: &str = ".md";

/// Address convention for one source root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AddressScheme {
    prefix: String,
}

impl AddressScheme {
    /// Build the scheme for a source root.
    ///
    /// The prefix is the last component of `base_dir`. Roots without a name
    /// (`.`, `/`) are canonicalized first; if that fails the prefix is empty
    /// and addresses are plain relative paths.
    #[must_use]
    pub fn for_base_dir(base_dir: &Path) -> Self {
        let name = base_dir.file_name().map_or_else(
            || {
                base_dir
                    .canonicalize()
                    .ok()
                    .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
                    .unwrap_or_default()
            },
            |n| n.to_string_lossy().into_owned(),
        );
        Self::with_prefix(name)
    }

    /// Build a scheme with an explicit prefix.
    #[must_use]
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into().trim_matches('/').to_owned();
        Self { prefix }
    }

    /// Address prefix (e.g., "content").
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Derive the address for a file path relative to the source root.
    ///
    /// Returns `None` when the file does not carry the source suffix or the
    /// path leaves the root (`..`, absolute components).
    #[must_use]
    pub fn address_for(&self, rel_path: &Path) -> Option<String> {
        let mut segments = Vec::new();
        for component in rel_path.components() {
            match component {
                Component::Normal(part) => segments.push(part.to_string_lossy()),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
            }
        }

        let last = segments.pop()?;
        let stem = last.strip_suffix(SOURCE_SUFFIX).filter(|s| !s.is_empty())?;

        let mut address = self.prefix.clone();
        for segment in segments.iter().map(|s| &**s).chain([stem]) {
            if !address.is_empty() {
                address.push('/');
            }
            address.push_str(segment);
        }
        Some(address)
    }

    /// Build the store key for a request path.
    ///
    /// `"/about"` and `"about"` both map to `"{prefix}/about"`.
    #[must_use]
    pub fn address_for_url(&self, url_path: &str) -> String {
        let path = url_path.trim_matches('/');
        match (self.prefix.is_empty(), path.is_empty()) {
            (true, _) => path.to_owned(),
            (false, true) => self.prefix.clone(),
            (false, false) => format!("{}/{path}", self.prefix),
        }
    }

    /// Strip the prefix from an address, returning the URL path with a
    /// leading slash (`"content/about"` -> `"/about"`).
    #[must_use]
    pub fn url_for(&self, address: &str) -> String {
        let rest = address
            .strip_prefix(self.prefix.as_str())
            .unwrap_or(address)
            .trim_start_matches('/');
        format!("/{rest}")
    }
}

/// Derive the address of `file_path` under `base_dir`.
///
/// Convenience wrapper around [`AddressScheme`] for one-off lookups.
#[must_use]
pub fn derive_address(base_dir: &Path, file_path: &Path) -> Option<String> {
    let rel = file_path.strip_prefix(base_dir).ok()?;
    AddressScheme::for_base_dir(base_dir).address_for(rel)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_prefix_from_base_dir_name() {
        assert_eq!(
            AddressScheme::for_base_dir(Path::new("content")).prefix(),
            "content"
        );
        assert_eq!(
            AddressScheme::for_base_dir(Path::new("./site/content/")).prefix(),
            "content"
        );
    }

    #[test]
    fn test_prefix_for_current_dir_uses_real_name() {
        let cwd = std::env::current_dir().unwrap();
        let expected = cwd.file_name().unwrap().to_string_lossy().into_owned();
        assert_eq!(AddressScheme::for_base_dir(Path::new(".")).prefix(), expected);
    }

    #[test]
    fn test_address_for() {
        let scheme = AddressScheme::with_prefix("content");
        assert_eq!(
            scheme.address_for(Path::new("a.md")),
            Some("content/a".to_owned())
        );
        assert_eq!(
            scheme.address_for(&PathBuf::from("b").join("c.md")),
            Some("content/b/c".to_owned())
        );
        assert_eq!(
            scheme.address_for(Path::new("guide/index.md")),
            Some("content/guide/index".to_owned())
        );
    }

    #[test]
    fn test_address_for_rejects_non_sources() {
        let scheme = AddressScheme::with_prefix("content");
        assert_eq!(scheme.address_for(Path::new("style.css")), None);
        assert_eq!(scheme.address_for(Path::new(".md")), None);
        assert_eq!(scheme.address_for(Path::new("../escape.md")), None);
        assert_eq!(scheme.address_for(Path::new("")), None);
    }

    #[test]
    fn test_address_for_empty_prefix() {
        let scheme = AddressScheme::with_prefix("");
        assert_eq!(
            scheme.address_for(Path::new("a/b.md")),
            Some("a/b".to_owned())
        );
    }

    #[test]
    fn test_address_for_url() {
        let scheme = AddressScheme::with_prefix("content");
        assert_eq!(scheme.address_for_url("/about"), "content/about");
        assert_eq!(scheme.address_for_url("about/team/"), "content/about/team");
        assert_eq!(scheme.address_for_url("/"), "content");
    }

    #[test]
    fn test_url_for() {
        let scheme = AddressScheme::with_prefix("content");
        assert_eq!(scheme.url_for("content/about"), "/about");
        assert_eq!(scheme.url_for("content/a/b"), "/a/b");
        assert_eq!(scheme.url_for("content"), "/");
    }

    #[test]
    fn test_derive_address() {
        let base = Path::new("/srv/content");
        assert_eq!(
            derive_address(base, Path::new("/srv/content/about.md")),
            Some("content/about".to_owned())
        );
        assert_eq!(derive_address(base, Path::new("/srv/other/about.md")), None);
    }
}
