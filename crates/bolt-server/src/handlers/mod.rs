//! HTTP request handlers.

pub(crate) mod css;
pub(crate) mod pages;

use crate::error::ServerError;

/// Check a wildcard request path before it is turned into a store key.
///
/// Trailing slashes are dropped. Rejects parent and current directory
/// segments, empty segments, backslashes and NUL bytes.
pub(crate) fn validate_request_path(path: &str) -> Result<&str, ServerError> {
    let trimmed = path.trim_end_matches('/');
    let unsafe_segment = trimmed
        .split('/')
        .any(|segment| segment.is_empty() || segment == "." || segment == "..");

    if unsafe_segment || trimmed.contains(['\\', '\0']) {
        tracing::debug!(path, "Rejected request path");
        return Err(ServerError::InvalidPath(path.to_owned()));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_request_path_accepts_nested() {
        assert_eq!(validate_request_path("guide/setup").unwrap(), "guide/setup");
        assert_eq!(validate_request_path("about/").unwrap(), "about");
        assert_eq!(validate_request_path("v1.2-notes").unwrap(), "v1.2-notes");
    }

    #[test]
    fn test_validate_request_path_rejects_traversal() {
        for path in ["..", "../etc/passwd", "a/../../b", "a/./b", "a//b", "/abs", "a\\b", "", "/"] {
            assert!(
                matches!(validate_request_path(path), Err(ServerError::InvalidPath(_))),
                "{path:?} should be rejected"
            );
        }
    }
}
