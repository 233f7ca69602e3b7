//! Error types for the HTTP server.

use std::net::{AddrParseError, SocketAddr};

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use bolt_site::{ChromeError, LoadError};
use serde_json::json;

/// Request-level error, rendered as a JSON body.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// No rendered page at the given path.
    #[error("Page not found: {0}")]
    PageNotFound(String),

    /// Request path escapes the content root or is malformed.
    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::PageNotFound(path) => (
                StatusCode::NOT_FOUND,
                json!({"error": "Page not found", "path": path}),
            ),
            Self::InvalidPath(path) => (
                StatusCode::BAD_REQUEST,
                json!({"error": "Invalid path", "path": path}),
            ),
        };

        (status, axum::Json(body)).into_response()
    }
}

/// Error preparing or running the server.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// Host and port do not form a socket address.
    #[error("Invalid listen address: {0}")]
    InvalidAddress(#[from] AddrParseError),

    /// Stylesheet could not be loaded.
    #[error(transparent)]
    Chrome(#[from] ChromeError),

    /// Ingestion failed.
    #[error("Ingestion failed: {0}")]
    Load(#[from] LoadError),

    /// Ingestion task panicked or was cancelled.
    #[error("Ingestion task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    /// Listener could not be bound.
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// Server I/O error.
    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}
