//! CLI error types.

use bolt_config::ConfigError;
use bolt_server::StartupError;
use bolt_site::{ChromeError, LoadError};

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Chrome(#[from] ChromeError),

    #[error("{0}")]
    Load(#[from] LoadError),

    #[error("{0}")]
    Server(#[from] StartupError),

    #[error("{0} source(s) could not be ingested")]
    Incomplete(usize),
}
