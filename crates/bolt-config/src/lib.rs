//! Configuration management for Bolt.
//!
//! Parses `bolt.toml` with serde and discovers the file in the current
//! directory or any parent. CLI flags are layered on top through
//! [`CliSettings`].
//!
//! ```toml
//! [server]
//! host = "127.0.0.1"
//! port = 8080
//!
//! [docs]
//! source_dir = "content"
//!
//! [theme]
//! stylesheet = "styles.css"
//! header = "<header>Docs</header>"
//!
//! [ingest]
//! workers = 4
//! queue_capacity = 10
//! fail_fast = true
//! ```
//!
//! ## Environment Variable Expansion
//!
//! `${VAR}` (error if unset) and `${VAR:-default}` are expanded in:
//! - `server.host`
//! - `theme.header`

mod expand;

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "bolt.toml";

/// Default source directory, relative to the config file.
const DEFAULT_SOURCE_DIR: &str = "content";

/// CLI settings that override configuration file values.
///
/// Only `Some` values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override server host.
    pub host: Option<String>,
    /// Override server port.
    pub port: Option<u16>,
    /// Override source directory.
    pub source_dir: Option<PathBuf>,
    /// Override stylesheet path.
    pub stylesheet: Option<PathBuf>,
    /// Override render worker count.
    pub workers: Option<usize>,
    /// Override fail-fast ingestion.
    pub fail_fast: Option<bool>,
}

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Ingestion configuration.
    pub ingest: IngestConfig,
    docs: DocsConfigRaw,
    theme: ThemeConfigRaw,

    /// Resolved docs configuration (set after loading).
    #[serde(skip)]
    pub docs_resolved: DocsConfig,
    /// Resolved theme configuration (set after loading).
    #[serde(skip)]
    pub theme_resolved: ThemeConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Server configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 8080,
        }
    }
}

/// Ingestion pipeline configuration.
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct IngestConfig {
    /// Number of render workers.
    pub workers: usize,
    /// Render task queue capacity.
    pub queue_capacity: usize,
    /// Abort ingestion on the first unreadable source.
    pub fail_fast: bool,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            queue_capacity: 10,
            fail_fast: true,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct DocsConfigRaw {
    source_dir: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ThemeConfigRaw {
    stylesheet: Option<String>,
    header: Option<String>,
}

/// Resolved documentation configuration.
#[derive(Debug, Default)]
pub struct DocsConfig {
    /// Directory holding markdown sources.
    pub source_dir: PathBuf,
}

/// Resolved theme configuration.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ThemeConfig {
    /// Stylesheet served at `/css` (`None` serves an empty stylesheet).
    pub stylesheet: Option<PathBuf>,
    /// Header HTML prepended to every page.
    pub header: Option<String>,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`server.host`").
        field: String,
        /// Error message (e.g., "${`BOLT_HOST`} not set").
        message: String,
    },
}

fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

fn require_positive(value: usize, field: &str) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::Validation(format!(
            "{field} must be greater than 0"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration, then apply CLI settings and validate.
    ///
    /// With an explicit `config_path` the file must exist. Otherwise
    /// `bolt.toml` is searched in the current directory and its parents, and
    /// defaults relative to the current directory are used when none is found.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }
        config.validate()?;

        Ok(config)
    }

    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(host) = &settings.host {
            self.server.host.clone_from(host);
        }
        if let Some(port) = settings.port {
            self.server.port = port;
        }
        if let Some(source_dir) = &settings.source_dir {
            self.docs_resolved.source_dir.clone_from(source_dir);
        }
        if let Some(stylesheet) = &settings.stylesheet {
            self.theme_resolved.stylesheet = Some(stylesheet.clone());
        }
        if let Some(workers) = settings.workers {
            self.ingest.workers = workers;
        }
        if let Some(fail_fast) = settings.fail_fast {
            self.ingest.fail_fast = fail_fast;
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.is_file() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    fn default_with_base(base: &Path) -> Self {
        Self {
            server: ServerConfig::default(),
            ingest: IngestConfig::default(),
            docs: DocsConfigRaw::default(),
            theme: ThemeConfigRaw::default(),
            docs_resolved: DocsConfig {
                source_dir: base.join(DEFAULT_SOURCE_DIR),
            },
            theme_resolved: ThemeConfig::default(),
            config_path: None,
        }
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.server.host, "server.host")?;
        if self.server.port == 0 {
            return Err(ConfigError::Validation(
                "server.port cannot be 0".to_owned(),
            ));
        }
        require_positive(self.ingest.workers, "ingest.workers")?;
        require_positive(self.ingest.queue_capacity, "ingest.queue_capacity")?;
        Ok(())
    }

    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.server.host = expand::expand_env(&self.server.host, "server.host")?;
        if let Some(header) = &self.theme.header {
            self.theme.header = Some(expand::expand_env(header, "theme.header")?);
        }
        Ok(())
    }

    /// Resolve relative paths against the config file's directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        self.docs_resolved = DocsConfig {
            source_dir: config_dir.join(
                self.docs
                    .source_dir
                    .as_deref()
                    .unwrap_or(DEFAULT_SOURCE_DIR),
            ),
        };
        self.theme_resolved = ThemeConfig {
            stylesheet: self.theme.stylesheet.as_deref().map(|s| config_dir.join(s)),
            header: self.theme.header.clone(),
        };
    }
}
