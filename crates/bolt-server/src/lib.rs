//! HTTP server for Bolt.
//!
//! Serves the pages held in a [`bolt_site::ArtifactStore`] over axum:
//! - `GET /css`: site stylesheet
//! - `GET /`: the `index` page
//! - `GET /{*path}`: any other page, wrapped in stylesheet link and navigation
//!
//! # Startup
//!
//! ```text
//! PageChrome::load ──► Loader::load (blocking pool) ──► Navigation::build
//!                                                            │
//!                                      axum::serve ◄── AppState
//! ```
//!
//! The corpus is ingested once before the listener is bound; the store is not
//! written to while serving.
//!
//! # Quick Start
//!
//! ```no_run
//! use bolt_server::{ServerConfig, run_server};
//!
//! # async fn example() -> Result<(), bolt_server::StartupError> {
//! let config = ServerConfig {
//!     source_dir: "content".into(),
//!     version: env!("CARGO_PKG_VERSION").to_owned(),
//!     ..ServerConfig::default()
//! };
//! run_server(config).await
//! # }
//! ```

mod app;
mod error;
mod handlers;
mod middleware;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::Router;

use bolt_site::{
    AddressScheme, ArtifactStore, DEFAULT_QUEUE_CAPACITY, DEFAULT_WORKERS, IngestPolicy, Loader,
    MarkdownPage, Navigation, PageChrome,
};

pub use error::{ServerError, StartupError};
use state::AppState;

/// How long open connections may keep the server alive after a shutdown
/// signal.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Markdown source directory.
    pub source_dir: PathBuf,
    /// Stylesheet served at `/css`.
    pub stylesheet: Option<PathBuf>,
    /// Header HTML prepended to every page.
    pub header: Option<String>,
    /// Render worker count.
    pub workers: usize,
    /// Render task queue capacity.
    pub queue_capacity: usize,
    /// Abort startup on the first unreadable source.
    pub fail_fast: bool,
    /// Application version (for `ETag` computation).
    pub version: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 8080,
            source_dir: PathBuf::from("content"),
            stylesheet: None,
            header: None,
            workers: DEFAULT_WORKERS,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            fail_fast: true,
            version: String::new(),
        }
    }
}

impl ServerConfig {
    /// Create server configuration from a loaded [`bolt_config::Config`].
    #[must_use]
    pub fn from_config(config: &bolt_config::Config, version: String) -> Self {
        Self {
            host: config.server.host.clone(),
            port: config.server.port,
            source_dir: config.docs_resolved.source_dir.clone(),
            stylesheet: config.theme_resolved.stylesheet.clone(),
            header: config.theme_resolved.header.clone(),
            workers: config.ingest.workers,
            queue_capacity: config.ingest.queue_capacity,
            fail_fast: config.ingest.fail_fast,
            version,
        }
    }

    fn policy(&self) -> IngestPolicy {
        if self.fail_fast {
            IngestPolicy::FailFast
        } else {
            IngestPolicy::Collect
        }
    }
}

/// Run the server until Ctrl-C or SIGTERM.
pub async fn run_server(config: ServerConfig) -> Result<(), StartupError> {
    let addr = SocketAddr::from_str(&format!("{}:{}", config.host, config.port))?;

    let state = tokio::task::spawn_blocking(move || prepare_state(&config)).await??;
    let app = app::create_router(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| StartupError::Bind { addr, source })?;
    tracing::info!(address = %addr, "Starting server");

    serve_with_shutdown(listener, app, shutdown_signal(), SHUTDOWN_TIMEOUT).await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Serve until `signal` resolves, then drain connections for at most `grace`.
async fn serve_with_shutdown(
    listener: tokio::net::TcpListener,
    app: Router,
    signal: impl Future<Output = ()> + Send + 'static,
    grace: Duration,
) -> Result<(), StartupError> {
    let signalled = Arc::new(tokio::sync::Notify::new());
    let notify = Arc::clone(&signalled);
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            signal.await;
            notify.notify_one();
        })
        .into_future();
    let mut server = std::pin::pin!(server);

    tokio::select! {
        result = &mut server => result?,
        () = signalled.notified() => {
            if let Ok(result) = tokio::time::timeout(grace, &mut server).await {
                result?;
            } else {
                tracing::warn!(
                    timeout_ms = grace.as_millis(),
                    "Connections still open after shutdown timeout, closing"
                );
            }
        }
    }
    Ok(())
}

/// Load chrome, ingest the corpus and build navigation.
fn prepare_state(config: &ServerConfig) -> Result<AppState, StartupError> {
    let start = Instant::now();
    let chrome = Arc::new(PageChrome::load(
        config.stylesheet.as_deref(),
        config.header.clone(),
    )?);

    let store = Arc::new(ArtifactStore::new());
    let report = Loader::new(Arc::clone(&store))
        .with_workers(config.workers)
        .with_queue_capacity(config.queue_capacity)
        .with_policy(config.policy())
        .load(&config.source_dir, &MarkdownPage::new(Arc::clone(&chrome)))?;

    for failure in &report.failures {
        tracing::warn!(
            path = %failure.path.display(),
            error = %failure.error,
            "Source not ingested"
        );
    }

    let scheme = AddressScheme::for_base_dir(&config.source_dir);
    let navigation = Navigation::build(&store, &scheme).without(app::RESERVED_PATHS);

    tracing::info!(
        pages = store.len(),
        nav_items = navigation.items().len(),
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "Site prepared"
    );

    Ok(AppState {
        store,
        chrome,
        navigation_html: navigation.to_html(),
        scheme,
        version: config.version.clone(),
    })
}

/// Wait for Ctrl-C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
    tracing::info!("Shutdown signal received, stopping server...");
}
