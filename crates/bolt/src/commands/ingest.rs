//! `bolt ingest` command implementation.
//!
//! Runs one ingestion cycle without starting the server and reports what was
//! rendered.

use std::path::PathBuf;
use std::sync::Arc;

use bolt_config::{CliSettings, Config};
use bolt_site::{ArtifactStore, IngestPolicy, LoadReport, Loader, MarkdownPage, PageChrome};
use clap::Args;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the ingest command.
#[derive(Args, Debug)]
pub(crate) struct IngestArgs {
    /// Path to configuration file (default: auto-discover bolt.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Markdown source directory (overrides config).
    #[arg(short, long)]
    source_dir: Option<PathBuf>,

    /// Number of render workers (overrides config).
    #[arg(short, long)]
    workers: Option<usize>,

    /// Report unreadable sources and continue instead of stopping at the first.
    #[arg(long)]
    keep_going: bool,
}

impl IngestArgs {
    fn cli_settings(&self) -> CliSettings {
        CliSettings {
            source_dir: self.source_dir.clone(),
            workers: self.workers,
            fail_fast: self.keep_going.then_some(false),
            ..CliSettings::default()
        }
    }

    /// Execute the ingest command.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = Config::load(self.config.as_deref(), Some(&self.cli_settings()))?;
        let report = ingest(&config)?;

        output.load_report(&report, &config.docs_resolved.source_dir);

        if report.is_clean() {
            Ok(())
        } else {
            Err(CliError::Incomplete(report.failures.len()))
        }
    }
}

fn ingest(config: &Config) -> Result<LoadReport, CliError> {
    let theme = &config.theme_resolved;
    let chrome = Arc::new(PageChrome::load(
        theme.stylesheet.as_deref(),
        theme.header.clone(),
    )?);
    let policy = if config.ingest.fail_fast {
        IngestPolicy::FailFast
    } else {
        IngestPolicy::Collect
    };
    tracing::debug!(
        source_dir = %config.docs_resolved.source_dir.display(),
        workers = config.ingest.workers,
        ?policy,
        "Starting ingestion"
    );

    let report = Loader::new(Arc::new(ArtifactStore::new()))
        .with_workers(config.ingest.workers)
        .with_queue_capacity(config.ingest.queue_capacity)
        .with_policy(policy)
        .load(&config.docs_resolved.source_dir, &MarkdownPage::new(chrome))?;
    Ok(report)
}
