//! `bolt serve` command implementation.

use std::path::PathBuf;

use bolt_config::{CliSettings, Config};
use bolt_server::{ServerConfig, run_server};
use clap::Args;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the serve command.
#[derive(Args, Debug)]
pub(crate) struct ServeArgs {
    /// Path to configuration file (default: auto-discover bolt.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Markdown source directory (overrides config).
    #[arg(short, long)]
    source_dir: Option<PathBuf>,

    /// Host to bind to (overrides config).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind to (overrides config).
    #[arg(short, long, env = "BOLT_PORT")]
    port: Option<u16>,

    /// Stylesheet served at /css (overrides config).
    #[arg(long)]
    stylesheet: Option<PathBuf>,

    /// Number of render workers (overrides config).
    #[arg(short, long)]
    workers: Option<usize>,

    /// Enable verbose output (ingestion and request logs).
    #[arg(short, long)]
    pub verbose: bool,
}

impl ServeArgs {
    fn cli_settings(&self) -> CliSettings {
        CliSettings {
            host: self.host.clone(),
            port: self.port,
            source_dir: self.source_dir.clone(),
            stylesheet: self.stylesheet.clone(),
            workers: self.workers,
            fail_fast: None,
        }
    }

    /// Execute the serve command.
    pub(crate) async fn execute(self, version: &str) -> Result<(), CliError> {
        let output = Output::new();

        let config = Config::load(self.config.as_deref(), Some(&self.cli_settings()))?;

        output.info(&format!(
            "Starting server on {}:{}",
            config.server.host, config.server.port
        ));
        output.info(&format!(
            "Source directory: {}",
            config.docs_resolved.source_dir.display()
        ));
        match &config.theme_resolved.stylesheet {
            Some(path) => output.info(&format!("Stylesheet: {}", path.display())),
            None => output.info("Stylesheet: none"),
        }
        output.info(&format!(
            "Render workers: {} (queue capacity {})",
            config.ingest.workers, config.ingest.queue_capacity
        ));

        run_server(ServerConfig::from_config(&config, version.to_owned())).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use pretty_assertions::assert_eq;

    use crate::{Cli, Commands};

    #[test]
    fn test_serve_args_map_to_cli_settings() {
        let cli = Cli::try_parse_from([
            "bolt",
            "serve",
            "--source-dir",
            "pages",
            "--host",
            "0.0.0.0",
            "--port",
            "9000",
            "--stylesheet",
            "site.css",
            "-w",
            "8",
        ])
        .unwrap();
        let Commands::Serve(args) = cli.command else {
            panic!("expected serve command");
        };

        let settings = args.cli_settings();

        assert_eq!(settings.host.as_deref(), Some("0.0.0.0"));
        assert_eq!(settings.port, Some(9000));
        assert_eq!(settings.source_dir, Some("pages".into()));
        assert_eq!(settings.stylesheet, Some("site.css".into()));
        assert_eq!(settings.workers, Some(8));
        assert_eq!(settings.fail_fast, None);
        assert!(!args.verbose);
    }

    #[test]
    fn test_serve_rejects_invalid_port() {
        assert!(Cli::try_parse_from(["bolt", "serve", "--port", "http"]).is_err());
    }
}
