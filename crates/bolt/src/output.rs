//! Styled status lines on stderr.
//!
//! stdout stays free; everything the CLI says about its own progress goes
//! through [`Output`].

use std::path::Path;

use bolt_site::LoadReport;
use console::{Style, Term};

/// Line styling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Tone {
    Plain,
    Done,
    Notice,
    Failure,
    Heading,
}

impl Tone {
    fn style(self) -> Style {
        match self {
            Self::Plain => Style::new(),
            Self::Done => Style::new().green(),
            Self::Notice => Style::new().yellow(),
            Self::Failure => Style::new().red(),
            Self::Heading => Style::new().cyan().bold(),
        }
    }
}

/// Writer for CLI status lines.
pub(crate) struct Output {
    term: Term,
}

impl Output {
    /// Output on the process stderr.
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
        }
    }

    /// Write `msg` in the given tone. A closed stderr is not an error.
    pub(crate) fn line(&self, tone: Tone, msg: &str) {
        let _ = self.term.write_line(&tone.style().apply_to(msg).to_string());
    }

    /// Unstyled line.
    pub(crate) fn info(&self, msg: &str) {
        self.line(Tone::Plain, msg);
    }

    /// Red line.
    pub(crate) fn error(&self, msg: &str) {
        self.line(Tone::Failure, msg);
    }

    /// Summarize an ingestion run: count, addresses, empty files, failures.
    pub(crate) fn load_report(&self, report: &LoadReport, source_dir: &Path) {
        for (tone, msg) in report_lines(report, source_dir) {
            self.line(tone, &msg);
        }
    }
}

fn report_lines(report: &LoadReport, source_dir: &Path) -> Vec<(Tone, String)> {
    let mut lines = vec![(
        Tone::Heading,
        format!(
            "Ingested {} page(s) from {}",
            report.rendered.len(),
            source_dir.display()
        ),
    )];
    lines.extend(
        report
            .rendered
            .iter()
            .map(|address| (Tone::Plain, format!("  {address}"))),
    );
    if report.skipped_empty > 0 {
        lines.push((
            Tone::Notice,
            format!("Skipped {} empty file(s)", report.skipped_empty),
        ));
    }
    lines.extend(report.failures.iter().map(|failure| {
        (
            Tone::Failure,
            format!("  {}: {}", failure.path.display(), failure.error),
        )
    }));
    if report.is_clean() {
        lines.push((Tone::Done, "Ingestion completed".to_owned()));
    }
    lines
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::path::PathBuf;

    use bolt_site::{IngestFailure, LoadError};
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_clean_report_lines() {
        let report = LoadReport {
            rendered: vec!["content/a".to_owned(), "content/b/c".to_owned()],
            ..LoadReport::default()
        };

        assert_eq!(
            report_lines(&report, Path::new("content")),
            vec![
                (Tone::Heading, "Ingested 2 page(s) from content".to_owned()),
                (Tone::Plain, "  content/a".to_owned()),
                (Tone::Plain, "  content/b/c".to_owned()),
                (Tone::Done, "Ingestion completed".to_owned()),
            ]
        );
    }

    #[test]
    fn test_report_lines_with_failures_and_empty_files() {
        let path = PathBuf::from("content/broken.md");
        let report = LoadReport {
            failures: vec![IngestFailure {
                path: path.clone(),
                address: Some("content/broken".to_owned()),
                error: LoadError::ReadFile {
                    path,
                    source: io::Error::from(io::ErrorKind::PermissionDenied),
                },
            }],
            skipped_empty: 1,
            ..LoadReport::default()
        };

        let lines = report_lines(&report, Path::new("content"));

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], (Tone::Notice, "Skipped 1 empty file(s)".to_owned()));
        assert_eq!(lines[2].0, Tone::Failure);
        assert!(lines[2].1.starts_with("  content/broken.md: Failed to read file"));
    }
}
