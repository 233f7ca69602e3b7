//! Ingestion pipeline.
//!
//! [`Loader::load`] walks a source directory, inserts one pending record per
//! markdown file into the [`ArtifactStore`], and hands the address to a fixed
//! pool of render workers through a bounded queue. It returns once every
//! dispatched task has reported back.
//!
//! # Architecture
//!
//! ```text
//!   walker (caller thread) --RenderTask--> [bounded queue] --> worker 1..W
//!          |                                                      |
//!          +----------------- Outcome (unbounded) <---------------+
//!                                  |
//!                              LoadReport
//! ```
//!
//! - The walker blocks when the task queue is full. This is the only
//!   backpressure between discovery and rendering.
//! - Workers never block on the outcome channel, so a walker stuck on a full
//!   queue always makes progress.
//! - The walker counts every message it expects on the outcome channel; the
//!   coordinator receives exactly that many before returning.
//!
//! # Failure Policy
//!
//! With [`IngestPolicy::FailFast`] the first traversal or read error stops the
//! walk and becomes the result of `load`, after already queued renders drain.
//! With [`IngestPolicy::Collect`] the error is sent as [`Outcome::Failed`] and
//! the walk continues.
//!
//! A task whose record is missing when a worker picks it up is not an error:
//! it is reported as [`Outcome::Skipped`].

use std::fs::{self, DirEntry};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use crossbeam_channel::{Receiver, Sender};

use crate::address::AddressScheme;
use crate::render::Render;
use crate::store::{ArtifactStore, Document};

/// Default number of render workers.
pub const DEFAULT_WORKERS: usize = 4;

/// Default capacity of the render task queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 10;

/// Convert Duration to milliseconds as f64.
fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

/// What to do when a directory or file cannot be read.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum IngestPolicy {
    /// Stop the walk at the first error and return it.
    #[default]
    FailFast,
    /// Record the error in the report and keep walking.
    Collect,
}

/// Ingestion error.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// Directory could not be listed.
    #[error("Failed to read directory {}: {source}", path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Source file could not be read.
    #[error("Failed to read file {}: {source}", path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Every render worker exited while tasks were still being dispatched.
    #[error("Render workers stopped before ingestion finished")]
    WorkersStopped,
}

/// A source that could not be ingested.
#[derive(Debug)]
pub struct IngestFailure {
    /// Path that failed.
    pub path: PathBuf,
    /// Address the file would have had (`None` for directories).
    pub address: Option<String>,
    /// Underlying error.
    pub error: LoadError,
}

/// Result of one unit of ingestion work.
#[derive(Debug)]
pub enum Outcome {
    /// Record rendered and stored.
    Rendered(Document),
    /// Record was gone when its task ran.
    Skipped { address: String },
    /// Source could not be read.
    Failed(IngestFailure),
}

/// Summary of an ingestion cycle.
///
/// Address lists are sorted.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Addresses rendered in this cycle.
    pub rendered: Vec<String>,
    /// Addresses whose record was missing when the worker picked them up.
    pub skipped: Vec<String>,
    /// Sources that could not be read ([`IngestPolicy::Collect`] only).
    pub failures: Vec<IngestFailure>,
    /// Empty source files that were not ingested.
    pub skipped_empty: usize,
}

impl LoadReport {
    /// Whether every discovered source was read without error.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Rendered(document) => self.rendered.push(document.address),
            Outcome::Skipped { address } => self.skipped.push(address),
            Outcome::Failed(failure) => self.failures.push(failure),
        }
    }

    fn finish(mut self) -> Self {
        self.rendered.sort_unstable();
        self.skipped.sort_unstable();
        self.failures.sort_by(|a, b| a.path.cmp(&b.path));
        self
    }
}

#[derive(Debug)]
struct RenderTask {
    address: String,
}

/// Populates an [`ArtifactStore`] from a source directory.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use std::sync::Arc;
///
/// use bolt_site::{ArtifactStore, IngestPolicy, Loader};
///
/// let store = Arc::new(ArtifactStore::new());
/// let loader = Loader::new(Arc::clone(&store))
///     .with_workers(8)
///     .with_policy(IngestPolicy::Collect);
///
/// let report = loader.load(Path::new("content"), &|s: &str| s.to_uppercase())?;
/// assert!(report.is_clean());
/// # Ok::<(), bolt_site::LoadError>(())
/// ```
#[derive(Debug)]
pub struct Loader {
    store: Arc<ArtifactStore>,
    workers: usize,
    queue_capacity: usize,
    policy: IngestPolicy,
}

impl Loader {
    /// Create a loader with default workers, queue capacity and policy.
    #[must_use]
    pub fn new(store: Arc<ArtifactStore>) -> Self {
        Self {
            store,
            workers: DEFAULT_WORKERS,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            policy: IngestPolicy::default(),
        }
    }

    /// Set the number of render workers (at least 1).
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Set the task queue capacity (at least 1).
    #[must_use]
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity.max(1);
        self
    }

    /// Set the failure policy.
    #[must_use]
    pub fn with_policy(mut self, policy: IngestPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Store being populated.
    #[must_use]
    pub fn store(&self) -> &Arc<ArtifactStore> {
        &self.store
    }

    /// Run one ingestion cycle over `base_dir`.
    ///
    /// Existing records are overwritten, not cleared; use [`Loader::reload`]
    /// to start from an empty store.
    pub fn load<R>(&self, base_dir: &Path, render: &R) -> Result<LoadReport, LoadError>
    where
        R: Render + ?Sized,
    {
        let start = Instant::now();
        let scheme = AddressScheme::for_base_dir(base_dir);
        let (task_tx, task_rx) = crossbeam_channel::bounded::<RenderTask>(self.queue_capacity);
        let (done_tx, done_rx) = crossbeam_channel::unbounded::<Outcome>();

        let (walk, report) = thread::scope(|scope| {
            for worker in 0..self.workers {
                let tasks = task_rx.clone();
                let done = done_tx.clone();
                let store = &*self.store;
                scope.spawn(move || run_worker(worker, store, render, &tasks, &done));
            }
            // Workers hold the only receivers, so a send fails once they all exit.
            drop(task_rx);

            let mut walker = Walker {
                base_dir,
                scheme: &scheme,
                store: &self.store,
                tasks: task_tx,
                done: done_tx,
                policy: self.policy,
                outstanding: 0,
                skipped_empty: 0,
            };
            let walk = walker.walk_dir(base_dir);
            let Walker {
                tasks,
                done,
                outstanding,
                skipped_empty,
                ..
            } = walker;
            drop(tasks);
            drop(done);

            let mut report = LoadReport {
                skipped_empty,
                ..LoadReport::default()
            };
            for outcome in done_rx.iter().take(outstanding) {
                report.record(outcome);
            }
            (walk, report.finish())
        });

        if let Err(e) = walk {
            tracing::warn!(
                base_dir = %base_dir.display(),
                error = %e,
                rendered = report.rendered.len(),
                elapsed_ms = elapsed_ms(start),
                "Ingestion aborted"
            );
            return Err(e);
        }

        tracing::info!(
            base_dir = %base_dir.display(),
            prefix = scheme.prefix(),
            workers = self.workers,
            rendered = report.rendered.len(),
            skipped = report.skipped.len(),
            failed = report.failures.len(),
            skipped_empty = report.skipped_empty,
            elapsed_ms = elapsed_ms(start),
            "Ingestion completed"
        );
        Ok(report)
    }

    /// Clear the store, then run [`Loader::load`].
    pub fn reload<R>(&self, base_dir: &Path, render: &R) -> Result<LoadReport, LoadError>
    where
        R: Render + ?Sized,
    {
        self.store.clear();
        self.load(base_dir, render)
    }
}

fn run_worker<R>(
    worker: usize,
    store: &ArtifactStore,
    render: &R,
    tasks: &Receiver<RenderTask>,
    done: &Sender<Outcome>,
) where
    R: Render + ?Sized,
{
    let mut handled = 0usize;
    for task in tasks {
        let outcome = render_task(store, render, task);
        handled += 1;
        if done.send(outcome).is_err() {
            break;
        }
    }
    tracing::debug!(worker, handled, "Render worker finished");
}

fn render_task<R>(store: &ArtifactStore, render: &R, task: RenderTask) -> Outcome
where
    R: Render + ?Sized,
{
    let Some(document) = store.get(&task.address) else {
        tracing::debug!(address = %task.address, "Record missing, skipping render");
        return Outcome::Skipped {
            address: task.address,
        };
    };

    let rendered: Arc<str> = render.render(&document.source).into();
    if store.set_rendered(&task.address, Arc::clone(&rendered)) {
        Outcome::Rendered(Document {
            rendered: Some(rendered),
            ..document
        })
    } else {
        Outcome::Skipped {
            address: task.address,
        }
    }
}

/// Directory walk state, owned by the calling thread.
struct Walker<'a> {
    base_dir: &'a Path,
    scheme: &'a AddressScheme,
    store: &'a ArtifactStore,
    tasks: Sender<RenderTask>,
    done: Sender<Outcome>,
    policy: IngestPolicy,
    /// Messages the coordinator must receive on the outcome channel.
    outstanding: usize,
    skipped_empty: usize,
}

impl Walker<'_> {
    /// Depth-first walk, entries in file-name order.
    fn walk_dir(&mut self, dir: &Path) -> Result<(), LoadError> {
        let entries = match read_dir_sorted(dir) {
            Ok(entries) => entries,
            Err(source) => {
                let error = LoadError::ReadDir {
                    path: dir.to_path_buf(),
                    source,
                };
                return self.fail(dir.to_path_buf(), None, error);
            }
        };

        for entry in entries {
            let path = entry.path();
            let file_type = match entry.file_type() {
                Ok(file_type) => file_type,
                Err(source) => {
                    let error = LoadError::ReadDir {
                        path: path.clone(),
                        source,
                    };
                    self.fail(path, None, error)?;
                    continue;
                }
            };

            if file_type.is_dir() {
                self.walk_dir(&path)?;
            } else if file_type.is_file() || (file_type.is_symlink() && !path.is_dir()) {
                self.visit_file(&path)?;
            }
        }
        Ok(())
    }

    fn visit_file(&mut self, path: &Path) -> Result<(), LoadError> {
        let rel = path.strip_prefix(self.base_dir).unwrap_or(path);
        let Some(address) = self.scheme.address_for(rel) else {
            return Ok(());
        };

        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(source) => {
                let error = LoadError::ReadFile {
                    path: path.to_path_buf(),
                    source,
                };
                return self.fail(path.to_path_buf(), Some(address), error);
            }
        };
        if bytes.is_empty() {
            tracing::debug!(path = %path.display(), "Skipping empty source");
            self.skipped_empty += 1;
            return Ok(());
        }

        let source = String::from_utf8_lossy(&bytes).into_owned();
        self.store.insert(address.clone(), source);
        self.tasks
            .send(RenderTask { address })
            .map_err(|_| LoadError::WorkersStopped)?;
        self.outstanding += 1;
        Ok(())
    }

    fn fail(
        &mut self,
        path: PathBuf,
        address: Option<String>,
        error: LoadError,
    ) -> Result<(), LoadError> {
        match self.policy {
            IngestPolicy::FailFast => Err(error),
            IngestPolicy::Collect => {
                tracing::warn!(path = %path.display(), error = %error, "Skipping unreadable source");
                self.done
                    .send(Outcome::Failed(IngestFailure {
                        path,
                        address,
                        error,
                    }))
                    .map_err(|_| LoadError::WorkersStopped)?;
                self.outstanding += 1;
                Ok(())
            }
        }
    }
}

fn read_dir_sorted(dir: &Path) -> io::Result<Vec<DirEntry>> {
    let mut entries = fs::read_dir(dir)?.collect::<io::Result<Vec<_>>>()?;
    entries.sort_by_key(DirEntry::file_name);
    Ok(entries)
}
