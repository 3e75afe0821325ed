//! # Processor Module
//!
//! Drives the header engines over a worklist.
//!
//! The module is organized into several submodules:
//! - [`file_collector`] - Directory traversal and worklist construction
//! - [`file_io`] - The relocate-then-rewrite guard used for in-place edits
//! - [`text_engine`] - Header handling for plain-text files
//! - [`notebook_engine`] - Header handling for notebook documents
//!
//! The [`Processor`] struct dispatches each work item to the matching engine
//! and turns the outcome into a [`FileReport`].

pub mod file_collector;
pub mod file_io;
pub mod notebook_engine;
pub mod text_engine;

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
pub use file_collector::{FileCollector, WorkItem, WorkKind, Worklist};
pub use notebook_engine::NotebookEngine;
pub use text_engine::TextEngine;
use tokio::sync::Semaphore;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinSet;
use tracing::{debug, trace};

use crate::header::HeaderSpec;
use crate::report::FileReport;

/// Operation applied to every file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
  /// Insert the header, or rewrite the one already there.
  Replace,
  /// Delete an existing header.
  Remove,
  /// Only report whether a header is present.
  Detect,
}

impl Mode {
  /// Whether files may be rewritten in this mode.
  pub const fn modifies(self) -> bool {
    !matches!(self, Self::Detect)
  }
}

impl fmt::Display for Mode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Replace => write!(f, "replace"),
      Self::Remove => write!(f, "remove"),
      Self::Detect => write!(f, "detect"),
    }
  }
}

/// Notified once per file, after the file is finished.
pub trait ProgressObserver: Send + Sync {
  /// `written` is true when the file's content on disk changed.
  fn on_file(&self, path: &Path, written: bool);
}

/// Progress notification sent over a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
  pub path: PathBuf,
  pub written: bool,
}

impl ProgressObserver for UnboundedSender<ProgressEvent> {
  fn on_file(&self, path: &Path, written: bool) {
    let event = ProgressEvent {
      path: path.to_path_buf(),
      written,
    };
    if self.send(event).is_err() {
      trace!("Progress receiver closed, dropping event for {}", path.display());
    }
  }
}

/// Configuration for creating a Processor instance.
#[derive(Debug, Clone)]
pub struct ProcessorConfig {
  pub header: HeaderSpec,
  pub mode: Mode,
  /// Insert headers into empty and whitespace-only text files.
  pub allow_empty_files: bool,
  /// Maximum number of files processed at once.
  pub jobs: usize,
}

impl ProcessorConfig {
  /// Creates a config for `mode` with sequential processing and the
  /// empty-file policy off.
  ///
  /// Use struct update syntax to override specific fields:
  /// ```ignore
  /// ProcessorConfig {
  ///     jobs: 4,
  ///     ..ProcessorConfig::new(header, Mode::Replace)
  /// }
  /// ```
  pub const fn new(header: HeaderSpec, mode: Mode) -> Self {
    Self {
      header,
      mode,
      allow_empty_files: false,
      jobs: 1,
    }
  }
}

/// Applies one [`Mode`] to text files and notebooks.
#[derive(Clone)]
pub struct Processor {
  mode: Mode,
  jobs: usize,
  text: TextEngine,
  notebook: NotebookEngine,
  observers: Vec<Arc<dyn ProgressObserver>>,
}

impl Processor {
  pub fn new(config: ProcessorConfig) -> Self {
    Self {
      mode: config.mode,
      jobs: config.jobs.max(1),
      text: TextEngine::new(&config.header, config.allow_empty_files),
      notebook: NotebookEngine::new(&config.header),
      observers: Vec::new(),
    }
  }

  pub const fn mode(&self) -> Mode {
    self.mode
  }

  /// Registers an observer that is told about every finished file.
  pub fn add_observer(&mut self, observer: Arc<dyn ProgressObserver>) {
    self.observers.push(observer);
  }

  /// Processes a single file. Failures are recorded in the report.
  pub fn process_file(&self, item: &WorkItem) -> FileReport {
    let path = &item.path;
    trace!("Processing {} ({})", path.display(), self.mode);

    let result = match item.kind {
      WorkKind::Text => self
        .text
        .process_file(path, self.mode)
        .map(|outcome| (outcome.detected, outcome.changed)),
      WorkKind::Notebook => self
        .notebook
        .process_file(path, self.mode)
        .map(|outcome| (outcome.detected, outcome.changed)),
    };

    let report = match result {
      Ok((detected, changed)) => FileReport::from_outcome(path.clone(), item.kind, self.mode, detected, changed),
      Err(e) => {
        debug!("Failed to process {}: {}", path.display(), e);
        FileReport::from_error(path.clone(), item.kind, self.mode, &e)
      }
    };

    for observer in &self.observers {
      observer.on_file(path, report.is_modified());
    }
    report
  }

  /// Processes every file in `worklist`, text files first, and returns the
  /// reports in worklist order.
  ///
  /// With `jobs > 1` up to `jobs` files are processed at once on blocking
  /// worker threads.
  ///
  /// # Errors
  ///
  /// Returns an error only if a worker task panicked or was cancelled.
  pub async fn process(&self, worklist: Worklist) -> Result<Vec<FileReport>> {
    let items = worklist.into_items();
    let shared = Arc::new(self.clone());

    if self.jobs == 1 || items.len() <= 1 {
      debug!("Processing {} files sequentially", items.len());
      return tokio::task::spawn_blocking(move || items.iter().map(|item| shared.process_file(item)).collect())
        .await
        .context("File worker failed");
    }

    debug!("Processing {} files with {} workers", items.len(), self.jobs);
    let total = items.len();
    let semaphore = Arc::new(Semaphore::new(self.jobs));
    let mut tasks = JoinSet::new();

    for (index, item) in items.into_iter().enumerate() {
      let permit = Arc::clone(&semaphore)
        .acquire_owned()
        .await
        .context("Worker pool closed")?;
      let processor = Arc::clone(&shared);
      tasks.spawn_blocking(move || {
        let _permit = permit;
        (index, processor.process_file(&item))
      });
    }

    let mut slots: Vec<Option<FileReport>> = vec![None; total];
    while let Some(joined) = tasks.join_next().await {
      let (index, report) = joined.context("File worker failed")?;
      slots[index] = Some(report);
    }

    Ok(slots.into_iter().flatten().collect())
  }
}
