//! # Report Module
//!
//! Per-file results and the run summary built from them.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::FileError;
use crate::processor::{Mode, WorkKind};

/// What happened to a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileAction {
  /// A header was inserted into a file that had none.
  Added,
  /// An existing header was rewritten.
  Replaced,
  /// An existing header was removed.
  Removed,
  /// The file was left as it was.
  Unchanged,
  /// The file was only inspected.
  Checked,
  /// The file could not be processed.
  Failed,
}

/// A per-file problem, kept as text so reports stay cloneable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportedError {
  pub message: String,
  pub warning: bool,
}

impl From<&FileError> for ReportedError {
  fn from(error: &FileError) -> Self {
    Self {
      message: error.to_string(),
      warning: error.is_warning(),
    }
  }
}

/// Result of processing one file.
#[derive(Debug, Clone)]
pub struct FileReport {
  pub path: PathBuf,
  pub kind: WorkKind,
  pub mode: Mode,
  /// Whether a header was present when the file was read.
  pub detected: bool,
  pub action: FileAction,
  pub error: Option<ReportedError>,
}

impl FileReport {
  /// Builds the report for a file that was processed without error.
  pub fn from_outcome(path: PathBuf, kind: WorkKind, mode: Mode, detected: bool, changed: bool) -> Self {
    let action = match mode {
      Mode::Detect => FileAction::Checked,
      Mode::Remove if changed => FileAction::Removed,
      Mode::Replace if changed && detected => FileAction::Replaced,
      Mode::Replace if changed => FileAction::Added,
      _ => FileAction::Unchanged,
    };
    Self {
      path,
      kind,
      mode,
      detected,
      action,
      error: None,
    }
  }

  /// Builds the report for a file whose processing hit `error`. Warnings
  /// leave the file unchanged and are not counted as failures.
  pub fn from_error(path: PathBuf, kind: WorkKind, mode: Mode, error: &FileError) -> Self {
    let action = if error.is_warning() {
      FileAction::Unchanged
    } else {
      FileAction::Failed
    };
    Self {
      path,
      kind,
      mode,
      detected: false,
      action,
      error: Some(error.into()),
    }
  }

  /// The file's content on disk was rewritten.
  pub const fn is_modified(&self) -> bool {
    matches!(
      self.action,
      FileAction::Added | FileAction::Replaced | FileAction::Removed
    )
  }

  pub fn is_warning(&self) -> bool {
    self.error.as_ref().is_some_and(|e| e.warning)
  }
}

/// Summary of the processing results
#[derive(Debug, Clone, Default)]
pub struct ProcessingSummary {
  pub total_files: usize,
  pub modified: usize,
  pub unchanged: usize,
  pub failed: usize,
  pub warnings: usize,
  /// Files found with a header (detect mode).
  pub with_header: usize,
  /// Files found without a header (detect mode).
  pub missing_header: usize,
  pub processing_time: Duration,
}

impl ProcessingSummary {
  pub fn from_reports(files: &[FileReport], processing_time: Duration) -> Self {
    let mut summary = Self {
      total_files: files.len(),
      processing_time,
      ..Self::default()
    };

    for file in files {
      match file.action {
        FileAction::Added | FileAction::Replaced | FileAction::Removed => summary.modified += 1,
        FileAction::Failed => summary.failed += 1,
        FileAction::Unchanged => summary.unchanged += 1,
        FileAction::Checked => {
          summary.unchanged += 1;
          if file.detected {
            summary.with_header += 1;
          } else {
            summary.missing_header += 1;
          }
        }
      }
      if file.is_warning() {
        summary.warnings += 1;
      }
    }

    summary
  }

  pub const fn has_failures(&self) -> bool {
    self.failed > 0
  }
}
