//! # File Collector Module
//!
//! Walks a root directory and builds the worklist of files to process,
//! split into plain-text files and notebook documents.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::error::ConfigError;
use crate::file_filter::PatternSet;

/// How a discovered file is processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkKind {
  Text,
  Notebook,
}

/// A discovered file and the engine that handles it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
  pub path: PathBuf,
  pub kind: WorkKind,
}

/// Files found under a root, partitioned by kind.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Worklist {
  pub text_files: Vec<PathBuf>,
  pub notebook_files: Vec<PathBuf>,
}

impl Worklist {
  pub fn len(&self) -> usize {
    self.text_files.len() + self.notebook_files.len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Text files first, then notebooks.
  pub fn into_items(self) -> Vec<WorkItem> {
    let text = self.text_files.into_iter().map(|path| WorkItem {
      path,
      kind: WorkKind::Text,
    });
    let notebooks = self.notebook_files.into_iter().map(|path| WorkItem {
      path,
      kind: WorkKind::Notebook,
    });
    text.chain(notebooks).collect()
  }
}

/// Recursive file discovery over a single root.
///
/// Hidden files and directories below the root (names starting with `.`)
/// are not visited.
pub struct FileCollector {
  patterns: PatternSet,
  notebook_suffix: Option<String>,
}

impl FileCollector {
  /// Creates a collector.
  ///
  /// When `notebook_suffix` is set, files ending with it are routed to the
  /// notebook list and `*<suffix>` is added to the positive patterns.
  pub fn new(mut patterns: PatternSet, notebook_suffix: Option<String>) -> Result<Self, ConfigError> {
    if let Some(ref suffix) = notebook_suffix {
      patterns.add_positive(&format!("*{}", suffix))?;
    }
    Ok(Self {
      patterns,
      notebook_suffix,
    })
  }

  /// Walks `root` and returns every selected file, sorted by path within
  /// each list.
  ///
  /// # Errors
  ///
  /// Returns [`ConfigError::RootNotFound`] if `root` is not a directory.
  pub fn locate(&self, root: &Path) -> Result<Worklist, ConfigError> {
    if !root.is_dir() {
      return Err(ConfigError::RootNotFound(root.to_path_buf()));
    }

    debug!("Scanning directory: {}", root.display());
    let start_time = std::time::Instant::now();
    let mut worklist = Worklist::default();

    let walker = WalkDir::new(root)
      .sort_by_file_name()
      .into_iter()
      .filter_entry(|e| e.depth() == 0 || !is_hidden(e));

    for entry in walker {
      let entry = match entry {
        Ok(entry) => entry,
        Err(e) => {
          warn!("Error reading directory entry: {}", e);
          continue;
        }
      };
      if !entry.file_type().is_file() {
        continue;
      }

      let path = entry.into_path();
      if !self.patterns.matches(&path) {
        continue;
      }

      if self.is_notebook(&path) {
        worklist.notebook_files.push(path);
      } else {
        worklist.text_files.push(path);
      }
    }

    debug!(
      "Found {} text files and {} notebooks in {}ms",
      worklist.text_files.len(),
      worklist.notebook_files.len(),
      start_time.elapsed().as_millis()
    );

    Ok(worklist)
  }

  fn is_notebook(&self, path: &Path) -> bool {
    let Some(suffix) = self.notebook_suffix.as_deref() else {
      return false;
    };
    path
      .file_name()
      .and_then(|n| n.to_str())
      .is_some_and(|name| name.ends_with(suffix))
  }
}

fn is_hidden(entry: &DirEntry) -> bool {
  entry.file_name().to_str().is_some_and(|s| s.starts_with('.'))
}

#[cfg(test)]
mod tests {
  use std::fs;

  use tempfile::TempDir;

  use super::*;

  fn make_tree() -> TempDir {
    let dir = TempDir::new().expect("create temp dir");
    let package = dir.path().join("mypackage");
    fs::create_dir_all(package.join("tests")).expect("create dirs");
    for name in ["__init__.py", "foo.py", "bar.py"] {
      fs::write(package.join(name), "").expect("write file");
    }
    for name in ["__init__.py", "test_foo.py", "test_bar.py"] {
      fs::write(package.join("tests").join(name), "").expect("write file");
    }
    dir
  }

  #[test]
  fn test_locate_all_files() {
    let dir = make_tree();
    let collector = FileCollector::new(PatternSet::parse(&["*"], &[]).unwrap(), None).unwrap();
    let worklist = collector.locate(dir.path()).unwrap();
    assert_eq!(worklist.len(), 6);
    assert!(worklist.notebook_files.is_empty());
  }

  #[test]
  fn test_locate_with_negative_patterns() {
    let dir = make_tree();
    let patterns = PatternSet::parse(&["*.py", "~test_*.py", "~__init__.py"], &[]).unwrap();
    let worklist = FileCollector::new(patterns, None).unwrap().locate(dir.path()).unwrap();

    let names: Vec<_> = worklist
      .text_files
      .iter()
      .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
      .collect();
    assert_eq!(names, vec!["bar.py", "foo.py"]);
  }

  #[test]
  fn test_overlapping_patterns_visit_files_once() {
    let dir = make_tree();
    let patterns = PatternSet::parse(&["*.py", "foo.*", "f*"], &[]).unwrap();
    let worklist = FileCollector::new(patterns, None).unwrap().locate(dir.path()).unwrap();
    assert_eq!(worklist.len(), 6);
  }

  #[test]
  fn test_notebooks_are_routed_separately() {
    let dir = make_tree();
    fs::write(dir.path().join("analysis.ipynb"), "{}").unwrap();
    let patterns = PatternSet::parse(&["*.py"], &[]).unwrap();
    let collector = FileCollector::new(patterns, Some(".ipynb".to_string())).unwrap();
    let worklist = collector.locate(dir.path()).unwrap();

    assert_eq!(worklist.notebook_files, vec![dir.path().join("analysis.ipynb")]);
    assert_eq!(worklist.text_files.len(), 6);
  }

  #[test]
  fn test_hidden_directories_are_skipped() {
    let dir = make_tree();
    fs::create_dir_all(dir.path().join(".venv")).unwrap();
    fs::write(dir.path().join(".venv").join("site.py"), "").unwrap();
    fs::write(dir.path().join(".hidden.py"), "").unwrap();

    let patterns = PatternSet::parse(&["*.py"], &[]).unwrap();
    let worklist = FileCollector::new(patterns, None).unwrap().locate(dir.path()).unwrap();
    assert_eq!(worklist.len(), 6);
  }

  #[test]
  fn test_missing_root_is_an_error() {
    let dir = TempDir::new().unwrap();
    let collector = FileCollector::new(PatternSet::parse(&["*.py"], &[]).unwrap(), None).unwrap();
    let err = collector.locate(&dir.path().join("missing")).unwrap_err();
    assert!(matches!(err, ConfigError::RootNotFound(_)));
  }

  #[test]
  fn test_into_items_orders_text_before_notebooks() {
    let worklist = Worklist {
      text_files: vec![PathBuf::from("a.py")],
      notebook_files: vec![PathBuf::from("b.ipynb")],
    };
    let items = worklist.into_items();
    assert_eq!(items[0].kind, WorkKind::Text);
    assert_eq!(items[1].kind, WorkKind::Notebook);
  }
}
