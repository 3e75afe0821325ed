//! # Error Module
//!
//! Error types shared by the header engines, the file locator and the
//! configuration layer.
//!
//! Errors fall into two groups:
//! - [`ConfigError`] is fatal and is raised before any file is touched.
//! - [`FileError`] belongs to a single file. The driver records it in that
//!   file's report and moves on to the next file.

use std::path::PathBuf;

/// Fatal configuration problems.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  /// A file pattern contained a path separator.
  #[error("bad pattern \"{0}\": must be a filename, not a path")]
  PatternHasSeparator(String),

  /// A file pattern was empty or not a valid glob.
  #[error("invalid pattern \"{pattern}\": {message}")]
  InvalidPattern { pattern: String, message: String },

  /// The delimiter is shorter than [`crate::header::DELIM_MINLEN`].
  #[error("delimiter length {0} is below the minimum of {min}", min = crate::header::DELIM_MINLEN)]
  DelimiterTooShort(usize),

  /// The root to scan is not a directory.
  #[error("root directory \"{}\" not found", .0.display())]
  RootNotFound(PathBuf),

  /// The config file could not be read.
  #[error("failed to read config file '{}': {source}", .path.display())]
  ConfigRead { path: PathBuf, source: std::io::Error },

  /// The config file contains invalid TOML.
  #[error("failed to parse config file '{}': {source}", .path.display())]
  ConfigParse { path: PathBuf, source: toml::de::Error },

  /// The header text file could not be read.
  #[error("failed to read header text '{}': {source}", .path.display())]
  TextRead { path: PathBuf, source: std::io::Error },

  /// A setting has a value outside its allowed range.
  #[error("invalid value for '{key}': {message}")]
  ConfigInvalid { key: String, message: String },
}

/// Per-file failures. None of these abort a run.
#[derive(Debug, thiserror::Error)]
pub enum FileError {
  /// The file could not be relocated, opened, read or written.
  #[error("{}: {action}: {source}", .path.display())]
  Io {
    path: PathBuf,
    action: &'static str,
    source: std::io::Error,
  },

  /// Non-text content was found while streaming the file.
  #[error("{}:{line}: not valid UTF-8 text", .path.display())]
  Decoding { path: PathBuf, line: usize },

  /// The file's structure prevents a safe rewrite.
  #[error("{}: {message}", .path.display())]
  Structural {
    path: PathBuf,
    message: String,
    /// Warnings leave the file untouched but are not counted as failures.
    warning: bool,
  },
}

impl FileError {
  pub fn io(path: impl Into<PathBuf>, action: &'static str, source: std::io::Error) -> Self {
    Self::Io {
      path: path.into(),
      action,
      source,
    }
  }

  pub fn structural(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
    Self::Structural {
      path: path.into(),
      message: message.into(),
      warning: false,
    }
  }

  /// An opening delimiter without a closing one.
  pub fn unterminated_header(path: impl Into<PathBuf>) -> Self {
    Self::Structural {
      path: path.into(),
      message: "header opened but never closed; file left unchanged".to_string(),
      warning: true,
    }
  }

  pub const fn is_warning(&self) -> bool {
    matches!(self, Self::Structural { warning: true, .. })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_pattern_error_message() {
    let err = ConfigError::PatternHasSeparator("src/*.py".to_string());
    assert_eq!(err.to_string(), "bad pattern \"src/*.py\": must be a filename, not a path");
  }

  #[test]
  fn test_delimiter_error_mentions_minimum() {
    let err = ConfigError::DelimiterTooShort(4);
    assert_eq!(err.to_string(), "delimiter length 4 is below the minimum of 10");
  }

  #[test]
  fn test_only_unterminated_header_is_warning() {
    assert!(FileError::unterminated_header("a.py").is_warning());
    assert!(!FileError::structural("a.ipynb", "no cells").is_warning());
    assert!(!FileError::Decoding {
      path: PathBuf::from("a.py"),
      line: 3
    }
    .is_warning());
  }
}
