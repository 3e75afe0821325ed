//! # File Filter Module
//!
//! Decides which discovered files are in scope.
//!
//! A [`PatternSet`] combines three lists of globs:
//! - positive patterns, matched against the file name
//! - negative patterns (written with a leading `~`), matched against the file
//!   name
//! - path exclusions, matched against the full path
//!
//! A path is selected when its name matches any positive pattern, matches no
//! negative pattern, and its full path matches no exclusion.

use std::path::{MAIN_SEPARATOR, Path};

use glob::Pattern;
use tracing::{debug, trace};

use crate::error::ConfigError;

/// Patterns used when none are configured.
pub const DEFAULT_PATTERNS: &[&str] = &["*.py", "~__init__.py"];

/// Prefix marking a negative pattern.
pub const NEGATION_PREFIX: char = '~';

/// Compiled positive, negative and path-exclusion patterns.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
  positive: Vec<Pattern>,
  negative: Vec<Pattern>,
  path_excludes: Vec<Pattern>,
}

impl PatternSet {
  /// Builds a pattern set from one combined list where negative patterns
  /// carry a leading `~`, plus a list of full-path exclusion globs.
  ///
  /// # Errors
  ///
  /// Returns a [`ConfigError`] if a file pattern contains a path separator,
  /// is empty, or is not a valid glob.
  pub fn parse<S: AsRef<str>>(patterns: &[S], path_excludes: &[S]) -> Result<Self, ConfigError> {
    let mut positive = Vec::new();
    let mut negative = Vec::new();

    for raw in patterns {
      let raw = raw.as_ref();
      match raw.strip_prefix(NEGATION_PREFIX) {
        Some(pattern) => {
          debug!("Negative pattern: {}", pattern);
          negative.push(compile_name_pattern(pattern)?);
        }
        None => {
          debug!("Positive pattern: {}", raw);
          positive.push(compile_name_pattern(raw)?);
        }
      }
    }

    let path_excludes = path_excludes
      .iter()
      .map(|p| compile_glob(p.as_ref()))
      .collect::<Result<Vec<_>, _>>()?;

    Ok(Self {
      positive,
      negative,
      path_excludes,
    })
  }

  /// Adds a positive pattern after construction.
  pub fn add_positive(&mut self, pattern: &str) -> Result<(), ConfigError> {
    self.positive.push(compile_name_pattern(pattern)?);
    Ok(())
  }

  /// Checks whether `path` is selected by this set.
  pub fn matches(&self, path: &Path) -> bool {
    matches(path, &self.positive, &self.negative, &self.path_excludes)
  }
}

/// Decides set membership for one path.
///
/// Name patterns are compared against the final path component;
/// `path_excludes` against the whole path.
pub fn matches(path: &Path, positive: &[Pattern], negative: &[Pattern], path_excludes: &[Pattern]) -> bool {
  let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
    return false;
  };

  if !positive.iter().any(|p| p.matches(name)) {
    return false;
  }

  if let Some(pattern) = negative.iter().find(|p| p.matches(name)) {
    trace!("Skipping: {} (matches negative pattern {})", path.display(), pattern);
    return false;
  }

  let full_path = path.to_string_lossy().replace('\\', "/");
  if let Some(pattern) = path_excludes.iter().find(|p| p.matches(&full_path)) {
    trace!("Skipping: {} (matches path exclusion {})", path.display(), pattern);
    return false;
  }

  true
}

fn compile_name_pattern(pattern: &str) -> Result<Pattern, ConfigError> {
  if pattern.contains('/') || pattern.contains(MAIN_SEPARATOR) {
    return Err(ConfigError::PatternHasSeparator(pattern.to_string()));
  }
  compile_glob(pattern)
}

fn compile_glob(pattern: &str) -> Result<Pattern, ConfigError> {
  if pattern.is_empty() {
    return Err(ConfigError::InvalidPattern {
      pattern: pattern.to_string(),
      message: "pattern is empty".to_string(),
    });
  }
  Pattern::new(pattern).map_err(|e| ConfigError::InvalidPattern {
    pattern: pattern.to_string(),
    message: e.to_string(),
  })
}
