//! # Configuration Module
//!
//! Settings for a run come from three places, highest priority first:
//! command-line flags, an optional `.addheader.toml` file, and built-in
//! defaults. [`Settings::resolve`] merges them and validates the result
//! before any file is touched.
//!
//! The configuration file is found via `--config`, the `ADDHEADER_CONFIG`
//! environment variable, or `.addheader.toml` in the root being scanned.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::ConfigError;
use crate::file_filter::{DEFAULT_PATTERNS, PatternSet};
use crate::header::{DEFAULT_DELIM_LEN, DELIM_MINLEN, HeaderSpec, HeaderStyle};
use crate::processor::Mode;
use crate::verbose_log;

/// The default config file name.
pub const DEFAULT_CONFIG_FILENAME: &str = ".addheader.toml";

/// Environment variable for specifying config file path.
pub const CONFIG_ENV_VAR: &str = "ADDHEADER_CONFIG";

/// Notebook suffix used when notebooks are enabled without one.
pub const DEFAULT_NOTEBOOK_SUFFIX: &str = ".ipynb";

/// `jupyter = true` or `jupyter = ".ipynb"`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum JupyterSetting {
  Enabled(bool),
  Suffix(String),
}

impl JupyterSetting {
  pub fn suffix(&self) -> Option<String> {
    match self {
      Self::Enabled(true) => Some(DEFAULT_NOTEBOOK_SUFFIX.to_string()),
      Self::Enabled(false) => None,
      Self::Suffix(suffix) => Some(suffix.clone()),
    }
  }
}

/// Contents of a `.addheader.toml` file. Every key is optional.
#[derive(Debug, Default, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
  /// Header text file; relative paths are relative to the config file.
  pub text: Option<PathBuf>,
  pub patterns: Option<Vec<String>>,
  pub path_exclude: Option<Vec<String>>,
  pub comment: Option<String>,
  pub sep: Option<String>,
  pub sep_len: Option<usize>,
  pub jupyter: Option<JupyterSetting>,
  pub empty_files: Option<bool>,
  pub jobs: Option<usize>,

  /// Directory of the file this config was loaded from.
  #[serde(skip)]
  pub base_dir: Option<PathBuf>,
}

impl Config {
  /// Load configuration from a file.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    verbose_log!("Loading config from: {}", path.display());

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ConfigRead {
      path: path.to_path_buf(),
      source: e,
    })?;

    let mut config: Config = toml::from_str(&content).map_err(|e| ConfigError::ConfigParse {
      path: path.to_path_buf(),
      source: e,
    })?;
    config.base_dir = path.parent().map(Path::to_path_buf);

    debug!("Loaded config: {:?}", config);
    Ok(config)
  }

  /// The configured header text path, resolved against the config's
  /// directory.
  pub fn text_path(&self) -> Option<PathBuf> {
    let text = self.text.as_ref()?;
    match &self.base_dir {
      Some(base) if text.is_relative() => Some(base.join(text)),
      _ => Some(text.clone()),
    }
  }
}

/// Discover the configuration file path.
///
/// The configuration file is discovered in the following order:
/// 1. Path specified via `--config` flag (passed as `explicit_path`)
/// 2. Path specified via `ADDHEADER_CONFIG` environment variable
/// 3. `.addheader.toml` in the root directory
///
/// An explicit path is returned even if it does not exist, so that loading
/// it reports the problem.
pub fn discover_config_path(explicit_path: Option<&Path>, root: &Path) -> Option<PathBuf> {
  if let Some(path) = explicit_path {
    verbose_log!("Using explicit config path: {}", path.display());
    return Some(path.to_path_buf());
  }

  if let Ok(env_path) = std::env::var(CONFIG_ENV_VAR) {
    let path = PathBuf::from(&env_path);
    if path.exists() {
      verbose_log!("Using config from {}: {}", CONFIG_ENV_VAR, path.display());
      return Some(path);
    }
    verbose_log!("{} path does not exist: {}", CONFIG_ENV_VAR, env_path);
  }

  let root_config = root.join(DEFAULT_CONFIG_FILENAME);
  if root_config.is_file() {
    verbose_log!("Using config in root: {}", root_config.display());
    return Some(root_config);
  }

  verbose_log!("No config file found");
  None
}

/// Load configuration from the discovered path.
///
/// Returns `None` when discovery is disabled or no file is found.
pub fn load_config(explicit_path: Option<&Path>, root: &Path, no_config: bool) -> Result<Option<Config>, ConfigError> {
  if no_config {
    verbose_log!("Config file discovery disabled (--no-config)");
    return Ok(None);
  }

  discover_config_path(explicit_path, root)
    .map(|path| Config::load(&path))
    .transpose()
}

/// Values given on the command line. `None` and empty lists defer to the
/// config file.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
  pub text: Option<PathBuf>,
  pub patterns: Vec<String>,
  pub path_exclude: Vec<String>,
  pub comment: Option<String>,
  pub sep: Option<String>,
  pub sep_len: Option<usize>,
  pub jupyter: Option<String>,
  pub empty_files: bool,
  pub jobs: Option<usize>,
}

/// Fully resolved and validated settings for one run.
#[derive(Debug, Clone)]
pub struct Settings {
  pub root: PathBuf,
  pub mode: Mode,
  pub text_path: Option<PathBuf>,
  pub patterns: PatternSet,
  pub style: HeaderStyle,
  pub notebook_suffix: Option<String>,
  pub allow_empty_files: bool,
  pub jobs: usize,
}

impl Settings {
  /// Merges `overrides` over `config` over the defaults.
  ///
  /// # Errors
  ///
  /// Returns a [`ConfigError`] for invalid patterns, a bad delimiter, a
  /// missing root directory, or a missing header text in replace mode.
  pub fn resolve(
    root: &Path,
    mode: Mode,
    overrides: Overrides,
    config: Option<&Config>,
  ) -> Result<Self, ConfigError> {
    let empty = Config::default();
    let config = config.unwrap_or(&empty);

    if !root.is_dir() {
      return Err(ConfigError::RootNotFound(root.to_path_buf()));
    }

    let style = resolve_style(&overrides, config)?;

    let text_path = overrides.text.or_else(|| config.text_path());
    if mode == Mode::Replace && text_path.is_none() {
      return Err(ConfigError::ConfigInvalid {
        key: "text".to_string(),
        message: "a header text file is required unless removing or checking headers".to_string(),
      });
    }

    let patterns = pick_list(overrides.patterns, config.patterns.as_ref())
      .unwrap_or_else(|| DEFAULT_PATTERNS.iter().map(|p| p.to_string()).collect());
    let path_exclude = pick_list(overrides.path_exclude, config.path_exclude.as_ref()).unwrap_or_default();
    let patterns = PatternSet::parse(&patterns, &path_exclude)?;

    let notebook_suffix = match overrides.jupyter {
      Some(suffix) => Some(suffix),
      None => config.jupyter.as_ref().and_then(JupyterSetting::suffix),
    };
    if notebook_suffix.as_deref() == Some("") {
      return Err(ConfigError::ConfigInvalid {
        key: "jupyter".to_string(),
        message: "notebook suffix cannot be empty".to_string(),
      });
    }

    let jobs = overrides.jobs.or(config.jobs).unwrap_or(1);
    if jobs == 0 {
      return Err(ConfigError::ConfigInvalid {
        key: "jobs".to_string(),
        message: "must be at least 1".to_string(),
      });
    }

    Ok(Self {
      root: root.to_path_buf(),
      mode,
      text_path,
      patterns,
      style,
      notebook_suffix,
      allow_empty_files: overrides.empty_files || config.empty_files.unwrap_or(false),
      jobs,
    })
  }

  /// Reads the header text and builds the header spec.
  ///
  /// Without a text path (remove or check runs) the header body is empty;
  /// only the delimiter matters for those modes.
  pub fn header_spec(&self) -> Result<HeaderSpec, ConfigError> {
    let body = match &self.text_path {
      Some(path) => std::fs::read_to_string(path).map_err(|e| ConfigError::TextRead {
        path: path.clone(),
        source: e,
      })?,
      None => String::new(),
    };
    HeaderSpec::new(body, self.style.clone())
  }
}

fn pick_list(cli: Vec<String>, config: Option<&Vec<String>>) -> Option<Vec<String>> {
  if !cli.is_empty() {
    return Some(cli);
  }
  config.cloned()
}

fn resolve_style(overrides: &Overrides, config: &Config) -> Result<HeaderStyle, ConfigError> {
  let defaults = HeaderStyle::default();

  let comment_prefix = overrides
    .comment
    .clone()
    .or_else(|| config.comment.clone())
    .unwrap_or(defaults.comment_prefix);
  if comment_prefix.is_empty() || comment_prefix.trim() != comment_prefix {
    return Err(ConfigError::ConfigInvalid {
      key: "comment".to_string(),
      message: format!("\"{}\" must be non-empty with no surrounding whitespace", comment_prefix),
    });
  }

  let delimiter_char = match overrides.sep.as_deref().or(config.sep.as_deref()) {
    None => defaults.delimiter_char,
    Some(sep) => {
      let mut chars = sep.chars();
      match (chars.next(), chars.next()) {
        (Some(c), None) if !c.is_whitespace() => c,
        (Some(_), None) => {
          return Err(ConfigError::ConfigInvalid {
            key: "sep".to_string(),
            message: "delimiter character cannot be whitespace".to_string(),
          });
        }
        _ => {
          return Err(ConfigError::ConfigInvalid {
            key: "sep".to_string(),
            message: format!("\"{}\" must be exactly one character", sep),
          });
        }
      }
    }
  };

  let delimiter_length = overrides.sep_len.or(config.sep_len).unwrap_or(DEFAULT_DELIM_LEN);
  if delimiter_length < DELIM_MINLEN {
    return Err(ConfigError::DelimiterTooShort(delimiter_length));
  }

  Ok(HeaderStyle {
    comment_prefix,
    delimiter_char,
    delimiter_length,
    trailing_newline: true,
  })
}
