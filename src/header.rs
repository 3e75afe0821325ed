//! # Header Module
//!
//! The header block model: a [`HeaderSpec`] holds the header text and its
//! formatting options, and [`HeaderSpec::render`] turns it into the exact
//! lines written into files.
//!
//! A rendered header looks like this for the default options:
//!
//! ```text
//! ##############################################################################
//! # Header for
//! # all the files
//! ##############################################################################
//! ```
//!
//! ## Example
//!
//! ```rust
//! use addheader::header::{HeaderSpec, HeaderStyle};
//!
//! # fn main() -> anyhow::Result<()> {
//! let spec = HeaderSpec::new("Header for\nall the files", HeaderStyle::default())?;
//! let rendered = spec.render();
//! assert_eq!(rendered.lines().len(), 4);
//! assert_eq!(rendered.lines()[1], "# Header for\n");
//! # Ok(())
//! # }
//! ```

use crate::error::ConfigError;

/// Minimum number of delimiter characters on a delimiter line.
///
/// A line counts as a header delimiter when it starts with the comment prefix
/// followed by at least this many delimiter characters.
pub const DELIM_MINLEN: usize = 10;

/// Default delimiter length.
pub const DEFAULT_DELIM_LEN: usize = 78;

/// Formatting options for a header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderStyle {
  /// Line comment prefix, e.g. `#` or `//`.
  pub comment_prefix: String,
  /// Character repeated on the delimiter lines.
  pub delimiter_char: char,
  /// Number of delimiter characters after the prefix.
  pub delimiter_length: usize,
  /// Whether the last rendered line ends with a line terminator.
  pub trailing_newline: bool,
}

impl Default for HeaderStyle {
  fn default() -> Self {
    Self {
      comment_prefix: "#".to_string(),
      delimiter_char: '#',
      delimiter_length: DEFAULT_DELIM_LEN,
      trailing_newline: true,
    }
  }
}

/// Immutable description of a header: body text plus formatting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderSpec {
  body_text: String,
  style: HeaderStyle,
}

impl HeaderSpec {
  /// Creates a header spec, rejecting delimiters shorter than
  /// [`DELIM_MINLEN`].
  pub fn new(body_text: impl Into<String>, style: HeaderStyle) -> Result<Self, ConfigError> {
    if style.delimiter_length < DELIM_MINLEN {
      return Err(ConfigError::DelimiterTooShort(style.delimiter_length));
    }
    Ok(Self {
      body_text: body_text.into(),
      style,
    })
  }

  /// The same header with no terminator after its last line, as stored in
  /// notebook cell sources.
  pub fn for_notebook(&self) -> Self {
    Self {
      body_text: self.body_text.clone(),
      style: HeaderStyle {
        trailing_newline: false,
        ..self.style.clone()
      },
    }
  }

  /// The full delimiter line, without terminator.
  pub fn delimiter_line(&self) -> String {
    let mut line = self.style.comment_prefix.clone();
    line.extend(std::iter::repeat_n(self.style.delimiter_char, self.style.delimiter_length));
    line
  }

  /// The shortest prefix a line must start with to be treated as a delimiter.
  pub fn min_delimiter(&self) -> String {
    let mut prefix = self.style.comment_prefix.clone();
    prefix.extend(std::iter::repeat_n(self.style.delimiter_char, DELIM_MINLEN));
    prefix
  }

  /// Renders the header into its lines, each with its terminator.
  pub fn render(&self) -> RenderedHeader {
    let delimiter = self.delimiter_line();
    let prefix = &self.style.comment_prefix;

    let mut lines = Vec::with_capacity(self.body_text.lines().count() + 2);
    lines.push(delimiter.clone());
    for body_line in self.body_text.lines() {
      let line = format!("{} {}", prefix, body_line.trim());
      // Blank body lines become the bare prefix, without trailing spaces.
      lines.push(line.trim_end().to_string());
    }
    lines.push(delimiter);

    let last = lines.len() - 1;
    let lines = lines
      .into_iter()
      .enumerate()
      .map(|(i, mut line)| {
        if i < last || self.style.trailing_newline {
          line.push('\n');
        }
        line
      })
      .collect();

    RenderedHeader { lines }
  }
}

/// The rendered form of a header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedHeader {
  lines: Vec<String>,
}

impl RenderedHeader {
  /// Rendered lines in order, including line terminators.
  pub fn lines(&self) -> &[String] {
    &self.lines
  }

  /// The header as one string.
  pub fn text(&self) -> String {
    self.lines.concat()
  }
}
