//! # Text Engine Module
//!
//! Header detection and rewriting for plain-text files.
//!
//! A file is read line by line in a single pass. Each line falls into one of
//! three zones:
//!
//! - [`Zone::Pre`]: lines before any header. Shebang and encoding lines in
//!   the first three lines stay here and are copied unchanged.
//! - [`Zone::Header`]: from an opening delimiter line up to and including the
//!   closing one. These lines are never copied.
//! - [`Zone::Post`]: everything after the header, copied unchanged.
//!
//! Whitespace-only lines met in `Pre` are held back until the next line
//! decides where they belong, which is what keeps empty and whitespace-only
//! files untouched unless empty-file insertion is enabled.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{error, trace, warn};

use super::Mode;
use super::file_io::Relocation;
use crate::error::FileError;
use crate::header::HeaderSpec;

/// Only this many leading lines may be magic lines.
pub const MAGIC_LINE_LIMIT: usize = 3;

/// Shebangs and encoding declarations.
static MAGIC_LINE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^[ \t\f]*#(.*?coding[:=][ \t]*[-_.a-zA-Z0-9]+|!/.*)").expect("magic line regex must compile")
});

/// Which part of the file the scan is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
  Pre,
  Header,
  Post,
}

/// What a pass over one file found and did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextOutcome {
  /// A complete header, opening and closing delimiter, was seen.
  pub detected: bool,
  /// The output differs from the input.
  pub changed: bool,
  /// An opening delimiter was seen but the file ended before it closed.
  pub unterminated: bool,
}

/// Failure while streaming a file through the engine.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
  #[error("line {line} is not valid UTF-8")]
  Decoding { line: usize },

  #[error(transparent)]
  Io(#[from] io::Error),
}

impl StreamError {
  fn into_file_error(self, path: &Path) -> FileError {
    match self {
      Self::Decoding { line } => FileError::Decoding {
        path: path.to_path_buf(),
        line,
      },
      Self::Io(e) => FileError::io(path, "rewrite", e),
    }
  }
}

/// Replaces, removes or detects headers in plain-text files.
#[derive(Debug, Clone)]
pub struct TextEngine {
  header: String,
  min_delimiter: String,
  allow_empty_files: bool,
}

impl TextEngine {
  /// Creates an engine for `spec`.
  ///
  /// With `allow_empty_files`, empty and whitespace-only files receive a
  /// header in [`Mode::Replace`]; otherwise they are left alone.
  pub fn new(spec: &HeaderSpec, allow_empty_files: bool) -> Self {
    Self {
      header: spec.render().text(),
      min_delimiter: spec.min_delimiter(),
      allow_empty_files,
    }
  }

  /// Streams `input` to `output`, applying `mode`.
  ///
  /// In [`Mode::Detect`] nothing is written and reading stops once the answer
  /// is known.
  pub fn rewrite<R: BufRead, W: Write>(&self, mode: Mode, mut input: R, output: W) -> Result<TextOutcome, StreamError> {
    let mut scan = Scan::new(self, mode, output);
    let mut line = String::new();

    loop {
      line.clear();
      match input.read_line(&mut line) {
        Ok(0) => break,
        Ok(_) => {}
        Err(e) if e.kind() == io::ErrorKind::InvalidData => {
          return Err(StreamError::Decoding { line: scan.index + 1 });
        }
        Err(e) => return Err(e.into()),
      }

      scan.step(&line)?;
      if scan.is_settled() {
        break;
      }
    }

    Ok(scan.finish()?)
  }

  /// Applies `mode` to the file at `path`.
  ///
  /// Rewrites go through a [`Relocation`]: the original is moved aside, the
  /// new content is streamed into place, and the original is restored when
  /// decoding fails, when the header is unterminated, or when nothing
  /// changed.
  pub fn process_file(&self, path: &Path, mode: Mode) -> Result<TextOutcome, FileError> {
    if mode == Mode::Detect {
      let file = File::open(path).map_err(|e| FileError::io(path, "open", e))?;
      let outcome = self
        .rewrite(mode, BufReader::new(file), io::sink())
        .map_err(|e| e.into_file_error(path))?;
      return check_terminated(path, outcome);
    }

    let relocation = Relocation::begin(path)?;
    match self.stream_relocated(&relocation, mode, path) {
      Ok(outcome) if outcome.changed && !outcome.unterminated => {
        relocation.commit()?;
        Ok(outcome)
      }
      Ok(outcome) => {
        trace!("No change to {}, restoring original", path.display());
        relocation.restore()?;
        check_terminated(path, outcome)
      }
      Err(e) => {
        error!("{}", e);
        warn!("Restoring original file '{}'", path.display());
        if let Err(restore_err) = relocation.restore() {
          error!("{}. You must fix it manually!", restore_err);
        }
        Err(e)
      }
    }
  }

  fn stream_relocated(&self, relocation: &Relocation, mode: Mode, path: &Path) -> Result<TextOutcome, FileError> {
    let reader = relocation.reader()?;
    let mut writer = relocation.writer()?;
    self
      .rewrite(mode, reader, &mut writer)
      .map_err(|e| e.into_file_error(path))
  }

  fn is_delimiter(&self, trimmed: &str) -> bool {
    trimmed.starts_with(&self.min_delimiter)
  }
}

fn check_terminated(path: &Path, outcome: TextOutcome) -> Result<TextOutcome, FileError> {
  if outcome.unterminated {
    warn!("{}: header opened but never closed", path.display());
    return Err(FileError::unterminated_header(path));
  }
  Ok(outcome)
}

/// State of one pass over one file.
struct Scan<'a, W: Write> {
  engine: &'a TextEngine,
  mode: Mode,
  out: W,
  zone: Zone,
  /// 0-based index of the next line.
  index: usize,
  /// Non-whitespace bytes seen while in `Pre`.
  content_len: usize,
  /// Whitespace-only lines waiting for a decision.
  held: String,
  /// Raw lines of the existing header, delimiters included.
  old_header: String,
  emitted_any: bool,
  last_terminated: bool,
  outcome: TextOutcome,
}

impl<'a, W: Write> Scan<'a, W> {
  fn new(engine: &'a TextEngine, mode: Mode, out: W) -> Self {
    Self {
      engine,
      mode,
      out,
      zone: Zone::Pre,
      index: 0,
      content_len: 0,
      held: String::new(),
      old_header: String::new(),
      emitted_any: false,
      last_terminated: true,
      outcome: TextOutcome::default(),
    }
  }

  fn step(&mut self, line: &str) -> io::Result<()> {
    self.zone = match self.zone {
      Zone::Pre => self.on_pre(line)?,
      Zone::Header => self.on_header(line)?,
      Zone::Post => self.on_post(line)?,
    };
    self.index += 1;
    Ok(())
  }

  /// Detection needs nothing past the header.
  fn is_settled(&self) -> bool {
    self.mode == Mode::Detect && self.zone == Zone::Post
  }

  fn on_pre(&mut self, line: &str) -> io::Result<Zone> {
    let trimmed = line.trim();

    if self.engine.is_delimiter(trimmed) {
      self.release_held()?;
      self.old_header.push_str(line);
      return Ok(Zone::Header);
    }

    if self.index < MAGIC_LINE_LIMIT && MAGIC_LINE.is_match(trimmed) {
      self.content_len += trimmed.len();
      self.release_held()?;
      self.emit(line)?;
      return Ok(Zone::Pre);
    }

    if trimmed.is_empty() {
      self.held.push_str(line);
      return Ok(Zone::Pre);
    }

    self.content_len += trimmed.len();
    if self.mode == Mode::Replace {
      self.write_header()?;
      self.outcome.changed = true;
    }
    self.release_held()?;
    self.emit(line)?;
    Ok(Zone::Post)
  }

  fn on_header(&mut self, line: &str) -> io::Result<Zone> {
    self.old_header.push_str(line);
    if !self.engine.is_delimiter(line.trim()) {
      return Ok(Zone::Header);
    }

    self.outcome.detected = true;
    match self.mode {
      Mode::Replace => {
        if self.old_header != self.engine.header {
          self.outcome.changed = true;
        }
        self.write_header()?;
      }
      Mode::Remove => self.outcome.changed = true,
      Mode::Detect => {}
    }
    Ok(Zone::Post)
  }

  fn on_post(&mut self, line: &str) -> io::Result<Zone> {
    self.emit(line)?;
    Ok(Zone::Post)
  }

  fn finish(mut self) -> io::Result<TextOutcome> {
    match self.zone {
      Zone::Pre => {
        let has_content = self.content_len > 0 || self.engine.allow_empty_files;
        if self.mode == Mode::Replace && has_content {
          if self.emitted_any && !self.last_terminated {
            self.emit("\n")?;
          }
          self.write_header()?;
          self.outcome.changed = true;
        }
        self.release_held()?;
      }
      Zone::Header => {
        self.outcome.detected = false;
        self.outcome.unterminated = true;
      }
      Zone::Post => {}
    }
    self.out.flush()?;
    Ok(self.outcome)
  }

  fn release_held(&mut self) -> io::Result<()> {
    if self.held.is_empty() {
      return Ok(());
    }
    let held = std::mem::take(&mut self.held);
    self.emit(&held)
  }

  fn write_header(&mut self) -> io::Result<()> {
    let header = &self.engine.header;
    self.out.write_all(header.as_bytes())?;
    self.emitted_any = true;
    self.last_terminated = header.ends_with('\n');
    Ok(())
  }

  fn emit(&mut self, text: &str) -> io::Result<()> {
    if self.mode == Mode::Detect {
      return Ok(());
    }
    self.out.write_all(text.as_bytes())?;
    self.emitted_any = true;
    self.last_terminated = text.ends_with('\n');
    Ok(())
  }
}
