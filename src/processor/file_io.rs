//! # File I/O Module
//!
//! Atomic in-place rewrites.
//!
//! A [`Relocation`] moves a file to a uniquely named sibling, so the caller
//! can stream the new content into the original path. It must then be
//! finished with [`Relocation::commit`] (keep the new content) or
//! [`Relocation::restore`] (put the original back). Dropping an unfinished
//! relocation restores the original.

use std::fs::{self, File, Permissions};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use tracing::{error, trace};

use crate::error::FileError;

/// Marker placed between the file name and the random token.
const TEMP_MARKER: &str = ".orig.";

/// A file moved aside while its replacement is written.
#[derive(Debug)]
pub struct Relocation {
  original: PathBuf,
  temp: PathBuf,
  permissions: Permissions,
  finished: bool,
}

impl Relocation {
  /// Renames `path` to a sibling named `<name>.orig.<token>`.
  pub fn begin(path: &Path) -> Result<Self, FileError> {
    let permissions = fs::metadata(path)
      .map_err(|e| FileError::io(path, "read metadata", e))?
      .permissions();
    let temp = temp_sibling(path);

    fs::rename(path, &temp).map_err(|e| FileError::io(path, "relocate to temporary file", e))?;
    trace!("Moved {} to {}", path.display(), temp.display());

    Ok(Self {
      original: path.to_path_buf(),
      temp,
      permissions,
      finished: false,
    })
  }

  /// Opens the relocated original for reading.
  pub fn reader(&self) -> Result<BufReader<File>, FileError> {
    let file = File::open(&self.temp).map_err(|e| FileError::io(&self.original, "open original", e))?;
    Ok(BufReader::new(file))
  }

  /// Creates the replacement file at the original path.
  pub fn writer(&self) -> Result<BufWriter<File>, FileError> {
    let file = File::create(&self.original).map_err(|e| FileError::io(&self.original, "create output", e))?;
    Ok(BufWriter::new(file))
  }

  /// Keeps the new content: reapplies the original permission bits and
  /// deletes the temporary copy.
  pub fn commit(mut self) -> Result<(), FileError> {
    self.finished = true;
    let permissions = fs::set_permissions(&self.original, self.permissions.clone());
    let removed = fs::remove_file(&self.temp);
    permissions.map_err(|e| FileError::io(&self.original, "restore permissions", e))?;
    removed.map_err(|e| FileError::io(&self.temp, "remove temporary file", e))
  }

  /// Discards whatever was written and moves the original back.
  pub fn restore(mut self) -> Result<(), FileError> {
    self.finished = true;
    self.move_back()
  }

  fn move_back(&self) -> Result<(), FileError> {
    match fs::remove_file(&self.original) {
      Ok(()) => {}
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
      Err(e) => return Err(FileError::io(&self.original, "discard partial output", e)),
    }
    fs::rename(&self.temp, &self.original).map_err(|e| FileError::io(&self.original, "restore original", e))?;
    trace!("Restored {} from {}", self.original.display(), self.temp.display());
    Ok(())
  }
}

impl Drop for Relocation {
  fn drop(&mut self) {
    if self.finished {
      return;
    }
    if let Err(e) = self.move_back() {
      error!(
        "Unable to restore {} from {}: {}. You must fix it manually!",
        self.original.display(),
        self.temp.display(),
        e
      );
    }
  }
}

/// Builds `<dir>/<name>.orig.<random hex>`; the token makes concurrent runs
/// over the same tree pick different names.
fn temp_sibling(path: &Path) -> PathBuf {
  let name = path.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default();
  let token: u64 = rand::random();
  path.with_file_name(format!("{}{}{:016x}", name, TEMP_MARKER, token))
}
