#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde_json::{Value, json};

pub const BODY: &str = "Header for\nall the files";

/// Default-style delimiter line without terminator.
pub fn delimiter() -> String {
  format!("#{}", "#".repeat(78))
}

/// The rendered default-style header for `BODY`.
pub fn rendered_header() -> String {
  let delim = delimiter();
  format!("{delim}\n# Header for\n# all the files\n{delim}\n")
}

/// Creates this tree under `root` and returns the package directory:
///
/// ```text
/// mypackage/
///   __init__.py
///   foo.py
///   bar.py
///   tests/
///     __init__.py
///     test_foo.py
///     test_bar.py
/// ```
///
/// Every file holds one line of code so it is not skipped as empty.
pub fn make_source_tree(root: &Path) -> Result<PathBuf> {
  let package = root.join("mypackage");
  let tests = package.join("tests");
  fs::create_dir_all(&tests)?;
  for name in ["__init__.py", "foo.py", "bar.py"] {
    fs::write(package.join(name), format!("# {name}\nx = 1\n"))?;
  }
  for name in ["__init__.py", "test_foo.py", "test_bar.py"] {
    fs::write(tests.join(name), format!("def {}():\n    pass\n", name.trim_end_matches(".py")))?;
  }
  Ok(package)
}

/// Writes `BODY` to `header.txt` in `dir`.
pub fn write_header_text(dir: &Path) -> Result<PathBuf> {
  let path = dir.join("header.txt");
  fs::write(&path, format!("{BODY}\n"))?;
  Ok(path)
}

/// A minimal nbformat 4.4 notebook with one markdown and one code cell.
pub fn notebook() -> Value {
  json!({
    "cells": [
      { "cell_type": "markdown", "metadata": {}, "source": ["# Analysis"] },
      {
        "cell_type": "code",
        "execution_count": 1,
        "metadata": {},
        "outputs": [],
        "source": ["import numpy as np\n", "np.zeros(3)"]
      }
    ],
    "metadata": { "kernelspec": { "name": "python3" } },
    "nbformat": 4,
    "nbformat_minor": 4
  })
}

pub fn write_notebook(path: &Path, notebook: &Value) -> Result<()> {
  fs::write(path, serde_json::to_string_pretty(notebook)?)?;
  Ok(())
}

pub fn read_notebook(path: &Path) -> Result<Value> {
  Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
}

/// Names of all entries in `dir`, sorted.
pub fn dir_entries(dir: &Path) -> Result<Vec<String>> {
  let mut names = fs::read_dir(dir)?
    .map(|entry| entry.map(|e| e.file_name().to_string_lossy().to_string()))
    .collect::<Result<Vec<_>, _>>()?;
  names.sort();
  Ok(names)
}
