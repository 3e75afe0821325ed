//! # Notebook Engine Module
//!
//! Header handling for Jupyter notebooks. The header lives in its own code
//! cell, found by the `header` tag in the cell metadata, instead of in
//! comment lines.

use std::fs;
use std::io::Write;
use std::path::Path;

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Serializer, Value, json};
use tracing::{debug, error, warn};

use super::Mode;
use super::file_io::Relocation;
use crate::error::FileError;
use crate::header::HeaderSpec;

/// Tag marking the header cell.
pub const HEADER_TAG: &str = "header";

/// Tag asking notebook renderers to collapse the cell.
pub const HIDE_TAG: &str = "hide-cell";

/// Why a notebook could not be handled.
#[derive(Debug, thiserror::Error)]
pub enum NotebookError {
  #[error("not a valid notebook: {0}")]
  Parse(#[from] serde_json::Error),

  #[error("notebook has no \"cells\" list")]
  MissingCells,

  #[error("notebook has no cells")]
  Empty,
}

/// What a pass over one notebook found and did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NotebookOutcome {
  pub detected: bool,
  pub changed: bool,
}

/// Replaces, removes or detects the header cell of notebooks.
#[derive(Debug, Clone)]
pub struct NotebookEngine {
  source: Vec<String>,
}

impl NotebookEngine {
  pub fn new(spec: &HeaderSpec) -> Self {
    Self {
      source: spec.for_notebook().render().lines().to_vec(),
    }
  }

  /// Applies `mode` to a parsed notebook.
  pub fn apply(&self, mode: Mode, notebook: &mut Value) -> Result<NotebookOutcome, NotebookError> {
    let with_id = wants_cell_ids(notebook);
    let cells = notebook
      .get_mut("cells")
      .and_then(Value::as_array_mut)
      .ok_or(NotebookError::MissingCells)?;
    if cells.is_empty() {
      return Err(NotebookError::Empty);
    }

    let position = cells.iter().position(is_header_cell);
    let outcome = match (mode, position) {
      (Mode::Detect, found) => NotebookOutcome {
        detected: found.is_some(),
        changed: false,
      },
      (Mode::Remove, Some(index)) => {
        cells.remove(index);
        NotebookOutcome {
          detected: true,
          changed: true,
        }
      }
      (Mode::Remove, None) => NotebookOutcome::default(),
      (Mode::Replace, Some(index)) => NotebookOutcome {
        detected: true,
        changed: self.update_cell(&mut cells[index]),
      },
      (Mode::Replace, None) => {
        cells.insert(0, self.new_cell(with_id));
        NotebookOutcome {
          detected: false,
          changed: true,
        }
      }
    };
    Ok(outcome)
  }

  /// Applies `mode` to notebook JSON text. The returned text is only
  /// meaningful when the outcome reports a change.
  pub fn rewrite_str(&self, mode: Mode, content: &str) -> Result<(String, NotebookOutcome), NotebookError> {
    let mut notebook: Value = serde_json::from_str(content)?;
    let outcome = self.apply(mode, &mut notebook)?;
    if !outcome.changed {
      return Ok((content.to_string(), outcome));
    }
    Ok((to_notebook_json(&notebook)?, outcome))
  }

  /// Applies `mode` to the notebook at `path`.
  pub fn process_file(&self, path: &Path, mode: Mode) -> Result<NotebookOutcome, FileError> {
    let content = fs::read_to_string(path).map_err(|e| FileError::io(path, "read", e))?;
    let (output, outcome) = self.rewrite_str(mode, &content).map_err(|e| {
      warn!("Skipping notebook {}: {}", path.display(), e);
      FileError::structural(path, e.to_string())
    })?;

    if !outcome.changed {
      debug!("No change to notebook {}", path.display());
      return Ok(outcome);
    }

    let relocation = Relocation::begin(path)?;
    match write_all(&relocation, path, &output) {
      Ok(()) => {
        relocation.commit()?;
        Ok(outcome)
      }
      Err(e) => {
        error!("{}", e);
        if let Err(restore_err) = relocation.restore() {
          error!("{}. You must fix it manually!", restore_err);
        }
        Err(e)
      }
    }
  }

  /// Rewrites an existing header cell. Returns whether anything changed.
  fn update_cell(&self, cell: &mut Value) -> bool {
    let Some(cell) = cell.as_object_mut() else {
      return false;
    };
    let mut changed = false;

    let source = json!(self.source);
    if cell.get("source") != Some(&source) {
      cell.insert("source".to_string(), source);
      changed = true;
    }

    let tags = cell
      .get_mut("metadata")
      .and_then(|m| m.get_mut("tags"))
      .and_then(Value::as_array_mut);
    if let Some(tags) = tags {
      if !tags.iter().any(|t| t.as_str() == Some(HIDE_TAG)) {
        tags.push(json!(HIDE_TAG));
        changed = true;
      }
    }

    changed
  }

  fn new_cell(&self, with_id: bool) -> Value {
    let mut cell = Map::new();
    cell.insert("cell_type".to_string(), json!("code"));
    cell.insert("execution_count".to_string(), Value::Null);
    if with_id {
      cell.insert("id".to_string(), json!(format!("{:08x}", rand::random::<u32>())));
    }
    cell.insert("metadata".to_string(), json!({ "tags": [HEADER_TAG, HIDE_TAG] }));
    cell.insert("outputs".to_string(), json!([]));
    cell.insert("source".to_string(), json!(self.source));
    Value::Object(cell)
  }
}

/// True for a code cell tagged `header`.
pub fn is_header_cell(cell: &Value) -> bool {
  let is_code = cell.get("cell_type").and_then(Value::as_str) == Some("code");
  is_code
    && cell
      .pointer("/metadata/tags")
      .and_then(Value::as_array)
      .is_some_and(|tags| tags.iter().any(|t| t.as_str() == Some(HEADER_TAG)))
}

/// Cell ids are part of the format from nbformat 4.5 on.
fn wants_cell_ids(notebook: &Value) -> bool {
  let major = notebook.get("nbformat").and_then(Value::as_u64).unwrap_or(0);
  let minor = notebook.get("nbformat_minor").and_then(Value::as_u64).unwrap_or(0);
  major > 4 || (major == 4 && minor >= 5)
}

/// Serializes like Jupyter does: one-space indent, trailing newline.
pub fn to_notebook_json(notebook: &Value) -> Result<String, serde_json::Error> {
  let mut buf = Vec::new();
  let mut serializer = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b" "));
  notebook.serialize(&mut serializer)?;
  buf.push(b'\n');
  Ok(String::from_utf8_lossy(&buf).into_owned())
}

fn write_all(relocation: &Relocation, path: &Path, output: &str) -> Result<(), FileError> {
  let mut writer = relocation.writer()?;
  writer
    .write_all(output.as_bytes())
    .and_then(|()| writer.flush())
    .map_err(|e| FileError::io(path, "write", e))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::header::HeaderStyle;

  fn engine() -> NotebookEngine {
    let style = HeaderStyle {
      delimiter_length: 10,
      ..HeaderStyle::default()
    };
    NotebookEngine::new(&HeaderSpec::new("Copyright", style).unwrap())
  }

  fn expected_source() -> Value {
    json!(["###########\n", "# Copyright\n", "###########"])
  }

  fn notebook(cells: Value, minor: u64) -> Value {
    json!({
      "cells": cells,
      "metadata": {},
      "nbformat": 4,
      "nbformat_minor": minor
    })
  }

  fn code_cell(source: &str, tags: &[&str]) -> Value {
    json!({
      "cell_type": "code",
      "execution_count": 1,
      "metadata": { "tags": tags },
      "outputs": [],
      "source": [source]
    })
  }

  #[test]
  fn test_replace_inserts_header_cell_first() {
    let mut nb = notebook(json!([code_cell("print(1)", &[])]), 4);
    let outcome = engine().apply(Mode::Replace, &mut nb).unwrap();

    assert!(outcome.changed);
    assert!(!outcome.detected);
    let cells = nb["cells"].as_array().unwrap();
    assert_eq!(cells.len(), 2);
    assert_eq!(cells[0]["source"], expected_source());
    assert_eq!(cells[0]["metadata"]["tags"], json!([HEADER_TAG, HIDE_TAG]));
    assert_eq!(cells[0]["execution_count"], Value::Null);
    assert!(cells[0].get("id").is_none());
    assert_eq!(cells[1]["source"], json!(["print(1)"]));
  }

  #[test]
  fn test_new_header_cell_gets_id_on_recent_format() {
    let mut nb = notebook(json!([code_cell("x", &[])]), 5);
    engine().apply(Mode::Replace, &mut nb).unwrap();
    let id = nb["cells"][0]["id"].as_str().unwrap();
    assert_eq!(id.len(), 8);
  }

  #[test]
  fn test_replace_updates_existing_header_cell_in_place() {
    let mut nb = notebook(
      json!([{ "cell_type": "markdown", "metadata": {}, "source": ["# Title"] }, code_cell("old", &["header"])]),
      4,
    );
    let outcome = engine().apply(Mode::Replace, &mut nb).unwrap();

    assert!(outcome.detected);
    assert!(outcome.changed);
    let cells = nb["cells"].as_array().unwrap();
    assert_eq!(cells.len(), 2);
    assert_eq!(cells[1]["source"], expected_source());
    assert_eq!(cells[1]["metadata"]["tags"], json!(["header", HIDE_TAG]));
  }

  #[test]
  fn test_replace_is_idempotent() {
    let engine = engine();
    let mut nb = notebook(json!([code_cell("x", &[])]), 4);
    engine.apply(Mode::Replace, &mut nb).unwrap();
    let snapshot = nb.clone();

    let outcome = engine.apply(Mode::Replace, &mut nb).unwrap();
    assert!(outcome.detected);
    assert!(!outcome.changed);
    assert_eq!(nb, snapshot);
  }

  #[test]
  fn test_hide_tag_is_not_duplicated() {
    let mut nb = notebook(json!([code_cell("old", &["header", "hide-cell"])]), 4);
    engine().apply(Mode::Replace, &mut nb).unwrap();
    assert_eq!(nb["cells"][0]["metadata"]["tags"], json!(["header", "hide-cell"]));
  }

  #[test]
  fn test_markdown_cell_with_header_tag_is_ignored() {
    let cell = json!({ "cell_type": "markdown", "metadata": { "tags": ["header"] }, "source": [] });
    assert!(!is_header_cell(&cell));
    assert!(is_header_cell(&code_cell("x", &["header"])));
  }

  #[test]
  fn test_remove_deletes_header_cell() {
    let mut nb = notebook(json!([code_cell("h", &["header"]), code_cell("body", &[])]), 4);
    let outcome = engine().apply(Mode::Remove, &mut nb).unwrap();
    assert!(outcome.changed);
    assert_eq!(nb["cells"].as_array().unwrap().len(), 1);
    assert_eq!(nb["cells"][0]["source"], json!(["body"]));
  }

  #[test]
  fn test_remove_without_header_is_noop() {
    let mut nb = notebook(json!([code_cell("body", &[])]), 4);
    let snapshot = nb.clone();
    let outcome = engine().apply(Mode::Remove, &mut nb).unwrap();
    assert_eq!(outcome, NotebookOutcome::default());
    assert_eq!(nb, snapshot);
  }

  #[test]
  fn test_detect_finds_only_first_header_cell() {
    let mut nb = notebook(json!([code_cell("a", &["header"]), code_cell("b", &["header"])]), 4);
    let outcome = engine().apply(Mode::Detect, &mut nb).unwrap();
    assert!(outcome.detected);
    assert!(!outcome.changed);

    engine().apply(Mode::Remove, &mut nb).unwrap();
    assert_eq!(nb["cells"].as_array().unwrap().len(), 1);
    assert_eq!(nb["cells"][0]["source"], json!(["b"]));
  }

  #[test]
  fn test_empty_and_missing_cells_are_errors() {
    let mut empty = notebook(json!([]), 4);
    assert!(matches!(
      engine().apply(Mode::Replace, &mut empty),
      Err(NotebookError::Empty)
    ));

    let mut missing = json!({ "metadata": {} });
    assert!(matches!(
      engine().apply(Mode::Detect, &mut missing),
      Err(NotebookError::MissingCells)
    ));
  }

  #[test]
  fn test_malformed_json_is_parse_error() {
    let err = engine().rewrite_str(Mode::Replace, "{ not json").unwrap_err();
    assert!(matches!(err, NotebookError::Parse(_)));
  }

  #[test]
  fn test_output_uses_one_space_indent_and_keeps_key_order() {
    let content = r#"{"metadata": {"z": 1, "a": 2}, "cells": [{"cell_type": "code", "metadata": {}, "outputs": [], "source": [], "execution_count": null}], "nbformat": 4, "nbformat_minor": 4}"#;
    let (output, _) = engine().rewrite_str(Mode::Replace, content).unwrap();

    assert!(output.starts_with("{\n \"metadata\": {\n  \"z\": 1,\n  \"a\": 2\n }"));
    assert!(output.ends_with("}\n"));
  }

  #[test]
  fn test_unchanged_notebook_text_is_returned_verbatim() {
    let content = r#"{"cells": [{"cell_type": "code", "metadata": {}, "source": []}]}"#;
    let (output, outcome) = engine().rewrite_str(Mode::Remove, content).unwrap();
    assert!(!outcome.changed);
    assert_eq!(output, content);
  }
}
