mod common;

use std::fs;

use addheader::error::FileError;
use addheader::header::{HeaderSpec, HeaderStyle};
use addheader::processor::notebook_engine::{HEADER_TAG, HIDE_TAG};
use addheader::processor::{Mode, NotebookEngine};
use anyhow::Result;
use common::{BODY, delimiter, dir_entries, notebook, read_notebook, write_notebook};
use serde_json::json;
use tempfile::tempdir;

fn engine() -> Result<NotebookEngine> {
  Ok(NotebookEngine::new(&HeaderSpec::new(BODY, HeaderStyle::default())?))
}

#[test]
fn test_header_cell_added_then_replaced_in_place() -> Result<()> {
  let dir = tempdir()?;
  let path = dir.path().join("analysis.ipynb");
  write_notebook(&path, &notebook())?;
  let engine = engine()?;

  let outcome = engine.process_file(&path, Mode::Replace)?;
  assert!(outcome.changed);
  assert!(!outcome.detected);

  let nb = read_notebook(&path)?;
  let cells = nb["cells"].as_array().unwrap();
  assert_eq!(cells.len(), 3);
  assert_eq!(cells[0]["cell_type"], "code");
  assert_eq!(cells[0]["metadata"]["tags"], json!([HEADER_TAG, HIDE_TAG]));
  assert_eq!(
    cells[0]["source"],
    json!([
      format!("{}\n", delimiter()),
      "# Header for\n",
      "# all the files\n",
      delimiter()
    ])
  );
  assert_eq!(nb["metadata"], notebook()["metadata"]);

  let written = fs::read_to_string(&path)?;
  let again = engine.process_file(&path, Mode::Replace)?;
  assert!(again.detected);
  assert!(!again.changed);
  assert_eq!(fs::read_to_string(&path)?, written);
  assert_eq!(dir_entries(dir.path())?, vec!["analysis.ipynb"]);
  Ok(())
}

#[test]
fn test_remove_deletes_only_header_cell() -> Result<()> {
  let dir = tempdir()?;
  let path = dir.path().join("analysis.ipynb");
  write_notebook(&path, &notebook())?;
  let engine = engine()?;

  engine.process_file(&path, Mode::Replace)?;
  let removed = engine.process_file(&path, Mode::Remove)?;
  assert!(removed.changed);

  let nb = read_notebook(&path)?;
  assert_eq!(nb["cells"], notebook()["cells"]);
  assert!(!engine.process_file(&path, Mode::Detect)?.detected);
  Ok(())
}

#[test]
fn test_existing_tagged_cell_is_reused() -> Result<()> {
  let dir = tempdir()?;
  let path = dir.path().join("tagged.ipynb");
  let mut nb = notebook();
  nb["cells"][1]["metadata"] = json!({ "tags": ["header"] });
  write_notebook(&path, &nb)?;

  let outcome = engine()?.process_file(&path, Mode::Replace)?;
  assert!(outcome.detected);

  let nb = read_notebook(&path)?;
  let cells = nb["cells"].as_array().unwrap();
  assert_eq!(cells.len(), 2);
  assert_eq!(cells[1]["metadata"]["tags"], json!(["header", HIDE_TAG]));
  assert_eq!(cells[1]["source"][1], "# Header for\n");
  Ok(())
}

#[test]
fn test_malformed_notebook_is_structural_error() -> Result<()> {
  let dir = tempdir()?;
  let path = dir.path().join("broken.ipynb");
  fs::write(&path, "{\"cells\": [")?;

  let err = engine()?.process_file(&path, Mode::Replace).unwrap_err();
  assert!(matches!(err, FileError::Structural { warning: false, .. }));
  assert_eq!(fs::read_to_string(&path)?, "{\"cells\": [");
  Ok(())
}

#[test]
fn test_empty_notebook_is_skipped_with_error() -> Result<()> {
  let dir = tempdir()?;
  let path = dir.path().join("empty.ipynb");
  let content = "{\"cells\": [], \"metadata\": {}, \"nbformat\": 4, \"nbformat_minor\": 5}";
  fs::write(&path, content)?;

  let err = engine()?.process_file(&path, Mode::Replace).unwrap_err();
  assert!(err.to_string().contains("no cells"));
  assert_eq!(fs::read_to_string(&path)?, content);
  Ok(())
}

#[test]
fn test_written_notebook_uses_single_space_indent() -> Result<()> {
  let dir = tempdir()?;
  let path = dir.path().join("analysis.ipynb");
  write_notebook(&path, &notebook())?;

  engine()?.process_file(&path, Mode::Replace)?;
  let written = fs::read_to_string(&path)?;
  assert!(written.starts_with("{\n \"cells\": [\n  {\n   \"cell_type\": \"code\""));
  assert!(written.ends_with("}\n"));
  Ok(())
}
