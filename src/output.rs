//! # Output Module
//!
//! All user-facing console output for the addheader tool: the start line,
//! per-category file lists and the closing summary.
//!
//! Output is progressive: lists are truncated by default, shown in full with
//! `-v`, and reduced to bare paths (detect mode) or nothing with `-q`.

use std::path::Path;

use owo_colors::{OwoColorize, Stream};

use crate::logging::{is_quiet, is_verbose};
use crate::processor::Mode;
use crate::report::{FileAction, FileReport, ProcessingSummary};

/// Symbols used in output
pub mod symbols {
  pub const SUCCESS: &str = "\u{2713}"; // ✓
  pub const FAILURE: &str = "\u{2717}"; // ✗
  pub const WARNING: &str = "!";
  pub const REMOVED: &str = "-";
}

/// Maximum number of files to show in the default output before truncating
const DEFAULT_FILE_LIST_LIMIT: usize = 20;

/// Print "Processing N files..." or, in detect mode, "Checking N files...".
pub fn print_start_message(file_count: usize, mode: Mode) {
  if is_quiet() {
    return;
  }
  let verb = if mode.modifies() { "Processing" } else { "Checking" };
  println!("{} {} {}...", verb, file_count, plural(file_count));
}

/// Print a blank line for visual separation (respects quiet mode).
pub fn print_blank_line() {
  if !is_quiet() {
    println!();
  }
}

/// Print the message for a run whose patterns matched nothing.
pub fn print_no_files(root: &Path) {
  eprintln!(
    "{} No matching files found under {}",
    symbols::FAILURE.if_supports_color(Stream::Stderr, |s| s.red()),
    root.display()
  );
}

/// Files grouped by what happened to them.
#[derive(Debug, Default)]
pub struct CategorizedReports<'a> {
  pub added: Vec<&'a FileReport>,
  pub replaced: Vec<&'a FileReport>,
  pub removed: Vec<&'a FileReport>,
  pub unchanged: Vec<&'a FileReport>,
  pub with_header: Vec<&'a FileReport>,
  pub missing_header: Vec<&'a FileReport>,
  pub warnings: Vec<&'a FileReport>,
  pub failed: Vec<&'a FileReport>,
}

impl<'a> CategorizedReports<'a> {
  pub fn from_reports(reports: &'a [FileReport]) -> Self {
    let mut categorized = Self::default();
    for report in reports {
      if report.is_warning() {
        categorized.warnings.push(report);
        continue;
      }
      match report.action {
        FileAction::Added => categorized.added.push(report),
        FileAction::Replaced => categorized.replaced.push(report),
        FileAction::Removed => categorized.removed.push(report),
        FileAction::Unchanged => categorized.unchanged.push(report),
        FileAction::Checked if report.detected => categorized.with_header.push(report),
        FileAction::Checked => categorized.missing_header.push(report),
        FileAction::Failed => categorized.failed.push(report),
      }
    }
    categorized
  }
}

/// Print every non-empty category for the run.
pub fn print_reports(reports: &[FileReport], root: Option<&Path>) {
  let categorized = CategorizedReports::from_reports(reports);

  if is_quiet() {
    // Bare paths keep detect output scriptable.
    for file in sorted(&categorized.missing_header) {
      println!("{}", make_relative_path(&file.path, root));
    }
    print_failures_to_stderr(&categorized.failed, root);
    return;
  }

  let green = |s: &str| s.if_supports_color(Stream::Stdout, |s| s.green()).to_string();
  let yellow = |s: &str| s.if_supports_color(Stream::Stdout, |s| s.yellow()).to_string();
  let red = |s: &str| s.if_supports_color(Stream::Stdout, |s| s.red()).to_string();

  print_file_list(&green(symbols::SUCCESS), "Added header to", &categorized.added, root);
  print_file_list(&green(symbols::SUCCESS), "Replaced header in", &categorized.replaced, root);
  print_file_list(&yellow(symbols::REMOVED), "Removed header from", &categorized.removed, root);
  print_file_list(&green(symbols::SUCCESS), "Header present in", &categorized.with_header, root);
  print_file_list(&red(symbols::FAILURE), "Header missing from", &categorized.missing_header, root);
  if is_verbose() {
    let dimmed = "=".if_supports_color(Stream::Stdout, |s| s.dimmed()).to_string();
    print_file_list(&dimmed, "Unchanged", &categorized.unchanged, root);
  }
  print_problem_list(&yellow(symbols::WARNING), "Left unchanged", &categorized.warnings, root);
  print_problem_list(&red(symbols::FAILURE), "Failed to process", &categorized.failed, root);
}

fn print_file_list(symbol: &str, title: &str, files: &[&FileReport], root: Option<&Path>) {
  if files.is_empty() {
    return;
  }
  let count = files.len();
  println!("{} {} {} {}:", symbol, title, count, plural(count));

  let show_all = is_verbose();
  let limit = if show_all { count } else { DEFAULT_FILE_LIST_LIMIT };
  for file in sorted(files).into_iter().take(limit) {
    println!("  {}", make_relative_path(&file.path, root));
  }
  print_truncation(count, limit);
}

fn print_problem_list(symbol: &str, title: &str, files: &[&FileReport], root: Option<&Path>) {
  if files.is_empty() {
    return;
  }
  let count = files.len();
  println!("{} {} {} {}:", symbol, title, count, plural(count));
  for file in sorted(files) {
    let reason = failure_reason(file);
    println!(
      "  {} ({})",
      make_relative_path(&file.path, root),
      reason.if_supports_color(Stream::Stdout, |s| s.dimmed())
    );
  }
}

/// Quiet runs still name every failed file, on stderr.
fn print_failures_to_stderr(files: &[&FileReport], root: Option<&Path>) {
  for file in sorted(files) {
    eprintln!(
      "{} {}: {}",
      symbols::FAILURE.if_supports_color(Stream::Stderr, |s| s.red()),
      make_relative_path(&file.path, root),
      failure_reason(file)
    );
  }
}

fn failure_reason(file: &FileReport) -> &str {
  file.error.as_ref().map(|e| e.message.as_str()).unwrap_or("unknown error")
}

fn print_truncation(count: usize, limit: usize) {
  if count > limit {
    println!(
      "  {} ... and {} more (use -v to see all)",
      "".if_supports_color(Stream::Stdout, |s| s.dimmed()),
      count - limit
    );
  }
}

/// Print the processing summary.
///
/// Format: "Summary: X modified, Y unchanged, Z failed"
/// In verbose mode, also shows timing.
pub fn print_summary(summary: &ProcessingSummary) {
  if is_quiet() {
    return;
  }

  let modified = summary.modified.if_supports_color(Stream::Stdout, |s| s.cyan());
  let unchanged = summary.unchanged.if_supports_color(Stream::Stdout, |s| s.dimmed());
  let failed = if summary.failed > 0 {
    summary.failed.if_supports_color(Stream::Stdout, |s| s.red()).to_string()
  } else {
    summary.failed.if_supports_color(Stream::Stdout, |s| s.cyan()).to_string()
  };

  let mut line = format!("Summary: {} modified, {} unchanged, {} failed", modified, unchanged, failed);
  if summary.warnings > 0 {
    line.push_str(&format!(", {} warnings", summary.warnings));
  }
  if is_verbose() {
    line.push_str(&format!(" ({:.2}s)", summary.processing_time.as_secs_f64()));
  }
  println!("{}", line);
}

/// Print verbose per-file status as files finish. Only shown in verbose mode.
pub fn print_file_status_verbose(path: &Path, written: bool, root: Option<&Path>) {
  if !is_verbose() {
    return;
  }
  let display_path = make_relative_path(path, root);
  if written {
    eprintln!(
      "  {} {}",
      symbols::SUCCESS.if_supports_color(Stream::Stderr, |s| s.green()),
      display_path
    );
  } else {
    eprintln!("  {}", display_path.if_supports_color(Stream::Stderr, |s| s.dimmed()));
  }
}

fn sorted<'a>(files: &[&'a FileReport]) -> Vec<&'a FileReport> {
  let mut files = files.to_vec();
  files.sort_by(|a, b| a.path.cmp(&b.path));
  files
}

const fn plural(count: usize) -> &'static str {
  if count == 1 { "file" } else { "files" }
}

/// Make a path relative to the root for display.
fn make_relative_path(path: &Path, root: Option<&Path>) -> String {
  if let Some(root) = root {
    path
      .strip_prefix(root)
      .map(|p| p.to_string_lossy().to_string())
      .unwrap_or_else(|_| path.to_string_lossy().to_string())
  } else {
    path.to_string_lossy().to_string()
  }
}
