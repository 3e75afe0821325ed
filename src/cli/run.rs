//! # Run Command
//!
//! Resolves settings, builds the worklist and drives the processor.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

use addheader::config::{Overrides, Settings, load_config};
use addheader::logging::{ColorMode, init_tracing, is_verbose, set_quiet, set_verbose};
use addheader::output::{
  print_blank_line, print_file_status_verbose, print_no_files, print_reports, print_start_message, print_summary,
};
use addheader::processor::{FileCollector, Mode, Processor, ProcessorConfig, ProgressObserver};
use addheader::report::ProcessingSummary;
use addheader::verbose_log;
use anyhow::Result;
use clap::Args;
use tracing::debug;

/// Arguments for a run
#[derive(Args, Debug, Default)]
pub struct RunArgs {
  /// Root directory to scan recursively
  pub root: PathBuf,

  /// File containing the header text (required unless set in the config, or with --dry-run or --remove)
  #[arg(short = 't', long, value_name = "FILE")]
  pub text: Option<PathBuf>,

  /// File name pattern to match (repeatable). Prefix with ~ to exclude
  /// [default: *.py ~__init__.py]
  #[arg(short = 'p', long = "pattern", value_name = "PATTERN")]
  pub patterns: Vec<String>,

  /// Glob matched against the full path of files to skip (repeatable)
  #[arg(long, value_name = "GLOB")]
  pub path_exclude: Vec<String>,

  /// Only report which files have a header; change nothing
  #[arg(short = 'n', long, conflicts_with = "remove")]
  pub dry_run: bool,

  /// Remove existing headers
  #[arg(short = 'r', long)]
  pub remove: bool,

  /// Comment prefix for header lines [default: #]
  #[arg(long, value_name = "PREFIX")]
  pub comment: Option<String>,

  /// Delimiter character [default: #]
  #[arg(long, value_name = "CHAR")]
  pub sep: Option<String>,

  /// Delimiter length, at least 10 [default: 78]
  #[arg(long, value_name = "N")]
  pub sep_len: Option<usize>,

  /// Also process Jupyter notebooks with this suffix
  #[arg(
    short = 'j',
    long,
    value_name = "SUFFIX",
    num_args = 0..=1,
    require_equals = true,
    default_missing_value = ".ipynb"
  )]
  pub jupyter: Option<String>,

  /// Add headers to empty and whitespace-only files
  #[arg(long)]
  pub empty_files: bool,

  /// Number of files to process concurrently [default: 1]
  #[arg(long, value_name = "N")]
  pub jobs: Option<usize>,

  /// Path to config file (default: .addheader.toml in the root directory)
  #[arg(short = 'c', long, value_name = "FILE", conflicts_with = "no_config")]
  pub config: Option<PathBuf>,

  /// Ignore config file even if present
  #[arg(long)]
  pub no_config: bool,

  /// Increase verbosity (-v info, -vv debug, -vvv trace)
  #[arg(short, long, action = clap::ArgAction::Count)]
  pub verbose: u8,

  /// Suppress all output except errors and, with --dry-run, files missing a header
  #[arg(short, long, conflicts_with = "verbose")]
  pub quiet: bool,

  /// When to use colors in output
  #[arg(long, value_enum, default_value_t = ColorMode::Auto, value_name = "WHEN")]
  pub colors: ColorMode,
}

impl RunArgs {
  pub const fn mode(&self) -> Mode {
    if self.remove {
      Mode::Remove
    } else if self.dry_run {
      Mode::Detect
    } else {
      Mode::Replace
    }
  }

  pub fn overrides(&self) -> Overrides {
    Overrides {
      text: self.text.clone(),
      patterns: self.patterns.clone(),
      path_exclude: self.path_exclude.clone(),
      comment: self.comment.clone(),
      sep: self.sep.clone(),
      sep_len: self.sep_len,
      jupyter: self.jupyter.clone(),
      empty_files: self.empty_files,
      jobs: self.jobs,
    }
  }
}

/// Prints each file as it finishes (`-v`).
struct VerboseObserver {
  root: PathBuf,
}

impl ProgressObserver for VerboseObserver {
  fn on_file(&self, path: &Path, written: bool) {
    print_file_status_verbose(path, written, Some(&self.root));
  }
}

/// Runs addheader with the given arguments.
///
/// Returns the process exit code: success, or failure when any file failed
/// or nothing matched. Configuration problems are returned as errors.
pub async fn run(args: RunArgs) -> Result<ExitCode> {
  if args.quiet {
    set_quiet();
  } else if args.verbose > 0 {
    set_verbose();
  }
  init_tracing(args.quiet, args.verbose);
  args.colors.apply();

  let mode = args.mode();
  debug!("Running in {} mode", mode);

  let config = load_config(args.config.as_deref(), &args.root, args.no_config)?;
  let settings = Settings::resolve(&args.root, mode, args.overrides(), config.as_ref())?;
  let header = settings.header_spec()?;
  verbose_log!("Header text from: {:?}", settings.text_path);

  let collector = FileCollector::new(settings.patterns.clone(), settings.notebook_suffix.clone())?;
  let worklist = collector.locate(&settings.root)?;
  if worklist.is_empty() {
    print_no_files(&settings.root);
    return Ok(ExitCode::FAILURE);
  }

  print_start_message(worklist.len(), mode);

  let mut processor = Processor::new(ProcessorConfig {
    allow_empty_files: settings.allow_empty_files,
    jobs: settings.jobs,
    ..ProcessorConfig::new(header, mode)
  });
  if is_verbose() {
    processor.add_observer(Arc::new(VerboseObserver {
      root: settings.root.clone(),
    }));
  }

  let start = Instant::now();
  let reports = processor.process(worklist).await?;
  let summary = ProcessingSummary::from_reports(&reports, start.elapsed());

  print_blank_line();
  print_reports(&reports, Some(&settings.root));
  print_summary(&summary);

  if summary.has_failures() {
    Ok(ExitCode::FAILURE)
  } else {
    Ok(ExitCode::SUCCESS)
  }
}
