//! # CLI Module
//!
//! Command-line interface for the `addheader` binary, built on clap.

mod run;

use clap::Parser;
use clap::builder::styling::{AnsiColor, Color, Style, Styles};
pub use run::{RunArgs, run};

const CUSTOM_STYLES: Styles = Styles::styled()
  .header(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green))).bold())
  .usage(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green))).bold())
  .literal(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Blue))).bold())
  .placeholder(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Cyan))))
  .error(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Red))).bold())
  .valid(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green))))
  .invalid(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Yellow))));

/// Top-level CLI arguments
#[derive(Parser, Debug)]
#[command(
  name = "addheader",
  version,
  about = "Add, replace or remove a delimited header comment at the top of source files",
  styles = CUSTOM_STYLES,
  after_help = "Examples:
  # Add the header in header.txt to every .py file except __init__.py
  addheader -t header.txt mypackage

  # List which files have a header, without touching them
  addheader --dry-run mypackage

  # Remove headers, including the header cell of notebooks
  addheader --remove --jupyter mypackage

  # Use // comments and only process Rust files, four at a time
  addheader -t header.txt --comment // -p '*.rs' --jobs 4 src
",
  help_template = "{before-help}{name} v{version}
{about-section}
{usage-heading} {usage}

{all-args}{after-help}
"
)]
pub struct Cli {
  #[command(flatten)]
  pub args: RunArgs,
}

impl Cli {
  /// Parse CLI arguments and return the Cli struct
  pub fn parse_args() -> Self {
    Self::parse()
  }
}
