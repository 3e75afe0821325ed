//! # addheader
//!
//! Adds, replaces or removes a delimited header comment at the top of source
//! files and notebooks.

mod cli;

use std::process::ExitCode;

use addheader::error::ConfigError;
use owo_colors::{OwoColorize, Stream};

use crate::cli::{Cli, run};

/// Exit code for configuration errors.
const CONFIG_ERROR_EXIT: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
  let cli = Cli::parse_args();

  match run(cli.args).await {
    Ok(code) => code,
    Err(e) => {
      eprintln!("{} {:#}", "Error:".if_supports_color(Stream::Stderr, |s| s.red()), e);
      if e.downcast_ref::<ConfigError>().is_some() {
        ExitCode::from(CONFIG_ERROR_EXIT)
      } else {
        ExitCode::FAILURE
      }
    }
  }
}
