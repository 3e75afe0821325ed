//! # Logging Module
//!
//! Console logging for the addheader tool:
//! - [`verbose_log!`] writes to stderr, only when verbose mode is on
//! - [`info_log!`] writes to stdout unless quiet mode is on
//!
//! Structured diagnostics from the library go through `tracing`; the
//! subscriber is installed by [`init_tracing`].
//!
//! ## Example
//!
//! ```rust
//! use addheader::logging::{ColorMode, set_verbose};
//! use addheader::{info_log, verbose_log};
//!
//! set_verbose();
//! ColorMode::Never.apply();
//!
//! verbose_log!("Scanning: {}", "src");
//! info_log!("Header added to: {}", "src/foo.py");
//! ```

mod modes;

pub use modes::{ColorMode, default_filter, init_tracing, is_quiet, is_verbose, set_quiet, set_verbose};
use owo_colors::{OwoColorize, Stream};

/// Logs a message to stderr if verbose mode is enabled.
#[macro_export]
macro_rules! verbose_log {
    ($($arg:tt)*) => {
        if $crate::logging::is_verbose() {
            eprintln!($($arg)*);
        }
    };
}

/// Logs a message to stdout unless quiet mode is enabled.
#[macro_export]
macro_rules! info_log {
    ($($arg:tt)*) => {
        if !$crate::logging::is_quiet() {
            $crate::logging::print_info_log(&format!($($arg)*));
        }
    };
}

/// Used by [`info_log!`].
pub fn print_info_log(message: &str) {
  println!("{}", message.if_supports_color(Stream::Stdout, |m| m.yellow()));
}
