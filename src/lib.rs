//! # addheader
//!
//! A tool that idempotently inserts, replaces or removes a delimited header
//! comment block at the top of source files, scanning a directory tree
//! recursively.
//!
//! A header looks like this with the default options:
//!
//! ```text
//! ##############################################################################
//! # Copyright (c) 2024, Example Org.
//! # All rights reserved.
//! ##############################################################################
//! ```
//!
//! Running the tool again replaces the header in place rather than adding a
//! second one. Shebang and encoding lines stay at the top of the file, and
//! Jupyter notebooks get the header in a tagged code cell.
//!
//! ## Usage as a Library
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use addheader::file_filter::PatternSet;
//! use addheader::header::{HeaderSpec, HeaderStyle};
//! use addheader::processor::{FileCollector, Mode, Processor, ProcessorConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let header = HeaderSpec::new("Copyright (c) 2024, Example Org.", HeaderStyle::default())?;
//!
//!     let patterns = PatternSet::parse(&["*.py", "~__init__.py"], &[])?;
//!     let worklist = FileCollector::new(patterns, None)?.locate(Path::new("mypackage"))?;
//!
//!     let processor = Processor::new(ProcessorConfig::new(header, Mode::Replace));
//!     for report in processor.process(worklist).await? {
//!         println!("{}: {:?}", report.path.display(), report.action);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! * [`header`] - The header block model and its rendering
//! * [`processor`] - Header engines and the driver that runs them over files
//! * [`file_filter`] - File name and path pattern matching
//! * [`config`] - Configuration file loading and settings resolution
//! * [`report`] - Per-file results and run summaries
//! * [`output`] - Console output
//! * [`logging`] - Logging utilities for verbose output

pub mod config;
pub mod error;
pub mod file_filter;
pub mod header;
pub mod logging;
pub mod output;
pub mod processor;
pub mod report;
