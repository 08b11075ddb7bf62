//! Sift CLI library.
//!
//! Thin glue around the digest pipeline: argument parsing, discovery of
//! recently modified files, and rendering of the finished digest.

pub mod cli;
pub mod error;
pub mod output;
pub mod scan;

pub use cli::{Cli, CliFormat};
pub use error::{CliError, Result};
pub use output::{Formatter, OutputFormat};
pub use scan::{scan_directory, ScanOptions};
