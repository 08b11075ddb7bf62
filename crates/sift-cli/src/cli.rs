//! Command-line arguments.

use crate::output::OutputFormat;
use crate::scan::ScanOptions;
use clap::Parser;
use sift_pipeline::PipelineConfig;
use std::path::PathBuf;

/// Sift - digest recently modified documents.
#[derive(Debug, Parser)]
#[command(name = "sift")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Directory to scan
    #[arg(default_value = ".")]
    pub dir: PathBuf,

    /// Only include files modified within this many days
    #[arg(short, long, default_value_t = 7)]
    pub days: u64,

    /// Skip files larger than this many bytes
    #[arg(long, default_value_t = 1_048_576)]
    pub max_file_bytes: u64,

    /// Process at most this many documents (newest first)
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Configuration file path
    #[arg(short, long, env = "SIFT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Documents per batch
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Batches summarized at the same time
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Per-call provider timeout in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Skip conclusion synthesis
    #[arg(long)]
    pub no_conclusions: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "markdown")]
    pub format: CliFormat,

    /// Write the digest to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Debug logging (unless RUST_LOG is set)
    #[arg(short, long)]
    pub verbose: bool,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CliFormat {
    /// Markdown report (default)
    Markdown,
    /// Pretty-printed JSON
    Json,
}

impl From<CliFormat> for OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Markdown => OutputFormat::Markdown,
            CliFormat::Json => OutputFormat::Json,
        }
    }
}

impl Cli {
    /// Apply flag overrides on top of file configuration.
    pub fn apply_overrides(&self, config: &mut PipelineConfig) {
        if let Some(batch_size) = self.batch_size {
            config.batch.batch_size = batch_size;
        }
        if let Some(concurrency) = self.concurrency {
            config.batch.concurrency = concurrency;
        }
        if let Some(timeout_secs) = self.timeout_secs {
            config.batch.timeout_secs = timeout_secs;
        }
        if self.no_conclusions {
            config.synthesis.enabled = false;
        }
    }

    /// Discovery options from the flags.
    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            days: self.days,
            max_file_bytes: self.max_file_bytes,
            limit: self.limit,
        }
    }
}
