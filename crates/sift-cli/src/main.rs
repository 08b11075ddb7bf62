//! Sift CLI - digest recently modified documents.

use anyhow::Context;
use clap::Parser;
use sift_cli::{scan_directory, Cli, Formatter};
use sift_pipeline::{Pipeline, PipelineConfig, PipelineError};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    // Provider keys may live in a local .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => PipelineConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    cli.apply_overrides(&mut config);

    let documents = scan_directory(&cli.dir, &cli.scan_options())?;
    let formatter = Formatter::new(cli.format.into(), !cli.no_color);

    let pipeline = Pipeline::new(config)?;
    let digest = match pipeline.run(documents).await {
        Ok(digest) => digest,
        Err(PipelineError::NoInput) => {
            eprintln!(
                "No text files modified in the last {} days under {}",
                cli.days,
                cli.dir.display()
            );
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let rendered = formatter.render(&digest)?;
    match &cli.output {
        Some(path) => std::fs::write(path, rendered)
            .with_context(|| format!("writing {}", path.display()))?,
        None => println!("{}", rendered.trim_end()),
    }

    eprintln!("{}", formatter.run_summary(&digest));
    Ok(())
}

/// Log to stderr; RUST_LOG wins over --verbose
fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }));

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}
