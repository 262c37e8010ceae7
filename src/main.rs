//! srtsift - Subtitle Transcript Analysis
//!
//! Entry point: loads the environment and configuration, sets up logging and
//! runs the analysis workflow for a single subtitle file.

use anyhow::Result;
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use srtsift::cli::Args;
use srtsift::config::Config;
use srtsift::logging::init_logging;
use srtsift::workflow::Workflow;

const DEFAULT_CONFIG_FILE: &str = "srtsift.toml";

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Load the API key from an env file when one is present
    let env_file = match &args.env_file {
        Some(path) => dotenvy::from_path(path).map(|_| path.clone()),
        None => dotenvy::dotenv(),
    };

    // Load configuration
    let mut config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            if Path::new(DEFAULT_CONFIG_FILE).exists() {
                Config::from_file(DEFAULT_CONFIG_FILE)?
            } else {
                Config::default()
            }
        }
    };
    args.apply_to(&mut config);

    // Setup logging to console and files; flushed when the guard drops
    let _log_guard = init_logging(&config.logging, args.verbose)?;

    info!("Starting srtsift - Subtitle Transcript Analysis");
    match env_file {
        Ok(path) => info!("Loaded environment from {}", path.display()),
        Err(e) if args.env_file.is_some() => warn!("Could not load environment file: {}", e),
        Err(_) => {}
    }

    if !args.file.exists() {
        error!("File not found: {}", args.file.display());
        return Ok(());
    }

    let workflow = match Workflow::new(config) {
        Ok(workflow) => workflow,
        Err(e) => {
            error!("Failed to set up analysis: {}", e);
            return Ok(());
        }
    };

    match workflow.run(&args.file, &args.prompt).await {
        Ok(Some(report)) => {
            info!(
                "Analyzed {} chunk(s) of {} ({} failed) in {}s",
                report.chunk_count,
                report.input.display(),
                report.failed_chunks,
                (report.finished_at - report.started_at).num_seconds()
            );
            for path in [&report.paths.prose, &report.paths.structured].into_iter().flatten() {
                println!("{}", display_path(path).display());
            }
        }
        Ok(None) => info!("Nothing to analyze for {}", args.file.display()),
        Err(e) => error!("Analysis failed: {}", e),
    }

    Ok(())
}

/// Path relative to the working directory when possible
fn display_path(path: &Path) -> PathBuf {
    std::env::current_dir()
        .ok()
        .and_then(|cwd| pathdiff::diff_paths(path, cwd))
        .unwrap_or_else(|| path.to_path_buf())
}
