use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use sift_common::observability::{init_logging, LogConfig, LogFormat};
use sift_config::{LogFormatSetting, LoggingSettings, SiftConfigLoader, DEFAULT_CONFIG_FILE};

mod pipeline;

/// Combine captured search-timeline bundles into one deduplicated post dataset.
#[derive(Debug, Parser)]
#[command(name = "sift", version)]
struct Cli {
    /// Directory holding capture bundle files (*.json).
    #[arg(long, short = 'i')]
    input_dir: Option<PathBuf>,
    /// Path of the combined dataset to write.
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,
}

fn log_config(settings: &LoggingSettings) -> LogConfig {
    LogConfig {
        app_name: "sift",
        log_dir: settings.dir.clone(),
        emit_stderr: settings.stderr,
        format: match settings.format {
            LogFormatSetting::Text => LogFormat::Text,
            LogFormatSetting::Json => LogFormat::Json,
        },
        default_filter: settings.filter.clone(),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // defaults < sift.yaml < SIFT_* env < flags
    let cfg = SiftConfigLoader::new()
        .with_optional_file(DEFAULT_CONFIG_FILE)
        .load()
        .context("failed to load configuration")?
        .with_overrides(cli.input_dir, cli.output);

    let log_path = init_logging(log_config(&cfg.logging))?;
    tracing::debug!(log_file = %log_path.display(), "sift.logging_ready");

    let summary = pipeline::run(&cfg)?;
    tracing::info!(
        files = summary.files_found,
        failed = summary.files_failed,
        posts = summary.posts_written,
        duplicates = summary.duplicates_skipped,
        output = %summary.output_path.display(),
        "sift.done"
    );
    Ok(())
}
