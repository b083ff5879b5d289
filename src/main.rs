//! `lotto_latest` binary: parses the CLI, runs one subcommand and maps the
//! outcome to a process exit code.
//!
//! | Outcome | Exit code |
//! |---------|-----------|
//! | Document written (even with some aggregate sources skipped) | 0 |
//! | `all` outside the permitted time windows | 0 |
//! | Missing credential, bad config, unknown key | 1 |
//! | Any failure in `single` | 1 |

use clap::Parser;
use lotto_latest::api::{ExtractorConfig, OpenAiExtractor};
use lotto_latest::cli::{Cli, Command};
use lotto_latest::config::Settings;
use lotto_latest::outputs::{json, single_output_path};
use lotto_latest::pipeline::Pipeline;
use lotto_latest::schedule::TimeGate;
use lotto_latest::scrapers::PageFetcher;
use lotto_latest::{Error, Result};
use std::path::Path;
use std::process::ExitCode;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

#[tokio::main]
async fn main() -> ExitCode {
    // --- Tracing init ---
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("lotto_latest starting up");

    let args = Cli::parse();
    debug!(
        command = ?args.command,
        config = ?args.config,
        model = %args.model,
        "Parsed CLI arguments"
    );

    let outcome = run(args).await;
    let elapsed = start_time.elapsed();
    match outcome {
        Ok(()) => {
            info!(
                ?elapsed,
                secs = elapsed.as_secs(),
                millis = elapsed.subsec_millis(),
                "Execution complete"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(kind = %e.kind(), error = %e, ?elapsed, "Execution failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Cli) -> Result<()> {
    // Must precede config loading and any network call.
    let api_key = args
        .api_key
        .filter(|key| !key.trim().is_empty())
        .ok_or(Error::MissingApiKey)?;

    let settings = Settings::load(args.config.as_deref()).await?;
    let gate = settings.gate.to_gate()?;
    let extractor = OpenAiExtractor::new(ExtractorConfig {
        api_key,
        api_base: args.api_base,
        model: args.model,
    })?;
    let pipeline = Pipeline::new(PageFetcher::new()?, extractor, gate.offset());

    match args.command {
        Command::All {
            output,
            ignore_schedule,
        } => {
            run_all(&pipeline, &settings, &gate, &output, ignore_schedule).await
        }
        Command::Single { lottery, output } => {
            let output = output.unwrap_or_else(|| single_output_path(&lottery));
            run_single(&pipeline, &settings, &lottery, &output).await
        }
    }
}

#[instrument(level = "info", skip_all, fields(output = %output.display()))]
async fn run_all(
    pipeline: &Pipeline<OpenAiExtractor>,
    settings: &Settings,
    gate: &TimeGate,
    output: &Path,
    ignore_schedule: bool,
) -> Result<()> {
    let now = gate.local_now();
    let clock = now.format("%H:%M").to_string();
    if !gate.allows_at(&now) {
        if !ignore_schedule {
            info!(
                %clock,
                windows = %gate.describe_windows(),
                "Outside permitted run windows; exiting"
            );
            return Ok(());
        }
        info!(
            %clock,
            "Outside permitted run windows; running anyway (--ignore-schedule)"
        );
    }

    let sources = settings.aggregate_sources()?;
    info!(%clock, sources = sources.len(), "Starting aggregate run");

    let document = pipeline.run_aggregate(&sources).await;
    json::write_document(&document, output).await?;
    info!(lotteries = document.items.len(), "Saved aggregate document");
    Ok(())
}

#[instrument(level = "info", skip_all, fields(%lottery, output = %output.display()))]
async fn run_single(
    pipeline: &Pipeline<OpenAiExtractor>,
    settings: &Settings,
    lottery: &str,
    output: &Path,
) -> Result<()> {
    let source = settings.source(lottery)?;
    info!(name = %source.name, url = %source.url, "Starting single-source run");

    let document = pipeline.run_single(source).await?;
    json::write_document(&document, output).await?;
    info!(draws = ?document.draws.entry_count(), "Saved lottery document");
    Ok(())
}
