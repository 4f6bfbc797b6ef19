//! Run command implementation
//!
//! Loads the configuration, installs the logger, runs the pipeline on a
//! blocking thread, writes the report and prints its summary.

use crate::cli::{EXIT_WORKER_FAILURE, Output, RunArgs};
use crate::config::{CliOverrides, ConfigLoader, Settings};
use crate::logging::Logger;
use crate::pipeline::{CsvReceiver, Pipeline, Report};
use crate::utils::{format_duration, truncate_string};
use anyhow::{Context, Result};
use std::path::Path;
use std::process::ExitCode;

impl From<RunArgs> for CliOverrides {
    fn from(args: RunArgs) -> Self {
        CliOverrides {
            input: args.input,
            target: args.target,
            algorithm: args.algorithm,
            workers: args.workers,
            max_workers: args.max_workers,
            chunk_size: args.chunk_size,
            timeout: args.timeout,
            salt: args.salt,
            salt_length: args.salt_length,
            iterations: args.iterations,
            output: args.output,
            log_file: args.log_file,
            log_level: args.log_level,
        }
    }
}

/// Validate everything the run needs before any thread is spawned.
fn prepare(settings: &Settings) -> crate::error::Result<(Pipeline, CsvReceiver)> {
    let pipeline = Pipeline::new(settings.pipeline_config()?)?;
    let receiver = CsvReceiver::new(settings.input.delimiter()?, settings.input.has_header);
    Ok((pipeline, receiver))
}

/// Execute the run command
pub async fn execute(args: RunArgs, config: Option<&Path>, output: &Output) -> Result<ExitCode> {
    let overrides = CliOverrides::from(args);
    let settings = ConfigLoader::load_with_custom_config(config)
        .context("Failed to load configuration")?
        .with_overrides(&overrides)
        .settings()
        .context("Failed to load configuration")?;

    let mut log_config = settings.output.log_config();
    log_config.console = log_config.console && !output.is_quiet();
    let _log_guard = Logger::new(&log_config)
        .with_context(|| format!("Failed to open log file {}", log_config.path.display()))?
        .install()?;

    tracing::info!("hashcrack v{} starting", crate::VERSION);

    let (pipeline, receiver) = match prepare(&settings) {
        Ok(prepared) => prepared,
        Err(e) => {
            tracing::error!("Validation failed: {}", e);
            return Err(e).context("Invalid configuration");
        }
    };

    let input = settings.input.csv_path.clone();
    output.verbose(&format!("Reading candidates from {}", input.display()));

    let report =
        tokio::task::spawn_blocking(move || pipeline.run_from_source(&input, &receiver))
            .await
            .context("Pipeline task failed")?
            .inspect_err(|e| tracing::error!("Pipeline aborted: {}", e))
            .context("Pipeline aborted")?;

    report
        .save_json(&settings.output.results_path)
        .with_context(|| {
            format!(
                "Failed to write report to {}",
                settings.output.results_path.display()
            )
        })?;

    print_summary(&report, output);
    output.verbose(&format!(
        "Report written to {}",
        settings.output.results_path.display()
    ));

    if report.success {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(EXIT_WORKER_FAILURE))
    }
}

/// Print a human-readable summary of a run.
fn print_summary(report: &Report, output: &Output) {
    output.header("Hash Cracking Results");
    output.key_value("Algorithm:", report.algorithm.as_str(), false);
    output.key_value("Target:", &report.target_hash, false);
    output.key_value("Candidates:", &report.total_candidates.to_string(), false);
    output.key_value("Processed:", &report.total_processed.to_string(), false);
    if report.total_skipped > 0 {
        output.key_value("Skipped:", &report.total_skipped.to_string(), false);
    }
    output.key_value(
        "Matches:",
        &report.total_matches.to_string(),
        report.total_matches > 0,
    );
    output.key_value("Elapsed:", &format_duration(report.elapsed_seconds), false);
    output.key_value(
        "Throughput:",
        &format!("{:.0} hashes/sec", report.throughput_per_sec),
        false,
    );

    if !report.matches.is_empty() {
        output.section_header("Matches");
        for record in &report.matches {
            output.list_item(&format!(
                "'{}' (worker {}, chunk {})",
                truncate_string(&record.original, 60),
                record.worker_id,
                record.chunk_id
            ));
        }
    }

    if output.is_verbose() {
        output.section_header("Workers");
        for worker in &report.workers {
            output.list_item(&format!(
                "worker-{}: {} processed, {} matches, {} chunks, {} ({:?})",
                worker.worker_id,
                worker.items_processed,
                worker.matches_found,
                worker.chunks_processed,
                format_duration(worker.elapsed_seconds),
                worker.state
            ));
        }
    }

    if !report.failures.is_empty() {
        output.section_header("Failures");
        for failure in &report.failures {
            match failure.worker_id {
                Some(id) => output.list_item(&format!("worker-{id}: {}", failure.error)),
                None => output.list_item(&failure.error),
            }
        }
    }

    output.separator();
    if report.success {
        output.status_indicator("COMPLETED", &format!("run {}", report.run_id), true);
    } else {
        output.status_indicator(
            "FAILED",
            &format!("{} worker failure(s)", report.failures.len()),
            false,
        );
    }
}
