//! Command-line interface for hashcrack
//!
//! This module provides the main CLI structure and command handling.
//! It uses clap for argument parsing; every command returns the process exit
//! code so `main` only has to report errors.

use crate::error::PipelineError;
use anyhow::Result;
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;

mod commands;
mod output;

pub use output::Output;

/// Exit code of a run where at least one worker failed
pub const EXIT_WORKER_FAILURE: u8 = 1;
/// Exit code of a run rejected during validation
pub const EXIT_VALIDATION_FAILURE: u8 = 2;

/// hashcrack - parallel hash cracking over a bounded worker pool
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable quiet output (minimal)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Subcommands
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Search the candidate file for the target digest
    Run(RunArgs),
    /// Print the digest of a string
    Hash(HashArgs),
    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),
    /// Show version information
    Version,
}

/// Overrides for a single run
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Candidate file (first column is used)
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Target digest in hex
    #[arg(short, long)]
    pub target: Option<String>,

    /// SHA256, SHA384, SHA512 or PBKDF2
    #[arg(short, long)]
    pub algorithm: Option<String>,

    /// Number of worker threads
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Maximum number of simultaneously active workers
    #[arg(long)]
    pub max_workers: Option<usize>,

    /// Candidates per chunk
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Worker idle timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// PBKDF2 salt in hex
    #[arg(long)]
    pub salt: Option<String>,

    /// Required PBKDF2 salt length in bytes (0 accepts any length)
    #[arg(long)]
    pub salt_length: Option<usize>,

    /// PBKDF2 iteration count
    #[arg(long)]
    pub iterations: Option<u32>,

    /// Where to write the JSON report
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Log file path
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Log level (debug, info, warning, error)
    #[arg(long)]
    pub log_level: Option<String>,
}

#[derive(Args, Debug)]
pub struct HashArgs {
    /// Text to digest
    pub text: String,

    /// SHA256, SHA384, SHA512 or PBKDF2 (defaults to the configured algorithm)
    #[arg(short, long)]
    pub algorithm: Option<String>,

    /// PBKDF2 salt in hex
    #[arg(long)]
    pub salt: Option<String>,

    /// Required PBKDF2 salt length in bytes (0 accepts any length)
    #[arg(long)]
    pub salt_length: Option<usize>,

    /// PBKDF2 iteration count
    #[arg(long)]
    pub iterations: Option<u32>,

    /// PBKDF2 output length in bytes
    #[arg(long, default_value_t = 32)]
    pub length: usize,
}

/// Configuration subcommands
#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Validate the merged configuration
    Validate,
    /// Show the merged configuration
    Show {
        /// Output format
        #[arg(long, value_enum, default_value_t = ConfigFormat::Toml)]
        format: ConfigFormat,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ConfigFormat {
    Toml,
    Json,
    Yaml,
}

impl Cli {
    /// Execute the CLI command
    pub async fn run(self) -> Result<ExitCode> {
        let output = Output::new(self.verbose, self.quiet);
        let config = self.config.as_deref();

        match self.command {
            Some(Commands::Run(args)) => commands::run::execute(args, config, &output).await,
            Some(Commands::Hash(args)) => commands::hash::execute(args, config, &output).await,
            Some(Commands::Config(cmd)) => commands::config::execute(cmd, config, &output).await,
            Some(Commands::Version) => commands::version::execute(&output).await,
            None => {
                // Show help when no command is provided
                let mut cmd = Cli::command();
                cmd.print_help()?;
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}

/// Map a failed command to its exit code.
pub fn exit_code_for(error: &anyhow::Error) -> ExitCode {
    let validation = error.chain().any(|cause| {
        cause
            .downcast_ref::<PipelineError>()
            .is_some_and(PipelineError::is_validation)
    });
    if validation {
        ExitCode::from(EXIT_VALIDATION_FAILURE)
    } else {
        ExitCode::from(EXIT_WORKER_FAILURE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_overrides_parse() {
        let cli = Cli::try_parse_from([
            "hashcrack",
            "run",
            "--input",
            "data.csv",
            "--workers",
            "4",
            "--max-workers",
            "2",
            "--chunk-size",
            "100",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Run(args)) => {
                assert_eq!(args.input, Some(PathBuf::from("data.csv")));
                assert_eq!(args.workers, Some(4));
                assert_eq!(args.max_workers, Some(2));
                assert_eq!(args.chunk_size, Some(100));
            }
            _ => panic!("expected run command"),
        }
    }

    #[test]
    fn test_validation_errors_exit_with_two() {
        let err = anyhow::Error::new(PipelineError::InvalidArgument("x".into()))
            .context("Invalid configuration");
        assert_eq!(exit_code_for(&err), ExitCode::from(EXIT_VALIDATION_FAILURE));

        let err = anyhow::anyhow!("disk full");
        assert_eq!(exit_code_for(&err), ExitCode::from(EXIT_WORKER_FAILURE));
    }
}
