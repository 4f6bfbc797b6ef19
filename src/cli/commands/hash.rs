//! Hash command implementation
//!
//! Prints the digest of a single string, handy for building target digests.

use crate::cli::{HashArgs, Output};
use crate::config::{CliOverrides, ConfigLoader};
use crate::digest::{Algorithm, Digester};
use anyhow::{Context, Result};
use std::path::Path;
use std::process::ExitCode;

/// Execute the hash command
pub async fn execute(args: HashArgs, config: Option<&Path>, output: &Output) -> Result<ExitCode> {
    let overrides = CliOverrides {
        algorithm: args.algorithm,
        salt: args.salt,
        salt_length: args.salt_length,
        iterations: args.iterations,
        ..Default::default()
    };
    let settings = ConfigLoader::load_with_custom_config(config)
        .context("Failed to load configuration")?
        .with_overrides(&overrides)
        .settings()
        .context("Failed to load configuration")?;

    let algorithm = settings.algorithm()?;
    let salt = match algorithm {
        Algorithm::Pbkdf2 => settings.hash.salt_bytes()?,
        _ => None,
    };

    let digester = Digester::new(algorithm, settings.hash.pbkdf2_iterations, salt, args.length)?;
    let digest = digester.digest_hex(args.text.as_bytes())?;

    output.verbose(&format!("{algorithm} of '{}'", args.text));
    output.raw(&digest);
    Ok(ExitCode::SUCCESS)
}
