//! Configuration command implementations
//!
//! Commands for inspecting and validating the merged hashcrack configuration.

use crate::cli::{ConfigCommands, ConfigFormat, Output};
use crate::config::ConfigLoader;
use anyhow::{Context, Result};
use std::path::Path;
use std::process::ExitCode;

/// Execute config commands
pub async fn execute(
    cmd: ConfigCommands,
    config: Option<&Path>,
    output: &Output,
) -> Result<ExitCode> {
    let loader =
        ConfigLoader::load_with_custom_config(config).context("Failed to load configuration")?;

    match cmd {
        ConfigCommands::Validate => validate(&loader, output),
        ConfigCommands::Show { format } => show(&loader, format, output),
    }
}

fn validate(loader: &ConfigLoader, output: &Output) -> Result<ExitCode> {
    let settings = loader.settings().context("Configuration is invalid")?;
    let pipeline = settings
        .pipeline_config()
        .context("Configuration is invalid")?;
    settings
        .input
        .delimiter()
        .context("Configuration is invalid")?;

    output.success("Configuration is valid");
    output.key_value("Algorithm:", pipeline.target.algorithm().as_str(), false);
    output.key_value("Workers:", &pipeline.worker_count.to_string(), false);
    output.key_value(
        "Max workers:",
        &pipeline.effective_max_workers().to_string(),
        false,
    );
    output.key_value("Chunk size:", &pipeline.chunk_size.to_string(), false);
    output.key_value(
        "Queue capacity:",
        &pipeline.effective_queue_capacity().to_string(),
        false,
    );
    output.key_value("Timeout:", &format!("{}s", pipeline.timeout.as_secs()), false);

    if !settings.input.csv_path.is_file() {
        output.warning(&format!(
            "Candidate file {} does not exist yet",
            settings.input.csv_path.display()
        ));
    }

    Ok(ExitCode::SUCCESS)
}

fn show(loader: &ConfigLoader, format: ConfigFormat, output: &Output) -> Result<ExitCode> {
    let config = loader.get_full_config()?;

    let rendered = match format {
        ConfigFormat::Toml => {
            toml::to_string_pretty(&config).context("Failed to render configuration as TOML")?
        }
        ConfigFormat::Json => serde_json::to_string_pretty(&config)
            .context("Failed to render configuration as JSON")?,
        ConfigFormat::Yaml => {
            serde_yml::to_string(&config).context("Failed to render configuration as YAML")?
        }
    };

    output.raw(rendered.trim_end());
    Ok(ExitCode::SUCCESS)
}
