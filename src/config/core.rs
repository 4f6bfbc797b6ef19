use super::Settings;
use super::smart_load;
use crate::error::{PipelineError, Result};
use figment::{
    Figment,
    providers::{Env, Format, Json, Toml, Yaml},
};
use std::path::{Path, PathBuf};

// Embed the default config at compile time
const DEFAULT_CONFIG: &str = include_str!("../../default-config.toml");

/// Values given on the command line; they win over every other layer
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub input: Option<PathBuf>,
    pub target: Option<String>,
    pub algorithm: Option<String>,
    pub workers: Option<usize>,
    pub max_workers: Option<usize>,
    pub chunk_size: Option<usize>,
    pub timeout: Option<u64>,
    pub salt: Option<String>,
    pub salt_length: Option<usize>,
    pub iterations: Option<u32>,
    pub output: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
    pub log_level: Option<String>,
}

pub struct ConfigLoader {
    figment: Figment,
}

impl ConfigLoader {
    pub fn load() -> Result<Self> {
        Self::load_with_custom_config(None)
    }

    /// Layer embedded defaults, then either `custom_config` or the project
    /// files in the working directory, then `HASHCRACK_*` environment variables.
    pub fn load_with_custom_config(custom_config: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new().merge(Toml::string(DEFAULT_CONFIG)); // Embedded defaults

        if let Some(custom_path) = custom_config {
            if !custom_path.is_file() {
                return Err(PipelineError::Configuration(format!(
                    "Configuration file not found: {}",
                    custom_path.display()
                )));
            }
            figment = figment.merge(smart_load::auto(custom_path));
        } else {
            figment = figment
                .merge(Toml::file("hashcrack.toml"))
                .merge(Json::file("hashcrack.json"))
                .merge(Yaml::file("hashcrack.yaml"))
                .merge(Yaml::file("hashcrack.yml"));
        }

        // Environment variables: HASHCRACK_GENERAL__CHUNK_SIZE=500
        figment = figment.merge(Env::prefixed("HASHCRACK_").split("__"));

        Ok(ConfigLoader { figment })
    }

    /// Apply command line overrides on top of all other layers.
    pub fn with_overrides(mut self, overrides: &CliOverrides) -> Self {
        let mut figment = self.figment;

        if let Some(input) = &overrides.input {
            figment = figment.merge(("input.csv_path", input));
        }
        if let Some(target) = &overrides.target {
            figment = figment.merge(("hash.target_hash", target));
        }
        if let Some(algorithm) = &overrides.algorithm {
            figment = figment.merge(("hash.algorithm", algorithm));
        }
        if let Some(workers) = overrides.workers {
            figment = figment.merge(("general.worker_count", workers));
        }
        if let Some(max_workers) = overrides.max_workers {
            figment = figment.merge(("general.max_workers", max_workers));
        }
        if let Some(chunk_size) = overrides.chunk_size {
            figment = figment.merge(("general.chunk_size", chunk_size));
        }
        if let Some(timeout) = overrides.timeout {
            figment = figment.merge(("general.timeout_seconds", timeout));
        }
        if let Some(salt) = &overrides.salt {
            figment = figment.merge(("hash.pbkdf2_salt", salt));
        }
        if let Some(salt_length) = overrides.salt_length {
            figment = figment.merge(("hash.pbkdf2_salt_length", salt_length));
        }
        if let Some(iterations) = overrides.iterations {
            figment = figment.merge(("hash.pbkdf2_iterations", iterations));
        }
        if let Some(output) = &overrides.output {
            figment = figment.merge(("output.results_path", output));
        }
        if let Some(log_file) = &overrides.log_file {
            figment = figment.merge(("output.log_path", log_file));
        }
        if let Some(log_level) = &overrides.log_level {
            figment = figment.merge(("output.log_level", log_level));
        }

        self.figment = figment;
        self
    }

    /// Extract the typed settings.
    pub fn settings(&self) -> Result<Settings> {
        self.figment
            .extract()
            .map_err(|e| PipelineError::Configuration(e.to_string()))
    }

    /// Get the full merged configuration as a structured value
    pub fn get_full_config(&self) -> Result<serde_json::Value> {
        self.figment
            .extract()
            .map_err(|e| PipelineError::Configuration(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LogLevel;
    use tempfile::TempDir;

    #[test]
    fn test_config_loads_defaults() {
        let settings = ConfigLoader::load().unwrap().settings().unwrap();

        assert_eq!(settings.general.chunk_size, 1000);
        assert_eq!(settings.general.timeout_seconds, 30);
        assert_eq!(settings.hash.algorithm, "SHA256");
        assert_eq!(settings.hash.pbkdf2_iterations, 100_000);
        assert_eq!(settings.hash.pbkdf2_salt_length, 0);
        assert_eq!(settings.input.csv_delimiter, ",");
        assert_eq!(settings.output.log_level, LogLevel::Info);
    }

    #[test]
    fn test_custom_config_overrides_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.json");
        std::fs::write(
            &path,
            r#"{"general": {"worker_count": 3, "chunk_size": 7}, "hash": {"algorithm": "SHA512"}}"#,
        )
        .unwrap();

        let settings = ConfigLoader::load_with_custom_config(Some(&path))
            .unwrap()
            .settings()
            .unwrap();
        assert_eq!(settings.general.worker_count, Some(3));
        assert_eq!(settings.general.chunk_size, 7);
        assert_eq!(settings.hash.algorithm, "SHA512");
        // Untouched values keep their defaults
        assert_eq!(settings.general.timeout_seconds, 30);
    }

    #[test]
    fn test_missing_custom_config_is_an_error() {
        let err = ConfigLoader::load_with_custom_config(Some(Path::new("non_existent.toml")));
        assert!(matches!(err, Err(PipelineError::Configuration(_))));
    }

    #[test]
    fn test_cli_overrides_win() {
        let overrides = CliOverrides {
            workers: Some(0),
            chunk_size: Some(42),
            target: Some("abc".to_string()),
            ..Default::default()
        };
        let settings = ConfigLoader::load()
            .unwrap()
            .with_overrides(&overrides)
            .settings()
            .unwrap();
        assert_eq!(settings.general.worker_count, Some(0));
        assert_eq!(settings.general.chunk_size, 42);
        assert_eq!(settings.hash.target_hash, "abc");

        let err = settings.pipeline_config().unwrap_err();
        // The malformed target is reported before the worker count
        assert!(matches!(err, PipelineError::Configuration(_)));
    }

    #[test]
    fn test_full_config_is_structured() {
        let config = ConfigLoader::load().unwrap().get_full_config().unwrap();
        assert_eq!(config["general"]["chunk_size"], 1000);
        assert_eq!(config["hash"]["pbkdf2_salt_length"], 0);
    }
}
