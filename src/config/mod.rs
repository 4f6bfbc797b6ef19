//! Configuration management for hashcrack
//!
//! Settings are layered with figment (see [`core`]) into [`Settings`], which
//! mirrors the configuration document section by section. Before a run,
//! [`Settings::pipeline_config`] resolves defaults and validates everything
//! into an immutable [`PipelineConfig`] snapshot.

pub mod core;
pub mod smart_load;

pub use self::core::{CliOverrides, ConfigLoader};

use crate::digest::{Algorithm, TargetDigest, decode_salt};
use crate::error::{PipelineError, Result};
use crate::logging::{LogConfig, LogLevel};
use crate::parallel::default_worker_count;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub general: GeneralConfig,
    pub hash: HashConfig,
    pub input: InputConfig,
    pub output: OutputConfig,
}

/// Worker pool settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Number of workers (defaults to the number of CPU cores)
    #[serde(default)]
    pub worker_count: Option<usize>,

    /// Ceiling on simultaneously active workers (defaults to worker_count)
    #[serde(default)]
    pub max_workers: Option<usize>,

    /// Candidates per chunk
    pub chunk_size: usize,

    /// Cumulative idle time after which a worker gives up
    pub timeout_seconds: u64,

    /// How long a worker waits on the queue before checking its idle budget
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Bounded queue capacity (defaults to twice the worker count)
    #[serde(default)]
    pub queue_capacity: Option<usize>,
}

fn default_poll_interval_ms() -> u64 {
    500
}

/// Digest settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashConfig {
    /// SHA256, SHA384, SHA512 or PBKDF2
    pub algorithm: String,

    /// Hex digest to search for
    #[serde(default)]
    pub target_hash: String,

    pub pbkdf2_iterations: u32,

    /// Expected salt length in bytes, 0 disables the check
    pub pbkdf2_salt_length: usize,

    /// Hex salt, required for PBKDF2
    #[serde(default)]
    pub pbkdf2_salt: Option<String>,
}

impl HashConfig {
    /// Decoded PBKDF2 salt, checked against `pbkdf2_salt_length` when that is
    /// non-zero. Both `run` and `hash` go through here.
    pub fn salt_bytes(&self) -> Result<Option<Vec<u8>>> {
        let Some(salt) = self.pbkdf2_salt.as_deref() else {
            return Ok(None);
        };
        let salt = decode_salt(salt)?;
        let expected = self.pbkdf2_salt_length;
        if expected > 0 && salt.len() != expected {
            return Err(PipelineError::Configuration(format!(
                "pbkdf2_salt is {} bytes but pbkdf2_salt_length is {expected}",
                salt.len()
            )));
        }
        Ok(Some(salt))
    }
}

/// Candidate source settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    pub csv_path: PathBuf,

    #[serde(default = "default_delimiter")]
    pub csv_delimiter: String,

    #[serde(default)]
    pub has_header: bool,
}

fn default_delimiter() -> String {
    ",".to_string()
}

impl InputConfig {
    /// Delimiter as a single byte
    pub fn delimiter(&self) -> Result<u8> {
        match self.csv_delimiter.as_bytes() {
            [byte] => Ok(*byte),
            _ => Err(PipelineError::Configuration(format!(
                "csv_delimiter must be a single ASCII character, got '{}'",
                self.csv_delimiter
            ))),
        }
    }
}

/// Report and log settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub results_path: PathBuf,
    pub log_path: PathBuf,

    #[serde(default)]
    pub log_level: LogLevel,

    /// Mirror log events to the console
    #[serde(default = "default_verbose")]
    pub verbose: bool,
}

fn default_verbose() -> bool {
    true
}

impl OutputConfig {
    pub fn log_config(&self) -> LogConfig {
        LogConfig {
            path: self.log_path.clone(),
            level: self.log_level,
            console: self.verbose,
        }
    }
}

impl Settings {
    pub fn algorithm(&self) -> Result<Algorithm> {
        self.hash.algorithm.parse()
    }

    /// Resolve defaults and validate into the snapshot the pipeline runs with.
    pub fn pipeline_config(&self) -> Result<PipelineConfig> {
        let algorithm = self.algorithm()?;

        if algorithm == Algorithm::Pbkdf2 {
            self.hash.salt_bytes()?;
        }

        let target = TargetDigest::parse(
            algorithm,
            &self.hash.target_hash,
            self.hash.pbkdf2_salt.as_deref(),
        )?;

        let general = &self.general;
        let mut config = PipelineConfig::new(target)
            .with_workers(general.worker_count.unwrap_or_else(default_worker_count))
            .with_chunk_size(general.chunk_size)
            .with_timeout(Duration::from_secs(general.timeout_seconds))
            .with_poll_interval(Duration::from_millis(general.poll_interval_ms))
            .with_pbkdf2_iterations(self.hash.pbkdf2_iterations);
        config.max_workers = general.max_workers;
        config.queue_capacity = general.queue_capacity;

        config.validate()?;
        Ok(config)
    }
}

/// Immutable snapshot of resolved pipeline settings
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub worker_count: usize,
    /// `None` means no ceiling beyond `worker_count`
    pub max_workers: Option<usize>,
    pub chunk_size: usize,
    /// `None` means twice the worker count
    pub queue_capacity: Option<usize>,
    pub timeout: Duration,
    pub poll_interval: Duration,
    pub pbkdf2_iterations: u32,
    pub target: TargetDigest,
}

impl PipelineConfig {
    pub fn new(target: TargetDigest) -> Self {
        Self {
            worker_count: default_worker_count(),
            max_workers: None,
            chunk_size: 1000,
            queue_capacity: None,
            timeout: Duration::from_secs(30),
            poll_interval: Duration::from_millis(default_poll_interval_ms()),
            pbkdf2_iterations: 100_000,
            target,
        }
    }

    pub fn with_workers(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count;
        self
    }

    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = Some(max_workers);
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = Some(capacity);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_pbkdf2_iterations(mut self, iterations: u32) -> Self {
        self.pbkdf2_iterations = iterations;
        self
    }

    pub fn effective_max_workers(&self) -> usize {
        self.max_workers.unwrap_or(self.worker_count)
    }

    pub fn effective_queue_capacity(&self) -> usize {
        self.queue_capacity
            .unwrap_or_else(|| self.worker_count.saturating_mul(2))
    }

    /// Poll interval, never longer than the timeout itself
    pub fn effective_poll_interval(&self) -> Duration {
        std::cmp::min(self.poll_interval, self.timeout)
    }

    pub fn validate(&self) -> Result<()> {
        if self.worker_count < 1 {
            return Err(PipelineError::InvalidArgument(
                "worker_count must be at least 1".to_string(),
            ));
        }
        if self.chunk_size < 1 {
            return Err(PipelineError::InvalidArgument(
                "chunk_size must be at least 1".to_string(),
            ));
        }
        if self.queue_capacity == Some(0) {
            return Err(PipelineError::InvalidArgument(
                "queue_capacity must be at least 1".to_string(),
            ));
        }
        if self.max_workers == Some(0) {
            return Err(PipelineError::Configuration(
                "max_workers must be at least 1".to_string(),
            ));
        }
        if self.timeout.is_zero() {
            return Err(PipelineError::Configuration(
                "timeout_seconds must be greater than 0".to_string(),
            ));
        }
        if self.poll_interval.is_zero() {
            return Err(PipelineError::Configuration(
                "poll_interval_ms must be greater than 0".to_string(),
            ));
        }
        if self.target.algorithm() == Algorithm::Pbkdf2 && self.pbkdf2_iterations < 1 {
            return Err(PipelineError::Configuration(
                "pbkdf2_iterations must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
