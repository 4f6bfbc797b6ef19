//! # hashcrack - parallel hash cracking engine
//!
//! Distributes a large set of candidate strings across a pool of worker
//! threads, digests every candidate and compares it against a single target
//! digest. Matches from all workers are gathered into one report.
//!
//! ## Features
//!
//! - **Bounded work queue**: chunks flow through a crossbeam channel with
//!   backpressure and stop markers for coordinated shutdown
//! - **Isolated workers**: a timed out or panicking worker never takes its
//!   siblings down
//! - **Digests**: SHA-256, SHA-384, SHA-512 and PBKDF2-HMAC-SHA256
//! - **Layered configuration**: embedded defaults, config files, environment
//!   variables and command line flags
//!
//! ## Quick Start
//!
//! ```bash
//! # Build a target digest
//! hashcrack hash secret
//!
//! # Search a candidate file for it
//! hashcrack run --input data/sample_data.csv --target <digest>
//! ```

pub mod cli;
pub mod config;
pub mod digest;
pub mod error;
pub mod logging;
pub mod parallel;
pub mod pipeline;
pub mod utils;

pub use cli::{Cli, Output};
pub use config::{PipelineConfig, Settings};
pub use error::{PipelineError, Result};
pub use pipeline::{Pipeline, Report};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
