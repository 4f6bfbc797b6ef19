//! Command implementations for the hashcrack CLI
//!
//! Each command is organized into its own module.

pub mod config;
pub mod hash;
pub mod run;
pub mod version;
