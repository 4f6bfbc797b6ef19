//! Version command implementation

use crate::cli::Output;
use anyhow::Result;
use std::process::ExitCode;

/// Execute the version command
pub async fn execute(output: &Output) -> Result<ExitCode> {
    let version = env!("CARGO_PKG_VERSION");
    let name = env!("CARGO_PKG_NAME");
    let description = env!("CARGO_PKG_DESCRIPTION");

    output.header("hashcrack Version Information");
    output.status_indicator("VERSION", &format!("{name} v{version}"), true);

    output.section_header("About");
    output.key_value("Description:", description, false);
    output.key_value("Algorithms:", "SHA256, SHA384, SHA512, PBKDF2", false);
    output.key_value("CPU cores:", &num_cpus::get().to_string(), false);

    output.section_header("Build Information");
    output.key_value("Rust edition:", "2024", false);
    output.key_value("Target:", std::env::consts::ARCH, false);
    output.key_value(
        "Profile:",
        if cfg!(debug_assertions) {
            "debug"
        } else {
            "release"
        },
        false,
    );

    output.success("Run 'hashcrack --help' for usage information");
    Ok(ExitCode::SUCCESS)
}
