use clap::Parser;
use hashcrack::cli::{self, Cli};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match cli.run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", console::style("✖").red(), e);
            cli::exit_code_for(&e)
        }
    }
}
