//! portfolio-sync CLI entry point
//!
//! Parses arguments, runs the selected command and renders fatal errors with
//! details and suggestions before exiting with status 1.

use anyhow::Result;
use clap::Parser;
use portfolio_sync::cli;
use portfolio_sync::core::error::user_friendly_error;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    // Set up colored output for Windows
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            std::process::exit(1);
        }
    }
}
