//! `portfolio-sync sync`: fetch repository data and write the snapshot.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use tracing::debug;

use super::{CliConfig, resolve_config};
use crate::config::ConfigOverrides;
use crate::github::GitHubClient;
use crate::sync::{self, SyncOutcome};

/// Fetch README and metadata for every repository in the dataset.
#[derive(Args, Debug, Default)]
pub struct SyncCommand {
    /// Maximum number of repositories fetched at the same time
    #[arg(long, value_name = "NUM")]
    max_parallel: Option<usize>,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,
}

impl SyncCommand {
    pub(super) async fn execute(self, cli: &CliConfig, overrides: ConfigOverrides) -> Result<()> {
        let overrides = ConfigOverrides {
            max_parallel: self.max_parallel,
            timeout_secs: self.timeout,
            ..overrides
        };
        let config = resolve_config(cli, &overrides).await?;
        debug!(
            "Syncing {} -> {} via {} (authenticated: {})",
            config.source.display(),
            config.output.display(),
            config.api_url,
            config.is_authenticated()
        );

        println!("{}\n", "🔄 Syncing projects from GitHub...".cyan().bold());

        let client = GitHubClient::new(&config)?;
        match sync::run(&config, &client, cli.no_progress).await? {
            SyncOutcome::NothingToDo => {}
            SyncOutcome::Completed {
                summary,
                output,
                ..
            } => sync::print_summary(&summary, &output),
        }

        Ok(())
    }
}
