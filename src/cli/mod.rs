//! Command-line interface for portfolio-sync.
//!
//! ```bash
//! portfolio-sync                 # same as `portfolio-sync sync`
//! portfolio-sync sync --max-parallel 8
//! portfolio-sync report --format json
//! portfolio-sync --source data/projects.yaml --output out/meta.json sync
//! ```
//!
//! Global flags apply to every subcommand. Configuration is resolved in
//! increasing precedence from built-in defaults, `portfolio-sync.toml`,
//! environment variables and finally command-line flags.

mod report;
mod sync;

pub use report::ReportCommand;
pub use sync::SyncCommand;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::config::{ConfigOverrides, SyncConfig};
use crate::utils::progress::is_progress_disabled;

/// Settings derived from global flags, applied before any command runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliConfig {
    /// Log filter used when `RUST_LOG` is not set
    pub log_level: Option<String>,

    /// Hide progress bars
    pub no_progress: bool,

    /// Explicit configuration file; must exist when given
    pub config_path: Option<PathBuf>,
}

impl CliConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the global tracing subscriber.
    ///
    /// `RUST_LOG` wins over the level chosen by `--verbose`/`--quiet`. Logs go
    /// to stderr so that stdout only carries command output. Calling this
    /// more than once is harmless.
    pub fn init_logging(&self) {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(self.log_level.as_deref().unwrap_or("warn"))
        });

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }
}

/// Fetch README and metadata for the GitHub repositories listed in a project
/// dataset and write them to a JSON snapshot.
#[derive(Parser, Debug)]
#[command(
    name = "portfolio-sync",
    about = "Sync project metadata from GitHub into a local snapshot",
    version,
    long_about = "Reads repository links from a project dataset, fetches each repository's README \
                  and metadata from the GitHub API, and writes a consolidated JSON snapshot."
)]
pub struct Cli {
    /// Subcommand to run; defaults to `sync`
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to a configuration file (default: ./portfolio-sync.toml if present)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Disable progress bars
    #[arg(long, global = true)]
    no_progress: bool,

    /// Project dataset to read repository links from
    #[arg(long, global = true, value_name = "FILE")]
    source: Option<PathBuf>,

    /// Where the snapshot is written (and read by `report`)
    #[arg(long, global = true, value_name = "FILE")]
    output: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch repository data and write the snapshot
    Sync(SyncCommand),

    /// Review the last snapshot against the dataset (no network access)
    Report(ReportCommand),
}

impl Cli {
    /// Run the selected command with settings from the global flags.
    ///
    /// # Errors
    ///
    /// Any fatal error from the command. `main` turns it into a
    /// user-friendly message and exit code 1.
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config).await
    }

    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "warn"
        };

        CliConfig {
            log_level: Some(log_level.to_string()),
            no_progress: self.no_progress || is_progress_disabled(),
            config_path: self.config.clone(),
        }
    }

    /// Run with an explicit [`CliConfig`] instead of one built from flags.
    ///
    /// # Errors
    ///
    /// See [`Cli::execute`].
    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        config.init_logging();

        let overrides = ConfigOverrides {
            source: self.source,
            output: self.output,
            ..ConfigOverrides::default()
        };

        match self.command.unwrap_or_else(|| Commands::Sync(SyncCommand::default())) {
            Commands::Sync(cmd) => cmd.execute(&config, overrides).await,
            Commands::Report(cmd) => cmd.execute(&config, overrides).await,
        }
    }
}

/// Resolve the effective [`SyncConfig`] from file, environment and flags.
pub(crate) async fn resolve_config(cli: &CliConfig, overrides: &ConfigOverrides) -> Result<SyncConfig> {
    let mut config = SyncConfig::load(cli.config_path.as_deref())
        .await
        .context("Failed to load configuration")?;
    config.apply_env();
    let config = config.with_overrides(overrides);
    config.validate()?;
    Ok(config)
}
