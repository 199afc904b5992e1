//! `portfolio-sync report`: review the last snapshot.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use tracing::warn;

use super::{CliConfig, resolve_config};
use crate::config::{ConfigOverrides, SyncConfig};
use crate::report::{Report, missing_snapshot_guidance};
use crate::snapshot::SyncSnapshot;
use crate::source::{
    ExtractOptions, RepositoryReference, SourceFormat, discover_references, read_dataset,
};

/// Show what the last sync produced and what needs attention.
#[derive(Args, Debug)]
pub struct ReportCommand {
    /// Output format (table or json)
    #[arg(long, default_value = "table", value_parser = ["table", "json"])]
    format: String,
}

impl ReportCommand {
    pub(super) async fn execute(self, cli: &CliConfig, overrides: ConfigOverrides) -> Result<()> {
        let config = resolve_config(cli, &overrides).await?;
        let json = self.format == "json";

        if !json {
            println!("{}\n", "📋 Checking project descriptions...".cyan().bold());
        }

        let Some(snapshot) = SyncSnapshot::load(&config.output)? else {
            let guidance = missing_snapshot_guidance(&config.output);
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "error": "snapshot not found",
                        "hint": guidance,
                    }))?
                );
            } else {
                println!("{}", guidance.yellow());
            }
            return Ok(());
        };

        let dataset = dataset_references(&config).await;
        let report = Report::build(&snapshot, dataset.as_deref());

        if json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            print!("{}", report.render_text(&snapshot));
        }
        Ok(())
    }
}

/// Valid references from the dataset, or `None` if it cannot be read.
async fn dataset_references(config: &SyncConfig) -> Option<Vec<RepositoryReference>> {
    let content = match read_dataset(&config.source).await {
        Ok(content) => content,
        Err(e) => {
            warn!("Skipping dataset comparison: {}", e);
            return None;
        }
    };

    let options = ExtractOptions {
        field: &config.reference_field,
        host: &config.host,
    };
    match discover_references(&content, SourceFormat::from_path(&config.source), &options, &config.source)
    {
        Ok(discovered) => Some(discovered.into_iter().filter_map(|d| d.parsed.ok()).collect()),
        Err(e) => {
            warn!("Skipping dataset comparison: {}", e);
            None
        }
    }
}
