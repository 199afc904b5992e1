//! Sync orchestration.
//!
//! A run goes through four phases, strictly in this order:
//!
//! 1. Read the dataset and discover repository references.
//! 2. Fetch README and metadata for every valid reference, at most
//!    `max_parallel` repositories at a time.
//! 3. Build the snapshot from the fetch results in discovery order.
//! 4. Write the snapshot.
//!
//! Per-repository problems (invalid URLs, failed requests) are reported and
//! counted but never abort the run. Only an unreadable or malformed dataset
//! and an unwritable snapshot are fatal.
//!
//! Completion order of the fetches is irrelevant: each result is stored in a
//! slot indexed by the reference's position, and the snapshot is assembled
//! from the slots.

use colored::Colorize;
use futures::stream::{self, StreamExt};
use std::path::PathBuf;
use tracing::{info, warn};

use crate::config::SyncConfig;
use crate::core::SyncError;
use crate::github::{GitHubClient, RepositoryData};
use crate::snapshot::SyncSnapshot;
use crate::source::{
    DiscoveredReference, ExtractOptions, RepositoryReference, SourceFormat, discover_references,
    read_dataset,
};
use crate::utils::ProgressBar;

/// Counters reported at the end of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyncSummary {
    /// Every discovered reference, valid or not
    pub found: usize,
    /// Repositories that made it into the snapshot
    pub succeeded: usize,
    /// `found - succeeded`
    pub failed: usize,
    /// References whose URL could not be parsed
    pub invalid: usize,
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The dataset contains no references. Nothing was fetched or written.
    NothingToDo,
    /// The snapshot was written.
    Completed {
        summary: SyncSummary,
        snapshot: SyncSnapshot,
        output: PathBuf,
    },
}

/// Run a full sync with `config`.
///
/// # Errors
///
/// [`SyncError::SourceUnreadable`] or [`SyncError::SourceParse`] for dataset
/// problems, [`SyncError::SnapshotWrite`] if the output cannot be written.
pub async fn run(
    config: &SyncConfig,
    client: &GitHubClient,
    no_progress: bool,
) -> Result<SyncOutcome, SyncError> {
    let content = read_dataset(&config.source).await?;
    let format = SourceFormat::from_path(&config.source);
    let options = ExtractOptions {
        field: &config.reference_field,
        host: &config.host,
    };
    let discovered = discover_references(&content, format, &options, &config.source)?;

    if discovered.is_empty() {
        info!("No references in {}, nothing to sync", config.source.display());
        println!(
            "{}",
            format!("⚠️  No GitHub URLs found in {}", config.source.display()).yellow()
        );
        return Ok(SyncOutcome::NothingToDo);
    }

    println!("Found {} projects with GitHub links\n", discovered.len());

    let valid = valid_references(&discovered);
    let invalid = discovered.len() - valid.len();

    let results = fetch_all(client, &valid, config.max_parallel, no_progress).await;
    let snapshot = SyncSnapshot::build(valid.iter().zip(results.iter()));
    snapshot.write(&config.output)?;

    let succeeded = snapshot.projects.len();
    let summary = SyncSummary {
        found: discovered.len(),
        succeeded,
        failed: discovered.len() - succeeded,
        invalid,
    };
    info!(
        "Sync finished: {} found, {} synced, {} failed",
        summary.found, summary.succeeded, summary.failed
    );

    Ok(SyncOutcome::Completed {
        summary,
        snapshot,
        output: config.output.clone(),
    })
}

/// Keep the references that parsed, warning about the rest.
fn valid_references(discovered: &[DiscoveredReference]) -> Vec<RepositoryReference> {
    discovered
        .iter()
        .filter_map(|entry| match &entry.parsed {
            Ok(reference) => Some(reference.clone()),
            Err(e) => {
                warn!("Skipping reference #{}: {}", entry.position, e);
                println!("{}", format!("⚠️  Invalid GitHub URL: {}", entry.url).yellow());
                None
            }
        })
        .collect()
}

/// Fetch every repository with bounded concurrency.
///
/// The returned vector is parallel to `references`, whatever order the
/// fetches complete in.
pub async fn fetch_all(
    client: &GitHubClient,
    references: &[RepositoryReference],
    max_parallel: usize,
    no_progress: bool,
) -> Vec<RepositoryData> {
    let mut slots = vec![RepositoryData::default(); references.len()];
    if references.is_empty() {
        return slots;
    }

    let pb = ProgressBar::new(references.len() as u64, no_progress);
    pb.set_message("Fetching repository data");

    let mut fetches = stream::iter(references.iter().enumerate())
        .map(|(slot, reference)| async move { (slot, reference, client.fetch(reference).await) })
        .buffer_unordered(max_parallel.max(1));

    while let Some((slot, reference, data)) = fetches.next().await {
        pb.println(format!("📦 Processing: {}", reference.to_string().bold()));
        if data.is_empty() {
            pb.println(format!("  {}", "⚠️  No data available".yellow()));
        } else {
            pb.println(format!("  {}", "✅ Fetched data successfully".green()));
        }
        pb.inc(1);
        slots[slot] = data;
    }

    pb.finish_and_clear();
    slots
}

/// Print the end-of-run summary block.
pub fn print_summary(summary: &SyncSummary, output: &std::path::Path) {
    println!("\n{}", "📊 Summary:".bold());
    println!("  Total projects: {}", summary.found);
    println!("  Successfully synced: {}", summary.succeeded.to_string().green());
    if summary.failed > 0 {
        println!("  Failed: {}", summary.failed.to_string().red());
    } else {
        println!("  Failed: {}", summary.failed);
    }
    if summary.invalid > 0 {
        println!("  Invalid URLs: {}", summary.invalid.to_string().yellow());
    }
    println!(
        "\n{}",
        format!("✅ Sync complete! Metadata saved to {}", output.display()).green()
    );
    println!(
        "\n💡 You can now manually update project descriptions using the fetched README content."
    );
}
