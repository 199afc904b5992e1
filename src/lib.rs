//! portfolio-sync - repository metadata sync for project portfolios.
//!
//! A portfolio site keeps its projects in a dataset file, and each project
//! may link to a GitHub repository. portfolio-sync reads those links, fetches
//! every repository's README and metadata from the GitHub REST API, and writes
//! a single JSON snapshot that the site (or a human) can use to refresh its
//! project descriptions.
//!
//! # Pipeline
//!
//! ```text
//! dataset ──► source ──► github ──► markdown ──► snapshot ──► .github/sync-metadata.json
//!            (refs)     (README,    (preview)    (records)
//!                        metadata)
//! ```
//!
//! - [`source`] discovers repository references in the dataset
//! - [`github`] fetches README and metadata, turning failures into "absent"
//! - [`markdown`] derives a one-paragraph preview from the README
//! - [`snapshot`] assembles and persists the snapshot
//! - [`sync`] runs the pipeline with bounded concurrency
//! - [`report`] reviews an existing snapshot without network access
//!
//! # Failure model
//!
//! Problems with a single repository never abort a run: invalid URLs are
//! skipped, failed requests leave their half of the data empty, and a
//! repository with no data at all is left out of the snapshot. Only an
//! unreadable or malformed dataset and an unwritable snapshot are fatal.
//!
//! # Example
//!
//! ```rust,no_run
//! use portfolio_sync::config::SyncConfig;
//! use portfolio_sync::github::GitHubClient;
//! use portfolio_sync::sync::{self, SyncOutcome};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let mut config = SyncConfig::default();
//! config.apply_env();
//! let client = GitHubClient::new(&config)?;
//!
//! if let SyncOutcome::Completed { summary, .. } = sync::run(&config, &client, true).await? {
//!     println!("{} of {} repositories synced", summary.succeeded, summary.found);
//! }
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod github;
pub mod markdown;
pub mod report;
pub mod snapshot;
pub mod source;
pub mod sync;
pub mod utils;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
