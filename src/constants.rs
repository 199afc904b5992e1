//! Global constants used throughout the portfolio-sync codebase.
//!
//! Default paths, limits, and timeouts live here so that the numbers shared
//! between the configuration layer, the API client, and the tests stay in
//! one place.

use std::time::Duration;

/// Default location of the project dataset, relative to the working directory.
pub const DEFAULT_SOURCE_PATH: &str = "src/data/projects.ts";

/// Default location of the snapshot written by a sync run.
pub const DEFAULT_OUTPUT_PATH: &str = ".github/sync-metadata.json";

/// Name of the optional project configuration file.
pub const CONFIG_FILE_NAME: &str = "portfolio-sync.toml";

/// Default GitHub REST API base URL.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Host marker that precedes `owner/name` in repository URLs.
pub const DEFAULT_HOST: &str = "github.com";

/// Record field holding the repository URL in the project dataset.
pub const DEFAULT_REFERENCE_FIELD: &str = "github";

/// Environment variable carrying the optional API bearer token.
pub const TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Environment variable overriding the API base URL.
pub const API_URL_ENV: &str = "PORTFOLIO_SYNC_API_URL";

/// Environment variable disabling progress bars when set to any value.
pub const NO_PROGRESS_ENV: &str = "PORTFOLIO_SYNC_NO_PROGRESS";

/// Maximum number of characters kept in a README preview.
pub const MAX_PREVIEW_CHARS: usize = 500;

/// Default number of repositories fetched concurrently.
///
/// GitHub answers bursts of parallel requests with secondary rate limits, so
/// this stays well below what the network could sustain.
pub const DEFAULT_MAX_PARALLEL: usize = 4;

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;

/// Default number of retries for transient request failures.
pub const DEFAULT_MAX_RETRIES: usize = 2;

/// Backoff multiplier for request retries.
///
/// Retries wait `2^n * 50ms`: 100ms, 200ms, 400ms... capped at
/// [`MAX_BACKOFF_DELAY`].
pub const RETRY_BACKOFF_FACTOR_MS: u64 = 50;

/// Maximum delay between request retries (2 seconds).
pub const MAX_BACKOFF_DELAY: Duration = Duration::from_secs(2);

/// GitHub REST API version pinned in every request.
pub const GITHUB_API_VERSION: &str = "2022-11-28";
