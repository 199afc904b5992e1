//! Layered configuration for a sync run.
//!
//! Values are resolved in increasing order of precedence:
//!
//! 1. Built-in defaults (see [`crate::constants`])
//! 2. The `[sync]` table of `portfolio-sync.toml` in the working directory,
//!    or of the file passed with `--config`
//! 3. Environment variables (`GITHUB_TOKEN`, `PORTFOLIO_SYNC_API_URL`)
//! 4. Command-line flags
//!
//! # File Format
//!
//! ```toml
//! [sync]
//! source = "data/projects.json"
//! output = ".github/sync-metadata.json"
//! max_parallel = 4
//! timeout_secs = 20
//! ```
//!
//! The API token is only ever read from `GITHUB_TOKEN`. It has no file key,
//! so it cannot end up in a committed configuration file. Without a token the
//! client falls back to unauthenticated rate limits.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::constants::{
    API_URL_ENV, CONFIG_FILE_NAME, DEFAULT_API_URL, DEFAULT_HOST, DEFAULT_MAX_PARALLEL,
    DEFAULT_MAX_RETRIES, DEFAULT_OUTPUT_PATH, DEFAULT_REFERENCE_FIELD, DEFAULT_SOURCE_PATH,
    DEFAULT_TIMEOUT_SECS, TOKEN_ENV,
};
use crate::core::SyncError;

/// Resolved settings for the sync and report commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyncConfig {
    /// Project dataset to scan for repository references
    pub source: PathBuf,
    /// Snapshot destination
    pub output: PathBuf,
    /// GitHub REST API base URL
    pub api_url: String,
    /// Host marker preceding `owner/name` in reference URLs
    pub host: String,
    /// Record field holding the repository URL
    pub reference_field: String,
    /// Repositories fetched concurrently
    pub max_parallel: usize,
    /// Per-request timeout
    pub timeout_secs: u64,
    /// Retries for transient request failures
    pub max_retries: usize,
    /// Bearer token, from the environment only
    #[serde(skip)]
    pub token: Option<String>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::from(DEFAULT_SOURCE_PATH),
            output: PathBuf::from(DEFAULT_OUTPUT_PATH),
            api_url: DEFAULT_API_URL.to_string(),
            host: DEFAULT_HOST.to_string(),
            reference_field: DEFAULT_REFERENCE_FIELD.to_string(),
            max_parallel: DEFAULT_MAX_PARALLEL,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_retries: DEFAULT_MAX_RETRIES,
            token: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    sync: SyncConfig,
}

/// Command-line values that take precedence over everything else.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub source: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub max_parallel: Option<usize>,
    pub timeout_secs: Option<u64>,
}

impl SyncConfig {
    /// Parse the contents of a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Config`] on invalid TOML or unknown keys.
    pub fn from_toml_str(content: &str) -> Result<Self, SyncError> {
        let file: ConfigFile = toml::from_str(content).map_err(|e| SyncError::Config {
            message: format!("invalid {CONFIG_FILE_NAME}: {e}"),
        })?;
        Ok(file.sync)
    }

    /// Load the file layer.
    ///
    /// An explicit path must exist. Without one, `portfolio-sync.toml` in the
    /// working directory is used when present and defaults otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Config`] if the file cannot be read or parsed.
    pub async fn load(explicit: Option<&Path>) -> Result<Self, SyncError> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let default = PathBuf::from(CONFIG_FILE_NAME);
                if !tokio::fs::try_exists(&default).await.unwrap_or(false) {
                    debug!("No {} found, using defaults", CONFIG_FILE_NAME);
                    return Ok(Self::default());
                }
                default
            }
        };

        let content = tokio::fs::read_to_string(&path).await.map_err(|e| SyncError::Config {
            message: format!("cannot read {}: {e}", path.display()),
        })?;
        debug!("Loaded configuration from {}", path.display());
        Self::from_toml_str(&content)
    }

    /// Apply environment variables using `lookup` to read them.
    ///
    /// Empty values are treated as unset.
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(token) = read(TOKEN_ENV) {
            self.token = Some(token.trim().to_string());
        }
        if let Some(url) = read(API_URL_ENV) {
            self.api_url = url;
        }
    }

    /// Apply environment variables from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    /// Apply command-line overrides.
    #[must_use]
    pub fn with_overrides(mut self, overrides: &ConfigOverrides) -> Self {
        if let Some(source) = &overrides.source {
            self.source.clone_from(source);
        }
        if let Some(output) = &overrides.output {
            self.output.clone_from(output);
        }
        if let Some(n) = overrides.max_parallel {
            self.max_parallel = n;
        }
        if let Some(secs) = overrides.timeout_secs {
            self.timeout_secs = secs;
        }
        self
    }

    /// Check values that would make a run meaningless.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Config`] describing the first invalid value.
    pub fn validate(&self) -> Result<(), SyncError> {
        let invalid = |message: &str| {
            Err(SyncError::Config {
                message: message.to_string(),
            })
        };

        if self.max_parallel == 0 {
            return invalid("max_parallel must be at least 1");
        }
        if self.timeout_secs == 0 {
            return invalid("timeout_secs must be at least 1");
        }
        if self.host.trim().is_empty() {
            return invalid("host must not be empty");
        }
        if self.reference_field.trim().is_empty() {
            return invalid("reference_field must not be empty");
        }
        Ok(())
    }

    /// Per-request timeout as a [`Duration`].
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Whether an API token is configured.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}
