//! Test utilities for portfolio-sync
//!
//! Helpers shared by unit and integration tests:
//!
//! - [`init_test_logging`] - opt-in tracing output for tests
//! - [`fixtures`] - dataset files in the supported formats
//! - [`github_mock`] - a `wiremock` stand-in for the GitHub REST API
//!
//! # Example
//!
//! ```rust,no_run
//! use portfolio_sync::test_utils::github_mock::{MockRepo, MockGitHub};
//!
//! # async fn example() {
//! let github = MockGitHub::start().await;
//! github.mount(&MockRepo::new("acme", "widget").readme("# Widget\n\nHello")).await;
//! let config = github.config();
//! # }
//! ```

pub mod fixtures;
pub mod github_mock;

pub use fixtures::DatasetFixture;
pub use github_mock::{MockGitHub, MockRepo};

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Uses `level` when given, otherwise `RUST_LOG`. With neither, tests run
/// without a subscriber.
///
/// ```bash
/// RUST_LOG=portfolio_sync=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}
