//! GitHub REST API access.
//!
//! Two endpoints are read per repository:
//!
//! - `GET /repos/{owner}/{repo}/readme` for the default README, base64 encoded
//! - `GET /repos/{owner}/{repo}` for description, topics and star count
//!
//! Both requests for a repository run concurrently. A failed request is
//! logged at `warn` level and reported as absent; it never fails the run.
//! Connection errors, timeouts and 5xx responses are retried with exponential
//! backoff, rate limits and other client errors are not.

pub mod client;
pub mod error;
pub mod models;

pub use client::{GitHubClient, RepositoryData};
pub use error::FetchError;
pub use models::{ReadmeResponse, RepositoryMetadata};
