//! Integration test suite for portfolio-sync
//!
//! End-to-end tests against a mock GitHub API. They exercise the library
//! pipeline directly and the `portfolio-sync` binary through `assert_cmd`.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **pipeline**: discovery, fetching, aggregation and snapshot writing
//! - **cli**: exit codes and output of the `sync` command
//! - **report**: the read-only `report` command

mod cli;
mod pipeline;
mod report;
