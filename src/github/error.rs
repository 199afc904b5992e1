//! Per-request fetch errors.

use thiserror::Error;

/// Why a single GitHub API call failed.
///
/// These never abort a sync run. [`crate::github::GitHubClient`] logs them
/// and turns the result into "absent".
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Connection-level failure (DNS, TLS, reset)
    #[error("request failed: {reason}")]
    Transport {
        reason: String,
    },

    #[error("request timed out")]
    Timeout,

    #[error("not found (404)")]
    NotFound,

    /// Primary or secondary rate limit hit
    #[error("rate limit exceeded{}", reset_suffix(.reset))]
    RateLimited {
        reset: Option<u64>,
    },

    #[error("HTTP {status}: {message}")]
    Status {
        status: u16,
        message: String,
    },

    /// Body could not be decoded (JSON or base64)
    #[error("invalid response: {reason}")]
    Decode {
        reason: String,
    },

    #[error("unsupported README encoding '{encoding}'")]
    UnsupportedEncoding {
        encoding: String,
    },

    #[error("cannot build request URL: {reason}")]
    InvalidUrl {
        reason: String,
    },
}

fn reset_suffix(reset: &Option<u64>) -> String {
    match reset {
        Some(at) => format!(" (resets at unix time {at})"),
        None => String::new(),
    }
}

impl FetchError {
    /// Whether retrying the same request may succeed.
    ///
    /// Only connection failures, timeouts and 5xx responses qualify. Rate
    /// limits are not retried.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport { .. } | Self::Timeout => true,
            Self::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }

    pub(crate) fn from_reqwest(error: &reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else if error.is_decode() {
            Self::Decode {
                reason: error.to_string(),
            }
        } else {
            Self::Transport {
                reason: error.to_string(),
            }
        }
    }
}
