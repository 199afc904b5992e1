//! Error handling for portfolio-sync.
//!
//! Two layers of errors exist:
//!
//! - [`SyncError`] covers the fatal conditions that abort a run: the source
//!   dataset cannot be read or parsed, the snapshot cannot be written, or the
//!   configuration is invalid. These reach `main`, are rendered through
//!   [`ErrorContext`], and end the process with exit code 1.
//! - Per-repository fetch failures never get here. They are converted into
//!   "absent" values inside [`crate::github`] and only ever logged.
//!
//! [`user_friendly_error`] turns any `anyhow::Error` into an [`ErrorContext`]
//! with a suggestion the operator can act on.

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// Fatal errors surfaced to the operator.
#[derive(Error, Debug)]
pub enum SyncError {
    /// The project dataset could not be read from disk.
    #[error("Cannot read source dataset: {path}")]
    SourceUnreadable {
        /// Path that was attempted
        path: String,
        /// Underlying reason
        reason: String,
    },

    /// The project dataset was read but is not valid in its declared format.
    #[error("Invalid {format} in source dataset {path}")]
    SourceParse {
        /// Path of the dataset
        path: String,
        /// Detected format (json, toml, yaml)
        format: String,
        /// Parser message
        reason: String,
    },

    /// The snapshot file or its parent directory could not be written.
    #[error("Cannot write snapshot: {path}")]
    SnapshotWrite {
        /// Destination path
        path: String,
        /// Underlying reason
        reason: String,
    },

    /// An existing snapshot could not be read or decoded.
    #[error("Cannot read snapshot: {path}")]
    SnapshotRead {
        /// Snapshot path
        path: String,
        /// Underlying reason
        reason: String,
    },

    /// Configuration file or values are invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// What is wrong
        message: String,
    },

    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {reason}")]
    HttpClient {
        /// Builder error
        reason: String,
    },

    #[error("{message}")]
    Other {
        /// Free-form message
        message: String,
    },
}

impl Clone for SyncError {
    fn clone(&self) -> Self {
        match self {
            Self::SourceUnreadable {
                path,
                reason,
            } => Self::SourceUnreadable {
                path: path.clone(),
                reason: reason.clone(),
            },
            Self::SourceParse {
                path,
                format,
                reason,
            } => Self::SourceParse {
                path: path.clone(),
                format: format.clone(),
                reason: reason.clone(),
            },
            Self::SnapshotWrite {
                path,
                reason,
            } => Self::SnapshotWrite {
                path: path.clone(),
                reason: reason.clone(),
            },
            Self::SnapshotRead {
                path,
                reason,
            } => Self::SnapshotRead {
                path: path.clone(),
                reason: reason.clone(),
            },
            Self::Config {
                message,
            } => Self::Config {
                message: message.clone(),
            },
            Self::HttpClient {
                reason,
            } => Self::HttpClient {
                reason: reason.clone(),
            },
            Self::Other {
                message,
            } => Self::Other {
                message: message.clone(),
            },
        }
    }
}

/// An error paired with optional details and a suggested fix.
#[derive(Debug)]
pub struct ErrorContext {
    pub error: SyncError,
    pub suggestion: Option<String>,
    pub details: Option<String>,
}

impl ErrorContext {
    #[must_use]
    pub const fn new(error: SyncError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error to stderr with colored labels.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert an arbitrary error into an [`ErrorContext`] for display.
///
/// Known [`SyncError`] variants get tailored suggestions. I/O errors are
/// classified by kind. Anything else keeps its full `anyhow` cause chain in
/// the message.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(sync_error) = error.downcast_ref::<SyncError>() {
        return create_error_context(sync_error.clone());
    }

    if let Some(file_error) = error.downcast_ref::<crate::core::file_error::FileOperationError>()
    {
        return ErrorContext::new(SyncError::Other {
            message: file_error.user_message(),
        });
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        match io_error.kind() {
            std::io::ErrorKind::PermissionDenied => {
                return ErrorContext::new(SyncError::Other {
                    message: format!("Permission denied: {io_error}"),
                })
                .with_suggestion("Check file ownership and permissions in the project directory");
            }
            std::io::ErrorKind::NotFound => {
                return ErrorContext::new(SyncError::Other {
                    message: format!("File not found: {io_error}"),
                })
                .with_suggestion("Check that the path exists and is spelled correctly");
            }
            _ => {}
        }
    }

    let mut message = error.to_string();
    let chain: Vec<String> = error.chain().skip(1).map(std::string::ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(SyncError::Other {
        message,
    })
}

fn create_error_context(error: SyncError) -> ErrorContext {
    match &error {
        SyncError::SourceUnreadable { path, reason } => ErrorContext::new(error.clone())
            .with_details(reason.clone())
            .with_suggestion(format!(
                "Make sure '{path}' exists, or point to the dataset with --source or the `source` key in portfolio-sync.toml"
            )),

        SyncError::SourceParse { format, reason, .. } => ErrorContext::new(error.clone())
            .with_details(reason.clone())
            .with_suggestion(format!(
                "Fix the {format} syntax in the dataset. Project records should live in a `projects` list"
            )),

        SyncError::SnapshotWrite { path, reason } => ErrorContext::new(error.clone())
            .with_details(reason.clone())
            .with_suggestion(format!(
                "Check that the directory for '{path}' can be created and written, then re-run the sync"
            )),

        SyncError::SnapshotRead { reason, .. } => ErrorContext::new(error.clone())
            .with_details(reason.clone())
            .with_suggestion("The snapshot may be corrupt. Re-run `portfolio-sync` to regenerate it"),

        SyncError::Config { .. } => ErrorContext::new(error.clone())
            .with_suggestion("Check portfolio-sync.toml and the command-line flags"),

        SyncError::HttpClient { .. } => ErrorContext::new(error.clone())
            .with_suggestion("Check the API URL and TLS configuration"),

        _ => ErrorContext::new(error.clone()),
    }
}
