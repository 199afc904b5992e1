//! Core error types shared by every command.
//!
//! - [`error`] - fatal [`SyncError`]s and their user-facing rendering
//! - [`file_error`] - file operation errors with call-site context

pub mod error;
pub mod file_error;

pub use error::{ErrorContext, SyncError, user_friendly_error};
pub use file_error::{FileOperation, FileOperationError, FileResultExt};
