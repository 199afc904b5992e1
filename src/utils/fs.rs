//! File system helpers with atomic writes and contextual errors.
//!
//! Every fallible operation here reports a [`FileOperationError`] naming the
//! operation, the path and its purpose, so that fatal failures at the start
//! (reading the dataset) and end (writing the snapshot) of a run are easy to
//! diagnose.

use crate::core::file_error::{FileOperation, FileOperationError, FileResultExt};
use std::fs;
use std::io::Write;
use std::path::Path;

/// Ensures a directory exists, creating it and all parents if needed.
///
/// # Errors
///
/// Fails when the directory cannot be created, or when the path exists but is
/// not a directory.
pub fn ensure_dir(path: &Path) -> Result<(), FileOperationError> {
    if path.as_os_str().is_empty() {
        return Ok(());
    }

    if !path.exists() {
        fs::create_dir_all(path).with_file_context(FileOperation::CreateDir, path, "output directory")?;
    } else if !path.is_dir() {
        return Err(FileOperationError::new(
            FileOperation::CreateDir,
            path,
            "output directory",
            std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                "path exists but is not a directory",
            ),
        ));
    }
    Ok(())
}

/// Atomically writes bytes to a file.
///
/// Content goes to a temporary file in the destination directory first, is
/// synced to disk, and is then renamed over the target. Readers therefore see
/// either the previous file or the complete new one, never a partial write.
/// Missing parent directories are created.
///
/// # Errors
///
/// Fails if the parent directory cannot be created or the temp file cannot be
/// written or persisted. The temp file is removed on failure.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<(), FileOperationError> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    ensure_dir(parent)?;

    let mut temp = tempfile::Builder::new()
        .prefix(".portfolio-sync")
        .suffix(".tmp")
        .tempfile_in(parent)
        .with_file_context(FileOperation::Write, parent, "temporary snapshot file")?;

    temp.write_all(content).with_file_context(FileOperation::Write, temp.path(), "temporary snapshot file")?;
    temp.as_file()
        .sync_all()
        .with_file_context(FileOperation::Write, path, "flushing snapshot to disk")?;

    temp.persist(path)
        .map_err(|e| FileOperationError::new(FileOperation::Rename, path, "snapshot file", e.error))?;

    Ok(())
}

/// Reads a UTF-8 text file.
///
/// # Errors
///
/// Returns the underlying I/O error with the purpose attached.
pub fn read_text_file(path: &Path, purpose: &str) -> Result<String, FileOperationError> {
    fs::read_to_string(path).with_file_context(FileOperation::Read, path, purpose)
}

/// Serializes `data` as JSON and writes it atomically.
///
/// Pretty output uses serde_json's two-space indentation and ends with a
/// newline.
///
/// # Errors
///
/// Fails on serialization errors or any [`atomic_write`] error.
pub fn write_json_file<T>(path: &Path, data: &T, pretty: bool) -> anyhow::Result<()>
where
    T: serde::Serialize,
{
    let mut json = if pretty {
        serde_json::to_string_pretty(data)?
    } else {
        serde_json::to_string(data)?
    };
    json.push('\n');

    atomic_write(path, json.as_bytes())?;
    Ok(())
}
