//! Snapshot model and persistence.
//!
//! A snapshot is the single artifact a sync run produces. It is rewritten in
//! full on every run:
//!
//! ```json
//! {
//!   "lastSync": "2024-05-01T12:00:00.000Z",
//!   "projects": [
//!     {
//!       "repo": "acme/widget",
//!       "description": "Widgets",
//!       "topics": ["tools"],
//!       "stars": 42,
//!       "readmePreview": "A tiny widget library."
//!     }
//!   ]
//! }
//! ```
//!
//! Repositories for which neither the README nor the metadata could be
//! fetched are left out. Repositories with only one of the two are kept, with
//! defaults standing in for whatever is missing.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::core::SyncError;
use crate::core::file_error::FileOperationError;
use crate::github::RepositoryData;
use crate::markdown::readme_preview;
use crate::source::RepositoryReference;
use crate::utils::{read_text_file, write_json_file};

/// One repository in the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncRecord {
    /// `owner/name`
    pub repo: String,
    pub description: Option<String>,
    pub topics: Vec<String>,
    pub stars: u64,
    #[serde(rename = "readmePreview")]
    pub readme_preview: Option<String>,
}

impl SyncRecord {
    /// Build a record from whatever was fetched for `reference`.
    ///
    /// Returns `None` when nothing was fetched at all.
    #[must_use]
    pub fn from_parts(reference: &RepositoryReference, data: &RepositoryData) -> Option<Self> {
        if data.is_empty() {
            return None;
        }

        let (description, topics, stars) = match &data.metadata {
            Some(meta) => (
                meta.description.clone().filter(|d| !d.is_empty()),
                meta.topics.clone(),
                meta.star_count,
            ),
            None => (None, Vec::new(), 0),
        };

        Some(Self {
            repo: reference.key(),
            description,
            topics,
            stars,
            readme_preview: readme_preview(data.readme.as_deref()),
        })
    }
}

/// The persisted result of a sync run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncSnapshot {
    #[serde(with = "rfc3339_millis")]
    pub last_sync: DateTime<Utc>,
    pub projects: Vec<SyncRecord>,
}

impl SyncSnapshot {
    /// Assemble a snapshot from fetch results in discovery order.
    pub fn build<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (&'a RepositoryReference, &'a RepositoryData)>,
    {
        Self::build_at(entries, Utc::now())
    }

    /// Same as [`SyncSnapshot::build`] with an explicit timestamp.
    pub fn build_at<'a, I>(entries: I, last_sync: DateTime<Utc>) -> Self
    where
        I: IntoIterator<Item = (&'a RepositoryReference, &'a RepositoryData)>,
    {
        let projects = entries
            .into_iter()
            .filter_map(|(reference, data)| SyncRecord::from_parts(reference, data))
            .collect();

        Self {
            last_sync,
            projects,
        }
    }

    /// Write the snapshot as pretty JSON, creating parent directories.
    ///
    /// # Errors
    ///
    /// [`SyncError::SnapshotWrite`] if the file cannot be written. The
    /// previous snapshot, if any, is left untouched in that case.
    pub fn write(&self, path: &Path) -> Result<(), SyncError> {
        write_json_file(path, self, true).map_err(|e| SyncError::SnapshotWrite {
            path: path.display().to_string(),
            reason: match e.downcast_ref::<FileOperationError>() {
                Some(file_error) => file_error.source.to_string(),
                None => e.to_string(),
            },
        })?;
        info!("Wrote {} project(s) to {}", self.projects.len(), path.display());
        Ok(())
    }

    /// Read a snapshot written by an earlier run.
    ///
    /// Returns `Ok(None)` when no snapshot exists yet.
    ///
    /// # Errors
    ///
    /// [`SyncError::SnapshotRead`] if the file exists but cannot be read or
    /// is not a valid snapshot.
    pub fn load(path: &Path) -> Result<Option<Self>, SyncError> {
        let content = match read_text_file(path, "sync snapshot") {
            Ok(content) => content,
            Err(e) if e.is_not_found() => return Ok(None),
            Err(e) => {
                return Err(SyncError::SnapshotRead {
                    path: path.display().to_string(),
                    reason: e.source.to_string(),
                });
            }
        };

        serde_json::from_str(&content).map(Some).map_err(|e| SyncError::SnapshotRead {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    /// `lastSync` exactly as it appears in the file.
    #[must_use]
    pub fn last_sync_string(&self) -> String {
        self.last_sync.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// Find a record by `owner/name`.
    #[must_use]
    pub fn record(&self, repo: &str) -> Option<&SyncRecord> {
        self.projects.iter().find(|r| r.repo == repo)
    }
}

/// `lastSync` is always written with millisecond precision and a `Z` suffix.
mod rfc3339_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
