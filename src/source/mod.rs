//! Source dataset reading and repository reference extraction.
//!
//! The project dataset is a list of records, some of which carry a URL to a
//! GitHub repository in a reference field (`github` by default). This module
//! finds every occurrence of that field, in order and without deduplication,
//! and parses each URL into a [`RepositoryReference`].
//!
//! # Dataset formats
//!
//! The format is chosen from the file extension:
//!
//! | Extension         | Parsing                                                   |
//! |-------------------|-----------------------------------------------------------|
//! | `.json`           | array of records, or `{ "projects": [...] }`              |
//! | `.toml`           | `[[projects]]` array of tables                            |
//! | `.yaml` / `.yml`  | sequence of records, or a mapping with `projects`         |
//! | anything else     | text scan for `github: "https://..."` occurrences         |
//!
//! Structured formats are parsed in full and the reference field is read from
//! each record directly. The text scan exists for source files that are not
//! data formats at all, such as the TypeScript module the website imports.
//!
//! Invalid URLs are not errors at this level: they are kept as discovered
//! entries with a failed parse, so the caller can warn about them and count
//! them without aborting the run.

use regex::Regex;
use serde_json::Value;
use std::fmt;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

use crate::core::SyncError;
use crate::core::file_error::{FileOperation, FileResultExt};

/// A parsed `owner/name` pair identifying a repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositoryReference {
    pub owner: String,
    pub name: String,
}

impl RepositoryReference {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Parse a repository URL of the form `.../<host>/<owner>/<name>...`.
    ///
    /// Only the first two path segments after the host marker are used. A
    /// trailing `.git` and any query or fragment on the name are dropped.
    ///
    /// # Errors
    ///
    /// [`ReferenceError::MissingHost`] when `host/` does not occur in the URL,
    /// [`ReferenceError::MissingSegments`] when owner or name is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use portfolio_sync::source::RepositoryReference;
    ///
    /// let r = RepositoryReference::parse("https://github.com/acme/widget.git", "github.com").unwrap();
    /// assert_eq!(r.key(), "acme/widget");
    ///
    /// assert!(RepositoryReference::parse("https://gitlab.com/acme/widget", "github.com").is_err());
    /// ```
    pub fn parse(url: &str, host: &str) -> Result<Self, ReferenceError> {
        let marker = format!("{host}/");
        let start = url.find(&marker).ok_or_else(|| ReferenceError::MissingHost {
            url: url.to_string(),
            host: host.to_string(),
        })?;

        let mut segments = url[start + marker.len()..].split('/');
        let owner = segments.next().unwrap_or_default();
        let name = segments
            .next()
            .unwrap_or_default()
            .split(['?', '#'])
            .next()
            .unwrap_or_default();
        let name = name.strip_suffix(".git").unwrap_or(name);

        if owner.is_empty() || name.is_empty() {
            return Err(ReferenceError::MissingSegments {
                url: url.to_string(),
            });
        }

        Ok(Self::new(owner, name))
    }

    /// The `owner/name` key used in snapshots and log lines.
    #[must_use]
    pub fn key(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

impl fmt::Display for RepositoryReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Why a reference URL could not be parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReferenceError {
    #[error("URL '{url}' does not point at {host}")]
    MissingHost {
        url: String,
        host: String,
    },

    #[error("URL '{url}' lacks an owner/name path")]
    MissingSegments {
        url: String,
    },
}

/// One occurrence of the reference field in the dataset.
#[derive(Debug, Clone)]
pub struct DiscoveredReference {
    /// Zero-based position in discovery order
    pub position: usize,
    /// The raw value as it appeared in the dataset
    pub url: String,
    /// Parse result for `url`
    pub parsed: Result<RepositoryReference, ReferenceError>,
}

/// How a dataset file is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Json,
    Toml,
    Yaml,
    /// Pattern scan over arbitrary text
    Text,
}

impl SourceFormat {
    /// Pick the format from a file extension, falling back to [`SourceFormat::Text`].
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase).as_deref() {
            Some("json") => Self::Json,
            Some("toml") => Self::Toml,
            Some("yaml" | "yml") => Self::Yaml,
            _ => Self::Text,
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Json => "JSON",
            Self::Toml => "TOML",
            Self::Yaml => "YAML",
            Self::Text => "text",
        };
        f.write_str(name)
    }
}

/// Settings that control how references are found and parsed.
#[derive(Debug, Clone)]
pub struct ExtractOptions<'a> {
    /// Record field carrying the repository URL
    pub field: &'a str,
    /// Host marker preceding `owner/name`
    pub host: &'a str,
}

/// Read the dataset file.
///
/// # Errors
///
/// Returns [`SyncError::SourceUnreadable`] if the file cannot be read.
pub async fn read_dataset(path: &Path) -> Result<String, SyncError> {
    tokio::fs::read_to_string(path)
        .await
        .with_file_context(FileOperation::Read, path, "source dataset")
        .map_err(|e| SyncError::SourceUnreadable {
            path: path.display().to_string(),
            reason: e.source.to_string(),
        })
}

/// Find every reference in `content` and parse it.
///
/// The result keeps discovery order and multiplicity. Unparsable URLs stay in
/// the list with an `Err` parse result.
///
/// # Errors
///
/// Returns [`SyncError::SourceParse`] if a structured dataset is malformed or
/// does not contain a list of records.
pub fn discover_references(
    content: &str,
    format: SourceFormat,
    options: &ExtractOptions<'_>,
    path: &Path,
) -> Result<Vec<DiscoveredReference>, SyncError> {
    let urls = extract_reference_urls(content, format, options.field).map_err(|reason| {
        SyncError::SourceParse {
            path: path.display().to_string(),
            format: format.to_string(),
            reason,
        }
    })?;

    debug!("Found {} reference(s) in {} ({})", urls.len(), path.display(), format);

    Ok(urls
        .into_iter()
        .enumerate()
        .map(|(position, url)| {
            let parsed = RepositoryReference::parse(&url, options.host);
            DiscoveredReference {
                position,
                url,
                parsed,
            }
        })
        .collect())
}

/// Extract the raw reference values from a dataset.
///
/// # Errors
///
/// Returns the parser's message for malformed structured input.
pub fn extract_reference_urls(
    content: &str,
    format: SourceFormat,
    field: &str,
) -> Result<Vec<String>, String> {
    let document: Value = match format {
        SourceFormat::Text => return Ok(scan_text(content, field)),
        SourceFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string())?,
        SourceFormat::Toml => toml::from_str(content).map_err(|e| e.to_string())?,
        SourceFormat::Yaml => {
            if content.trim().is_empty() {
                Value::Array(Vec::new())
            } else {
                serde_yaml::from_str(content).map_err(|e| e.to_string())?
            }
        }
    };

    let records = match &document {
        Value::Array(items) => items,
        Value::Object(map) => match map.get("projects") {
            Some(Value::Array(items)) => items,
            // A TOML file with no [[projects]] at all is simply empty
            None => return Ok(Vec::new()),
            Some(_) => return Err("`projects` must be a list of records".to_string()),
        },
        _ => return Err("expected a list of project records".to_string()),
    };

    Ok(records
        .iter()
        .filter_map(|record| match record.get(field)? {
            Value::Null => None,
            Value::String(url) => Some(url.clone()),
            other => Some(other.to_string()),
        })
        .collect())
}

/// Scan free-form text for `field: "value"` occurrences.
///
/// The key may be quoted, so this also works on JSON-like object literals.
/// Every match is returned in textual order.
#[must_use]
pub fn scan_text(content: &str, field: &str) -> Vec<String> {
    let pattern = format!(r#"\b{}["']?\s*:\s*"([^"]+)""#, regex::escape(field));
    // The pattern is built from an escaped literal, so it always compiles
    let Ok(re) = Regex::new(&pattern) else {
        return Vec::new();
    };

    re.captures_iter(content).map(|caps| caps[1].to_string()).collect()
}
