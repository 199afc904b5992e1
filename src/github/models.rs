//! GitHub REST API response models.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::FetchError;

/// Repository attributes used in the snapshot.
///
/// Deserialized from `GET /repos/{owner}/{repo}`. Only the fields the sync
/// needs are read, the rest of the payload is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryMetadata {
    pub description: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(rename = "stargazers_count", default)]
    pub star_count: u64,
    pub updated_at: DateTime<Utc>,
}

/// Body of `GET /repos/{owner}/{repo}/readme`.
#[derive(Debug, Clone, Deserialize)]
pub struct ReadmeResponse {
    pub content: String,
    #[serde(default = "default_encoding")]
    pub encoding: String,
}

fn default_encoding() -> String {
    "base64".to_string()
}

impl ReadmeResponse {
    /// Decode the README body into text.
    ///
    /// GitHub wraps base64 content at 60 columns, so whitespace is removed
    /// before decoding. Invalid UTF-8 sequences are replaced rather than
    /// rejected.
    ///
    /// # Errors
    ///
    /// [`FetchError::UnsupportedEncoding`] for anything but base64, and
    /// [`FetchError::Decode`] for malformed base64.
    pub fn decode(&self) -> Result<String, FetchError> {
        if !self.encoding.eq_ignore_ascii_case("base64") {
            return Err(FetchError::UnsupportedEncoding {
                encoding: self.encoding.clone(),
            });
        }

        let compact: String = self.content.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        let bytes = STANDARD.decode(compact).map_err(|e| FetchError::Decode {
            reason: format!("README is not valid base64: {e}"),
        })?;

        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Error body GitHub returns with non-2xx responses.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub message: String,
}
