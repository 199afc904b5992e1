use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use tokio_retry::RetryIf;
use tokio_retry::strategy::ExponentialBackoff;
use tracing::{debug, warn};

use super::error::FetchError;
use super::models::{ApiErrorBody, ReadmeResponse, RepositoryMetadata};
use crate::config::SyncConfig;
use crate::constants::{GITHUB_API_VERSION, MAX_BACKOFF_DELAY, RETRY_BACKOFF_FACTOR_MS};
use crate::core::SyncError;
use crate::source::RepositoryReference;

/// README and metadata fetched for one repository.
///
/// Either half may be absent. When both are, the repository is left out of
/// the snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepositoryData {
    pub readme: Option<String>,
    pub metadata: Option<RepositoryMetadata>,
}

impl RepositoryData {
    /// Whether neither the README nor the metadata could be fetched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.readme.is_none() && self.metadata.is_none()
    }
}

/// Client for the two GitHub endpoints the sync reads.
///
/// Built once per run from [`SyncConfig`] and shared by reference between all
/// concurrent fetches. Authentication, the API version header and the
/// per-request timeout are configured on the underlying `reqwest::Client`.
///
/// # Examples
///
/// ```rust,no_run
/// use portfolio_sync::config::SyncConfig;
/// use portfolio_sync::github::GitHubClient;
/// use portfolio_sync::source::RepositoryReference;
///
/// # async fn example() -> anyhow::Result<()> {
/// let client = GitHubClient::new(&SyncConfig::default())?;
/// let data = client.fetch(&RepositoryReference::new("acme", "widget")).await;
/// println!("has README: {}", data.readme.is_some());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: Client,
    api_url: Url,
    max_retries: usize,
}

impl GitHubClient {
    /// Build a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Config`] for an unusable API URL or token, and
    /// [`SyncError::HttpClient`] if the HTTP client cannot be built.
    pub fn new(config: &SyncConfig) -> Result<Self, SyncError> {
        let api_url = Url::parse(&config.api_url).map_err(|e| SyncError::Config {
            message: format!("invalid API URL '{}': {e}", config.api_url),
        })?;
        if api_url.cannot_be_a_base() {
            return Err(SyncError::Config {
                message: format!("API URL '{}' cannot have path segments", config.api_url),
            });
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert("X-GitHub-Api-Version", HeaderValue::from_static(GITHUB_API_VERSION));
        if let Some(token) = &config.token {
            let mut value =
                HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| SyncError::Config {
                    message: "GITHUB_TOKEN contains characters not allowed in an HTTP header".to_string(),
                })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        } else {
            debug!("No API token configured, using unauthenticated rate limits");
        }

        let http = Client::builder()
            .user_agent(concat!("portfolio-sync/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .timeout(config.timeout())
            .build()
            .map_err(|e| SyncError::HttpClient {
                reason: e.to_string(),
            })?;

        Ok(Self {
            http,
            api_url,
            max_retries: config.max_retries,
        })
    }

    /// Fetch README and metadata for `reference` concurrently.
    ///
    /// Never fails: each half is `None` when its request failed, and the
    /// failure has already been logged.
    pub async fn fetch(&self, reference: &RepositoryReference) -> RepositoryData {
        let (readme, metadata) =
            tokio::join!(self.fetch_readme(reference), self.fetch_repository(reference));
        RepositoryData {
            readme,
            metadata,
        }
    }

    /// Fetch and decode the default README, logging a warning on failure.
    pub async fn fetch_readme(&self, reference: &RepositoryReference) -> Option<String> {
        match self.try_fetch_readme(reference).await {
            Ok(readme) => Some(readme),
            Err(e) => {
                warn!("Could not fetch README for {}: {}", reference, e);
                None
            }
        }
    }

    /// Fetch repository metadata, logging a warning on failure.
    pub async fn fetch_repository(&self, reference: &RepositoryReference) -> Option<RepositoryMetadata> {
        match self.try_fetch_repository(reference).await {
            Ok(metadata) => Some(metadata),
            Err(e) => {
                warn!("Could not fetch details for {}: {}", reference, e);
                None
            }
        }
    }

    /// `GET /repos/{owner}/{repo}/readme`, decoded to text.
    ///
    /// # Errors
    ///
    /// Any [`FetchError`], including [`FetchError::NotFound`] when the
    /// repository has no README.
    pub async fn try_fetch_readme(&self, reference: &RepositoryReference) -> Result<String, FetchError> {
        let url = self.endpoint(&["repos", &reference.owner, &reference.name, "readme"])?;
        let response: ReadmeResponse = self.get_json(url).await?;
        response.decode()
    }

    /// `GET /repos/{owner}/{repo}`.
    ///
    /// # Errors
    ///
    /// Any [`FetchError`].
    pub async fn try_fetch_repository(
        &self,
        reference: &RepositoryReference,
    ) -> Result<RepositoryMetadata, FetchError> {
        let url = self.endpoint(&["repos", &reference.owner, &reference.name])?;
        self.get_json(url).await
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, FetchError> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|()| FetchError::InvalidUrl {
                reason: format!("{} cannot be a base URL", self.api_url),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// GET with retries for transient failures only.
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, FetchError> {
        let strategy = ExponentialBackoff::from_millis(2)
            .factor(RETRY_BACKOFF_FACTOR_MS)
            .max_delay(MAX_BACKOFF_DELAY)
            .take(self.max_retries);

        RetryIf::spawn(
            strategy,
            || self.get_once(url.clone()),
            |e: &FetchError| {
                let retry = e.is_transient();
                if retry {
                    debug!("Retrying {} after transient error: {}", url, e);
                }
                retry
            },
        )
        .await
    }

    async fn get_once<T: DeserializeOwned>(&self, url: Url) -> Result<T, FetchError> {
        debug!("GET {}", url);
        let response = self.http.get(url).send().await.map_err(|e| FetchError::from_reqwest(&e))?;
        let status = response.status();

        if status.is_success() {
            return response.json::<T>().await.map_err(|e| FetchError::Decode {
                reason: e.to_string(),
            });
        }

        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound);
        }

        let header = |name: &str| {
            response.headers().get(name).and_then(|v| v.to_str().ok()).map(str::to_string)
        };
        let exhausted = header("x-ratelimit-remaining").as_deref() == Some("0");
        if status == StatusCode::TOO_MANY_REQUESTS || (status == StatusCode::FORBIDDEN && exhausted) {
            return Err(FetchError::RateLimited {
                reset: header("x-ratelimit-reset").and_then(|v| v.parse().ok()),
            });
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorBody>(&body)
            .map(|b| b.message)
            .unwrap_or_else(|_| status.canonical_reason().unwrap_or("unexpected status").to_string());

        Err(FetchError::Status {
            status: status.as_u16(),
            message,
        })
    }
}
