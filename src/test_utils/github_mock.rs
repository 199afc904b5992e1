//! Mock GitHub REST API built on `wiremock`.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Value, json};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::config::SyncConfig;

/// How one endpoint of a mocked repository answers.
#[derive(Clone, Debug)]
pub enum Reply {
    /// 200 with the given JSON body
    Json(Value),
    /// Bare status code with a GitHub-style error body
    Status(u16),
    /// 403 with `x-ratelimit-remaining: 0`
    RateLimited,
}

/// Responses for both endpoints of one repository.
#[derive(Clone, Debug)]
pub struct MockRepo {
    pub owner: String,
    pub name: String,
    pub readme: Reply,
    pub details: Reply,
    pub delay: Option<Duration>,
}

impl MockRepo {
    /// A repository whose endpoints both answer 404 until configured.
    pub fn new(owner: &str, name: &str) -> Self {
        Self {
            owner: owner.to_string(),
            name: name.to_string(),
            readme: Reply::Status(404),
            details: Reply::Status(404),
            delay: None,
        }
    }

    /// Serve `text` as the base64-encoded README.
    #[must_use]
    pub fn readme(mut self, text: &str) -> Self {
        self.readme = Reply::Json(readme_body(text));
        self
    }

    /// Serve repository metadata.
    #[must_use]
    pub fn details(mut self, description: Option<&str>, topics: &[&str], stars: u64) -> Self {
        self.details = Reply::Json(repository_body(description, topics, stars));
        self
    }

    #[must_use]
    pub fn readme_reply(mut self, reply: Reply) -> Self {
        self.readme = reply;
        self
    }

    #[must_use]
    pub fn details_reply(mut self, reply: Reply) -> Self {
        self.details = reply;
        self
    }

    /// Delay both responses, to shuffle completion order.
    #[must_use]
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

/// A running mock API server.
pub struct MockGitHub {
    pub server: MockServer,
}

impl MockGitHub {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Base URL to use as the API URL.
    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// A [`SyncConfig`] pointing at this server with fast failure settings.
    pub fn config(&self) -> SyncConfig {
        SyncConfig {
            api_url: self.uri(),
            timeout_secs: 5,
            max_retries: 1,
            ..SyncConfig::default()
        }
    }

    /// Register both endpoints for `repo`.
    pub async fn mount(&self, repo: &MockRepo) {
        let base = format!("/repos/{}/{}", repo.owner, repo.name);
        self.mount_reply(&format!("{base}/readme"), &repo.readme, repo.delay).await;
        self.mount_reply(&base, &repo.details, repo.delay).await;
    }

    async fn mount_reply(&self, endpoint: &str, reply: &Reply, delay: Option<Duration>) {
        let mut template = match reply {
            Reply::Json(body) => ResponseTemplate::new(200).set_body_json(body),
            Reply::Status(status) => ResponseTemplate::new(*status).set_body_json(json!({
                "message": status_message(*status),
                "documentation_url": "https://docs.github.com/rest",
            })),
            Reply::RateLimited => ResponseTemplate::new(403)
                .insert_header("x-ratelimit-remaining", "0")
                .insert_header("x-ratelimit-reset", "1700000000")
                .set_body_json(json!({ "message": "API rate limit exceeded" })),
        };
        if let Some(delay) = delay {
            template = template.set_delay(delay);
        }

        Mock::given(method("GET")).and(path(endpoint)).respond_with(template).mount(&self.server).await;
    }

    /// Number of requests the server has seen.
    pub async fn request_count(&self) -> usize {
        self.server.received_requests().await.map_or(0, |r| r.len())
    }
}

/// Body of `GET /repos/{owner}/{repo}/readme` for `text`, wrapped at 60
/// columns like GitHub does.
pub fn readme_body(text: &str) -> Value {
    let encoded = STANDARD.encode(text);
    let wrapped: Vec<String> = encoded
        .as_bytes()
        .chunks(60)
        .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
        .collect();

    json!({
        "type": "file",
        "encoding": "base64",
        "name": "README.md",
        "path": "README.md",
        "content": format!("{}\n", wrapped.join("\n")),
    })
}

/// Body of `GET /repos/{owner}/{repo}`.
pub fn repository_body(description: Option<&str>, topics: &[&str], stars: u64) -> Value {
    json!({
        "id": 1,
        "full_name": "mock/repository",
        "description": description,
        "topics": topics,
        "stargazers_count": stars,
        "updated_at": "2024-01-01T00:00:00Z",
    })
}

fn status_message(status: u16) -> &'static str {
    match status {
        401 => "Bad credentials",
        404 => "Not Found",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        _ => "Error",
    }
}
