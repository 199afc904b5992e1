use std::time::Duration;

use portfolio_sync::config::SyncConfig;
use portfolio_sync::github::GitHubClient;
use portfolio_sync::snapshot::SyncSnapshot;
use portfolio_sync::sync::{self, SyncOutcome, SyncSummary};
use portfolio_sync::test_utils::github_mock::Reply;
use portfolio_sync::test_utils::{DatasetFixture, MockGitHub, MockRepo, init_test_logging};
use serde_json::{Value, json};
use tempfile::TempDir;

const WIDGET_README: &str = "# Widget\n\nA tiny widget library.\n\n## Install\n\ncargo add widget\n";

/// Write `dataset`, point a config at it and the mock, and run a sync.
async fn run_sync(github: &MockGitHub, temp: &TempDir, dataset: &DatasetFixture) -> (SyncConfig, SyncOutcome) {
    init_test_logging(None);
    let source = dataset.write_to(temp.path()).unwrap();
    let config = SyncConfig {
        source,
        output: temp.path().join(".github").join("sync-metadata.json"),
        ..github.config()
    };
    let client = GitHubClient::new(&config).unwrap();
    let outcome = sync::run(&config, &client, true).await.unwrap();
    (config, outcome)
}

fn summary(outcome: &SyncOutcome) -> SyncSummary {
    match outcome {
        SyncOutcome::Completed { summary, .. } => *summary,
        SyncOutcome::NothingToDo => panic!("expected a completed sync"),
    }
}

fn read_json(config: &SyncConfig) -> Value {
    serde_json::from_str(&std::fs::read_to_string(&config.output).unwrap()).unwrap()
}

#[tokio::test]
async fn test_single_repository_end_to_end() {
    let github = MockGitHub::start().await;
    github
        .mount(&MockRepo::new("acme", "widget").readme(WIDGET_README).details(Some("Widgets"), &["tools"], 42))
        .await;
    let temp = TempDir::new().unwrap();

    let dataset = DatasetFixture::typescript(&[Some("https://github.com/acme/widget")]);
    let (config, outcome) = run_sync(&github, &temp, &dataset).await;

    assert_eq!(
        summary(&outcome),
        SyncSummary {
            found: 1,
            succeeded: 1,
            failed: 0,
            invalid: 0
        }
    );

    let written = read_json(&config);
    assert_eq!(
        written["projects"],
        json!([{
            "repo": "acme/widget",
            "description": "Widgets",
            "topics": ["tools"],
            "stars": 42,
            "readmePreview": "A tiny widget library."
        }])
    );
    let last_sync = written["lastSync"].as_str().unwrap();
    assert!(last_sync.ends_with('Z'));
    assert!(chrono::DateTime::parse_from_rfc3339(last_sync).is_ok());
}

#[tokio::test]
async fn test_total_failure_is_excluded_and_counted() {
    let github = MockGitHub::start().await;
    github.mount(&MockRepo::new("o", "a").readme("Alpha\n").details(Some("A"), &[], 1)).await;
    // o/b answers 404 on both endpoints
    github.mount(&MockRepo::new("o", "b")).await;
    let temp = TempDir::new().unwrap();

    let dataset = DatasetFixture::json(&[Some("https://github.com/o/a"), Some("https://github.com/o/b")]);
    let (config, outcome) = run_sync(&github, &temp, &dataset).await;

    let s = summary(&outcome);
    assert_eq!((s.found, s.succeeded, s.failed), (2, 1, 1));

    let written = read_json(&config);
    let repos: Vec<&str> = written["projects"].as_array().unwrap().iter().map(|p| p["repo"].as_str().unwrap()).collect();
    assert_eq!(repos, vec!["o/a"]);
}

#[tokio::test]
async fn test_failed_readme_and_failed_repository_together() {
    let github = MockGitHub::start().await;
    github
        .mount(&MockRepo::new("o", "a").readme_reply(Reply::Status(500)).details(Some("Alpha"), &["rust"], 3))
        .await;
    github.mount(&MockRepo::new("o", "b")).await;
    let temp = TempDir::new().unwrap();

    let dataset = DatasetFixture::typescript(&[Some("https://github.com/o/a"), Some("https://github.com/o/b")]);
    let (config, outcome) = run_sync(&github, &temp, &dataset).await;

    assert_eq!(
        summary(&outcome),
        SyncSummary {
            found: 2,
            succeeded: 1,
            failed: 1,
            invalid: 0
        }
    );
    assert_eq!(
        read_json(&config)["projects"],
        json!([{
            "repo": "o/a",
            "description": "Alpha",
            "topics": ["rust"],
            "stars": 3,
            "readmePreview": null
        }])
    );
}

#[tokio::test]
async fn test_partial_data_is_kept_with_defaults() {
    let github = MockGitHub::start().await;
    github.mount(&MockRepo::new("o", "readme-only").readme("Just text\n")).await;
    github.mount(&MockRepo::new("o", "meta-only").details(Some(""), &["x"], 7)).await;
    let temp = TempDir::new().unwrap();

    let dataset = DatasetFixture::yaml(&[
        Some("https://github.com/o/readme-only"),
        Some("https://github.com/o/meta-only"),
    ]);
    let (config, _) = run_sync(&github, &temp, &dataset).await;

    let written = read_json(&config);
    assert_eq!(
        written["projects"],
        json!([
            {
                "repo": "o/readme-only",
                "description": null,
                "topics": [],
                "stars": 0,
                "readmePreview": "Just text"
            },
            {
                "repo": "o/meta-only",
                "description": null,
                "topics": ["x"],
                "stars": 7,
                "readmePreview": null
            }
        ])
    );
}

#[tokio::test]
async fn test_discovery_order_survives_completion_order() {
    let github = MockGitHub::start().await;
    let names = ["first", "second", "third", "fourth"];
    for (i, name) in names.iter().enumerate() {
        // Earlier repositories answer later
        let delay = Duration::from_millis(50 * (names.len() - i) as u64);
        github.mount(&MockRepo::new("o", name).readme(name).delayed(delay)).await;
    }
    let temp = TempDir::new().unwrap();

    let urls: Vec<String> = names.iter().map(|n| format!("https://github.com/o/{n}")).collect();
    let refs: Vec<Option<&str>> = urls.iter().map(|u| Some(u.as_str())).collect();
    let (config, _) = run_sync(&github, &temp, &DatasetFixture::typescript(&refs)).await;

    let snapshot = SyncSnapshot::load(&config.output).unwrap().unwrap();
    let repos: Vec<&str> = snapshot.projects.iter().map(|p| p.repo.as_str()).collect();
    assert_eq!(repos, vec!["o/first", "o/second", "o/third", "o/fourth"]);
}

#[tokio::test]
async fn test_duplicates_and_invalid_references() {
    let github = MockGitHub::start().await;
    github.mount(&MockRepo::new("o", "a").readme("Alpha\n")).await;
    let temp = TempDir::new().unwrap();

    let dataset = DatasetFixture::typescript(&[
        Some("https://github.com/o/a"),
        Some("https://gitlab.com/o/a"),
        Some("https://github.com/o/a.git"),
        None,
    ]);
    let (config, outcome) = run_sync(&github, &temp, &dataset).await;

    assert_eq!(
        summary(&outcome),
        SyncSummary {
            found: 3,
            succeeded: 2,
            failed: 1,
            invalid: 1
        }
    );
    let snapshot = SyncSnapshot::load(&config.output).unwrap().unwrap();
    assert_eq!(snapshot.projects.len(), 2);
    assert!(snapshot.projects.iter().all(|p| p.repo == "o/a"));
}

#[tokio::test]
async fn test_all_invalid_still_writes_empty_snapshot() {
    let github = MockGitHub::start().await;
    let temp = TempDir::new().unwrap();

    let dataset = DatasetFixture::json(&[Some("not a url")]);
    let (config, outcome) = run_sync(&github, &temp, &dataset).await;

    let s = summary(&outcome);
    assert_eq!((s.found, s.succeeded, s.failed), (1, 0, 1));
    assert_eq!(read_json(&config)["projects"], json!([]));
    assert_eq!(github.request_count().await, 0);
}

#[tokio::test]
async fn test_nothing_to_do_makes_no_requests() {
    let github = MockGitHub::start().await;
    let temp = TempDir::new().unwrap();

    let dataset = DatasetFixture::typescript(&[None, None]);
    let (config, outcome) = run_sync(&github, &temp, &dataset).await;

    assert_eq!(outcome, SyncOutcome::NothingToDo);
    assert!(!config.output.exists());
    assert_eq!(github.request_count().await, 0);
}

#[tokio::test]
async fn test_snapshot_is_replaced_wholesale() {
    let github = MockGitHub::start().await;
    github.mount(&MockRepo::new("o", "new").readme("Fresh\n")).await;
    let temp = TempDir::new().unwrap();

    let output = temp.path().join(".github").join("sync-metadata.json");
    std::fs::create_dir_all(output.parent().unwrap()).unwrap();
    std::fs::write(
        &output,
        r#"{"lastSync":"2020-01-01T00:00:00.000Z","projects":[{"repo":"o/old","description":null,"topics":[],"stars":0,"readmePreview":"x"}]}"#,
    )
    .unwrap();

    let (config, _) = run_sync(&github, &temp, &DatasetFixture::typescript(&[Some("https://github.com/o/new")])).await;

    let snapshot = SyncSnapshot::load(&config.output).unwrap().unwrap();
    assert_eq!(snapshot.projects.len(), 1);
    assert_eq!(snapshot.projects[0].repo, "o/new");
    assert!(snapshot.last_sync_string() > "2020-01-01T00:00:00.000Z".to_string());
}
