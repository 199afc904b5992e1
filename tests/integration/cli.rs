use assert_cmd::Command;
use assert_cmd::assert::{Assert, OutputAssertExt};
use portfolio_sync::test_utils::{DatasetFixture, MockGitHub, MockRepo};
use predicates::prelude::*;
use tempfile::TempDir;

/// `portfolio-sync` in `dir` with a clean, colorless environment.
pub fn portfolio_sync(dir: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("portfolio-sync").unwrap();
    cmd.current_dir(dir)
        .env("NO_COLOR", "1")
        .env("PORTFOLIO_SYNC_NO_PROGRESS", "1")
        .env_remove("GITHUB_TOKEN")
        .env_remove("PORTFOLIO_SYNC_API_URL")
        .env_remove("RUST_LOG");
    cmd
}

/// Run a prepared command off the async runtime so the mock server keeps
/// serving while the binary blocks.
pub async fn run(mut cmd: Command) -> Assert {
    let output = tokio::task::spawn_blocking(move || cmd.output()).await.unwrap().unwrap();
    output.assert()
}

#[tokio::test(flavor = "multi_thread")]
async fn test_sync_against_mock_api() {
    let github = MockGitHub::start().await;
    github
        .mount(
            &MockRepo::new("acme", "widget")
                .readme("# Widget\n\nA tiny widget library.\n")
                .details(Some("Widgets"), &["tools"], 42),
        )
        .await;
    // acme/gone answers 404 everywhere
    github.mount(&MockRepo::new("acme", "gone")).await;

    let temp = TempDir::new().unwrap();
    std::fs::create_dir_all(temp.path().join("src/data")).unwrap();
    let dataset = DatasetFixture::typescript(&[
        Some("https://github.com/acme/widget"),
        Some("https://github.com/acme/gone"),
        Some("https://example.com/nope"),
    ]);
    std::fs::write(temp.path().join("src/data/projects.ts"), &dataset.content).unwrap();

    let mut cmd = portfolio_sync(temp.path());
    cmd.env("PORTFOLIO_SYNC_API_URL", github.uri());

    run(cmd)
        .await
        .success()
        .stdout(predicate::str::contains("Syncing projects from GitHub"))
        .stdout(predicate::str::contains("Found 3 projects with GitHub links"))
        .stdout(predicate::str::contains("Invalid GitHub URL: https://example.com/nope"))
        .stdout(predicate::str::contains("📦 Processing: acme/widget"))
        .stdout(predicate::str::contains("Fetched data successfully"))
        .stdout(predicate::str::contains("No data available"))
        .stdout(predicate::str::contains("Total projects: 3"))
        .stdout(predicate::str::contains("Successfully synced: 1"))
        .stdout(predicate::str::contains("Failed: 2"))
        .stdout(predicate::str::contains("Invalid URLs: 1"))
        .stdout(predicate::str::contains("Metadata saved to .github/sync-metadata.json"));

    let written = std::fs::read_to_string(temp.path().join(".github/sync-metadata.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&written).unwrap();
    assert_eq!(value["projects"][0]["repo"], "acme/widget");
    assert_eq!(value["projects"].as_array().unwrap().len(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_sync_subcommand_with_flags_and_config_file() {
    let github = MockGitHub::start().await;
    github.mount(&MockRepo::new("o", "a").readme("Alpha\n")).await;

    let temp = TempDir::new().unwrap();
    let source = DatasetFixture::json(&[Some("https://github.com/o/a")]).write_to(temp.path()).unwrap();
    std::fs::write(
        temp.path().join("portfolio-sync.toml"),
        format!("[sync]\napi_url = \"{}\"\nmax_retries = 0\n", github.uri()),
    )
    .unwrap();

    let mut cmd = portfolio_sync(temp.path());
    cmd.arg("sync")
        .arg("--source")
        .arg(&source)
        .arg("--output")
        .arg("out/meta.json")
        .arg("--max-parallel")
        .arg("1")
        .arg("--timeout")
        .arg("5");

    run(cmd)
        .await
        .success()
        .stdout(predicate::str::contains("Successfully synced: 1"))
        .stdout(predicate::str::contains("Invalid URLs").not());
    assert!(temp.path().join("out/meta.json").exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_status_lines_stay_on_stdout_with_progress_enabled() {
    let github = MockGitHub::start().await;
    github.mount(&MockRepo::new("o", "a").readme("Alpha\n")).await;

    let temp = TempDir::new().unwrap();
    let source = DatasetFixture::json(&[Some("https://github.com/o/a")]).write_to(temp.path()).unwrap();

    let mut cmd = portfolio_sync(temp.path());
    cmd.env_remove("PORTFOLIO_SYNC_NO_PROGRESS").env("PORTFOLIO_SYNC_API_URL", github.uri()).arg("--source").arg(&source);

    run(cmd)
        .await
        .success()
        .stdout(predicate::str::contains("📦 Processing: o/a"))
        .stdout(predicate::str::contains("Fetched data successfully"))
        .stderr(predicate::str::contains("Processing").not());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_nothing_to_do_exits_zero_without_writing() {
    let temp = TempDir::new().unwrap();
    let source = DatasetFixture::typescript(&[None]).write_to(temp.path()).unwrap();

    let mut cmd = portfolio_sync(temp.path());
    // Unroutable: the run must not need the network
    cmd.env("PORTFOLIO_SYNC_API_URL", "http://127.0.0.1:9").arg("--source").arg(&source);

    run(cmd).await.success().stdout(predicate::str::contains("No GitHub URLs found in"));
    assert!(!temp.path().join(".github").exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unreadable_source_exits_one() {
    let temp = TempDir::new().unwrap();

    let cmd = portfolio_sync(temp.path());
    run(cmd)
        .await
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Cannot read source dataset"))
        .stderr(predicate::str::contains("--source"));
    assert!(!temp.path().join(".github").exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_malformed_structured_source_exits_one() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("projects.json"), "{ \"projects\": [").unwrap();

    let mut cmd = portfolio_sync(temp.path());
    cmd.args(["--source", "projects.json"]);
    run(cmd).await.code(1).stderr(predicate::str::contains("Invalid JSON in source dataset"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unwritable_output_exits_one() {
    let github = MockGitHub::start().await;
    github.mount(&MockRepo::new("o", "a").readme("Alpha\n")).await;

    let temp = TempDir::new().unwrap();
    let source = DatasetFixture::json(&[Some("https://github.com/o/a")]).write_to(temp.path()).unwrap();
    std::fs::write(temp.path().join("blocker"), "").unwrap();

    let mut cmd = portfolio_sync(temp.path());
    cmd.env("PORTFOLIO_SYNC_API_URL", github.uri())
        .arg("--source")
        .arg(&source)
        .args(["--output", "blocker/meta.json"]);

    run(cmd).await.code(1).stderr(predicate::str::contains("Cannot write snapshot"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_invalid_configuration_exits_one() {
    let temp = TempDir::new().unwrap();

    let mut cmd = portfolio_sync(temp.path());
    cmd.args(["sync", "--max-parallel", "0"]);
    run(cmd).await.code(1).stderr(predicate::str::contains("max_parallel must be at least 1"));

    let mut cmd = portfolio_sync(temp.path());
    cmd.args(["--config", "missing.toml"]);
    run(cmd).await.code(1).stderr(predicate::str::contains("missing.toml"));
}
