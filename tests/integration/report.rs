use predicates::prelude::*;
use tempfile::TempDir;

use super::cli::{portfolio_sync, run};

const SNAPSHOT: &str = r#"{
  "lastSync": "2024-05-01T12:00:00.000Z",
  "projects": [
    {
      "repo": "acme/widget",
      "description": "A tiny widget library.",
      "topics": [],
      "stars": 42,
      "readmePreview": "A tiny widget library."
    },
    {
      "repo": "acme/retired",
      "description": "Old",
      "topics": ["legacy", "cli"],
      "stars": 1,
      "readmePreview": "Something else"
    }
  ]
}
"#;

fn workspace() -> TempDir {
    let temp = TempDir::new().unwrap();
    std::fs::create_dir_all(temp.path().join(".github")).unwrap();
    std::fs::write(temp.path().join(".github/sync-metadata.json"), SNAPSHOT).unwrap();
    std::fs::create_dir_all(temp.path().join("src/data")).unwrap();
    std::fs::write(
        temp.path().join("src/data/projects.ts"),
        "export const projects = [\n  { github: \"https://github.com/acme/widget\" },\n  { github: \"https://github.com/acme/new\" },\n];\n",
    )
    .unwrap();
    temp
}

#[tokio::test(flavor = "multi_thread")]
async fn test_report_without_snapshot_gives_guidance() {
    let temp = TempDir::new().unwrap();

    let mut cmd = portfolio_sync(temp.path());
    cmd.arg("report");
    run(cmd).await.success().stdout(predicate::str::contains("re-run sync first"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_report_text() {
    let temp = workspace();

    let mut cmd = portfolio_sync(temp.path());
    cmd.arg("report");
    run(cmd)
        .await
        .success()
        .stdout(predicate::str::contains("Checking project descriptions"))
        .stdout(predicate::str::contains("Projects synced: 2"))
        .stdout(predicate::str::contains("📦 acme/widget"))
        .stdout(predicate::str::contains("Stars: 42"))
        .stdout(predicate::str::contains("Topics: none"))
        .stdout(predicate::str::contains("Topics: legacy, cli"))
        .stdout(predicate::str::contains("Description and README preview are identical"))
        .stdout(predicate::str::contains("Has distinct description and README content"))
        .stdout(predicate::str::contains("   - acme/new"))
        .stdout(predicate::str::contains("   - acme/retired"))
        .stdout(predicate::str::contains("Recommendations"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_report_json() {
    let temp = workspace();

    let mut cmd = portfolio_sync(temp.path());
    cmd.args(["report", "--format", "json"]);
    let assert = run(cmd).await.success();

    let value: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(value["lastSync"], "2024-05-01T12:00:00.000Z");
    assert_eq!(value["projectCount"], 2);
    assert_eq!(value["projects"][0]["duplicateDescription"], true);
    assert_eq!(value["projects"][1]["duplicateDescription"], false);
    assert_eq!(value["missingFromSnapshot"], serde_json::json!(["acme/new"]));
    assert_eq!(value["staleInSnapshot"], serde_json::json!(["acme/retired"]));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_report_without_dataset_still_succeeds() {
    let temp = workspace();
    std::fs::remove_file(temp.path().join("src/data/projects.ts")).unwrap();

    let mut cmd = portfolio_sync(temp.path());
    cmd.arg("report");
    run(cmd)
        .await
        .success()
        .stdout(predicate::str::contains("Projects synced: 2"))
        .stdout(predicate::str::contains("Dataset unavailable"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_report_corrupt_snapshot_exits_one() {
    let temp = TempDir::new().unwrap();
    std::fs::create_dir_all(temp.path().join(".github")).unwrap();
    std::fs::write(temp.path().join(".github/sync-metadata.json"), "[]").unwrap();

    let mut cmd = portfolio_sync(temp.path());
    cmd.arg("report");
    run(cmd).await.code(1).stderr(predicate::str::contains("Cannot read snapshot"));
}
