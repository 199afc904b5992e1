//! Advisory report over the last snapshot.
//!
//! The report never touches the network. It reads the snapshot written by the
//! last sync and, when possible, the dataset, and points out:
//!
//! - records whose description is identical to their README preview
//! - dataset references that are not in the snapshot (failed or never synced)
//! - snapshot records whose reference has since left the dataset
//!
//! It is purely informational. A missing snapshot or dataset produces
//! guidance, not a failure.

use chrono::Local;
use colored::Colorize;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt::Write as _;

use crate::snapshot::{SyncRecord, SyncSnapshot};
use crate::source::RepositoryReference;

/// Advice for a single snapshot record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectAdvice {
    pub repo: String,
    pub description: Option<String>,
    pub readme_preview: Option<String>,
    pub stars: u64,
    pub topics: Vec<String>,
    /// Description and README preview carry the same text
    pub duplicate_description: bool,
}

impl From<&SyncRecord> for ProjectAdvice {
    fn from(record: &SyncRecord) -> Self {
        let duplicate_description = match (&record.description, &record.readme_preview) {
            (Some(description), Some(preview)) => description.trim() == preview.trim(),
            _ => false,
        };

        Self {
            repo: record.repo.clone(),
            description: record.description.clone(),
            readme_preview: record.readme_preview.clone(),
            stars: record.stars,
            topics: record.topics.clone(),
            duplicate_description,
        }
    }
}

/// Everything the report shows, in the shape `--format json` emits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub last_sync: String,
    pub project_count: usize,
    pub projects: Vec<ProjectAdvice>,
    /// `None` when the dataset could not be read
    pub missing_from_snapshot: Option<Vec<String>>,
    /// `None` when the dataset could not be read
    pub stale_in_snapshot: Option<Vec<String>>,
    pub recommendations: Vec<String>,
}

impl Report {
    /// Build a report from a snapshot and, optionally, the dataset's valid
    /// references in discovery order.
    #[must_use]
    pub fn build(snapshot: &SyncSnapshot, dataset: Option<&[RepositoryReference]>) -> Self {
        let projects: Vec<ProjectAdvice> = snapshot.projects.iter().map(ProjectAdvice::from).collect();

        let (missing, stale) = match dataset {
            Some(references) => {
                let (missing, stale) = compare(snapshot, references);
                (Some(missing), Some(stale))
            }
            None => (None, None),
        };

        let recommendations = recommendations(&projects, missing.as_deref(), stale.as_deref());

        Self {
            last_sync: snapshot.last_sync_string(),
            project_count: snapshot.projects.len(),
            projects,
            missing_from_snapshot: missing,
            stale_in_snapshot: stale,
            recommendations,
        }
    }

    /// Render the human-readable report.
    #[must_use]
    pub fn render_text(&self, snapshot: &SyncSnapshot) -> String {
        let mut out = String::new();
        let local = snapshot.last_sync.with_timezone(&Local);

        let _ = writeln!(out, "Last sync: {}", local.format("%Y-%m-%d %H:%M:%S %Z"));
        let _ = writeln!(out, "Projects synced: {}", self.project_count);

        for project in &self.projects {
            let _ = writeln!(out, "\n📦 {}", project.repo.bold());
            let _ = writeln!(out, "   Description: {}", or_none(project.description.as_deref()));
            let _ = writeln!(out, "   README Preview: {}", or_none(project.readme_preview.as_deref()));
            let _ = writeln!(out, "   Stars: {}", project.stars);
            let topics = if project.topics.is_empty() {
                "none".to_string()
            } else {
                project.topics.join(", ")
            };
            let _ = writeln!(out, "   Topics: {topics}");

            if project.duplicate_description {
                let _ = writeln!(out, "   {}", "⚠️  Description and README preview are identical".yellow());
                let _ = writeln!(out, "   💡 Consider fetching the full README for more detail");
            } else {
                let _ = writeln!(out, "   {}", "✅ Has distinct description and README content".green());
            }
        }

        match (&self.missing_from_snapshot, &self.stale_in_snapshot) {
            (Some(missing), Some(stale)) => {
                if !missing.is_empty() {
                    let _ = writeln!(out, "\n{}", "🔍 In the dataset but not in the snapshot:".bold());
                    for repo in missing {
                        let _ = writeln!(out, "   - {repo}");
                    }
                }
                if !stale.is_empty() {
                    let _ = writeln!(out, "\n{}", "🗑️  In the snapshot but no longer in the dataset:".bold());
                    for repo in stale {
                        let _ = writeln!(out, "   - {repo}");
                    }
                }
            }
            _ => {
                let _ = writeln!(out, "\n{}", "⚠️  Dataset unavailable, skipped the coverage check".yellow());
            }
        }

        let _ = writeln!(out, "\n\n{}", "📝 Recommendations:".bold());
        for (i, item) in self.recommendations.iter().enumerate() {
            let _ = writeln!(out, "{}. {item}", i + 1);
        }

        let _ = writeln!(out, "\n✨ To update a specific project:");
        let _ = writeln!(out, "   1. Check the README at https://github.com/<owner>/<repo>");
        let _ = writeln!(out, "   2. Copy key features and capabilities");
        let _ = writeln!(out, "   3. Update the project's long description in the dataset");
        let _ = writeln!(out, "   4. Align its tags with the README topics and technologies");

        out
    }
}

/// Guidance shown when there is no snapshot to report on.
#[must_use]
pub fn missing_snapshot_guidance(path: &std::path::Path) -> String {
    format!(
        "No sync snapshot at {}.\n\n💡 Nothing to report yet: re-run sync first (`portfolio-sync sync`) to generate it.",
        path.display()
    )
}

fn or_none(value: Option<&str>) -> &str {
    value.unwrap_or("(none)")
}

/// Split references into (in dataset but not snapshot, in snapshot but not
/// dataset). Both lists keep first-seen order and contain no duplicates.
fn compare(snapshot: &SyncSnapshot, dataset: &[RepositoryReference]) -> (Vec<String>, Vec<String>) {
    let synced: HashSet<&str> = snapshot.projects.iter().map(|r| r.repo.as_str()).collect();

    let mut seen = HashSet::new();
    let dataset_keys: Vec<String> = dataset
        .iter()
        .map(RepositoryReference::key)
        .filter(|key| seen.insert(key.clone()))
        .collect();

    let missing = dataset_keys.iter().filter(|key| !synced.contains(key.as_str())).cloned().collect();

    let in_dataset: HashSet<&str> = dataset_keys.iter().map(String::as_str).collect();
    let stale = snapshot
        .projects
        .iter()
        .map(|r| r.repo.clone())
        .filter(|repo| !in_dataset.contains(repo.as_str()))
        .collect();

    (missing, stale)
}

fn recommendations(
    projects: &[ProjectAdvice],
    missing: Option<&[String]>,
    stale: Option<&[String]>,
) -> Vec<String> {
    let mut items = vec!["Run `portfolio-sync` to fetch the latest README content".to_string()];

    if missing.is_some_and(|m| !m.is_empty()) {
        items.push(
            "Check the repositories missing from the snapshot: their URLs may be wrong or private"
                .to_string(),
        );
    }
    if stale.is_some_and(|s| !s.is_empty()) {
        items.push("Re-run the sync to drop repositories that left the dataset".to_string());
    }

    let duplicates = projects.iter().filter(|p| p.duplicate_description).count();
    if duplicates > 0 {
        items.push(format!(
            "Write distinct descriptions for {duplicates} project(s) that repeat their README"
        ));
    }

    items.push("Review the snapshot and update the dataset with comprehensive descriptions".to_string());
    items.push("Add tags based on README topics".to_string());
    items
}
