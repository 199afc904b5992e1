//! Dataset fixtures.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// A project dataset in one of the supported formats.
#[derive(Clone, Debug)]
pub struct DatasetFixture {
    pub file_name: String,
    pub content: String,
}

impl DatasetFixture {
    /// A TypeScript module in the style the portfolio site imports, with one
    /// project per URL. Projects for `None` entries have no `github` field.
    pub fn typescript(urls: &[Option<&str>]) -> Self {
        let mut content = String::from(
            "import type { Project } from './types';\n\nexport const projects: Project[] = [\n",
        );
        for (i, url) in urls.iter().enumerate() {
            content.push_str("  {\n");
            content.push_str(&format!("    id: \"project-{i}\",\n"));
            content.push_str(&format!("    title: \"Project {i}\",\n"));
            if let Some(url) = url {
                content.push_str(&format!("    github: \"{url}\",\n"));
            }
            content.push_str("    tags: [\"demo\"],\n");
            content.push_str("  },\n");
        }
        content.push_str("];\n");

        Self {
            file_name: "projects.ts".to_string(),
            content,
        }
    }

    /// A JSON dataset of the form `{ "projects": [...] }`.
    pub fn json(urls: &[Option<&str>]) -> Self {
        let projects: Vec<serde_json::Value> = urls
            .iter()
            .enumerate()
            .map(|(i, url)| match url {
                Some(url) => serde_json::json!({ "id": format!("project-{i}"), "github": url }),
                None => serde_json::json!({ "id": format!("project-{i}") }),
            })
            .collect();

        Self {
            file_name: "projects.json".to_string(),
            content: serde_json::to_string_pretty(&serde_json::json!({ "projects": projects }))
                .unwrap_or_default(),
        }
    }

    /// A YAML dataset with a top-level sequence.
    pub fn yaml(urls: &[Option<&str>]) -> Self {
        let mut content = String::new();
        for (i, url) in urls.iter().enumerate() {
            content.push_str(&format!("- id: project-{i}\n"));
            if let Some(url) = url {
                content.push_str(&format!("  github: \"{url}\"\n"));
            }
        }

        Self {
            file_name: "projects.yaml".to_string(),
            content,
        }
    }

    /// Write the dataset into `dir` and return its path.
    pub fn write_to(&self, dir: &Path) -> io::Result<PathBuf> {
        let path = dir.join(&self.file_name);
        fs::write(&path, &self.content)?;
        Ok(path)
    }
}
