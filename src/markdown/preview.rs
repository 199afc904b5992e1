//! README preview extraction.
//!
//! A preview is the first paragraph of body text in a README, flattened to a
//! single line and capped at [`MAX_PREVIEW_CHARS`] characters:
//!
//! 1. Leading lines that are blank or start with `#` are skipped.
//! 2. Trimmed lines are collected from the first other line up to the next
//!    blank line.
//! 3. The collected lines are joined with single spaces and hard-cut to the
//!    character limit.
//!
//! ```
//! use portfolio_sync::markdown::extract_preview;
//!
//! let readme = "# Widget\n\nA tiny\nwidget library.\n\n## Install\n";
//! assert_eq!(extract_preview(readme), "A tiny widget library.");
//! ```

use crate::constants::MAX_PREVIEW_CHARS;

/// Preview for an optional README.
///
/// `None` means the repository has no README (or it could not be fetched) and
/// stays `None`. A README without any body text yields `Some("")`.
#[must_use]
pub fn readme_preview(readme: Option<&str>) -> Option<String> {
    readme.map(extract_preview)
}

/// Extract the first body paragraph of `readme`.
#[must_use]
pub fn extract_preview(readme: &str) -> String {
    let paragraph: Vec<&str> = readme
        .lines()
        .map(trim_line)
        .skip_while(|line| line.is_empty() || line.starts_with('#'))
        .take_while(|line| !line.is_empty())
        .collect();

    let joined = paragraph.join(" ");
    match joined.char_indices().nth(MAX_PREVIEW_CHARS) {
        Some((cut, _)) => joined[..cut].to_string(),
        None => joined,
    }
}

/// Trim whitespace and byte order marks, which editors leave at the start of
/// a file.
fn trim_line(line: &str) -> &str {
    line.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}')
}
