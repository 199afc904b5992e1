//! Progress output for the fetch phase.
//!
//! A thin wrapper over `indicatif` that keeps per-repository status lines
//! readable whether or not a bar is being drawn. When progress is disabled
//! (`--no-progress` or `PORTFOLIO_SYNC_NO_PROGRESS`) the bar is hidden.
//! Status lines always go to stdout; only the bar itself is drawn on stderr.

use indicatif::{ProgressBar as IndicatifBar, ProgressStyle};
use std::io::Write;

use crate::constants::NO_PROGRESS_ENV;

/// Whether the environment asks for progress bars to be disabled.
#[must_use]
pub fn is_progress_disabled() -> bool {
    std::env::var_os(NO_PROGRESS_ENV).is_some()
}

/// Progress bar that degrades to plain line output.
#[derive(Clone)]
pub struct ProgressBar {
    inner: IndicatifBar,
}

impl ProgressBar {
    /// Create a bar of `len` steps, hidden when `disabled` is true.
    pub fn new(len: u64, disabled: bool) -> Self {
        let bar = if disabled {
            IndicatifBar::hidden()
        } else {
            let bar = IndicatifBar::new(len);
            bar.set_style(default_style());
            bar
        };
        Self {
            inner: bar,
        }
    }

    pub fn set_message(&self, msg: impl Into<String>) {
        self.inner.set_message(msg.into());
    }

    pub fn inc(&self, delta: u64) {
        self.inner.inc(delta);
    }

    /// Print a line to stdout, clearing the bar around it.
    pub fn println(&self, line: impl AsRef<str>) {
        let _ = self.write_line(&mut std::io::stdout().lock(), line.as_ref());
    }

    /// Write `line` to `out` while the bar is suspended.
    ///
    /// `indicatif`'s own `println` targets the bar's stderr draw target, which
    /// would split status lines between the two streams.
    pub fn write_line<W: Write>(&self, out: &mut W, line: &str) -> std::io::Result<()> {
        self.inner.suspend(|| writeln!(out, "{line}"))
    }

    pub fn finish_and_clear(&self) {
        self.inner.finish_and_clear();
    }
}

fn default_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{prefix:.bold} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("━╸━")
}
