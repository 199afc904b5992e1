//! Filesystem and terminal helpers.
//!
//! - [`fs`] - atomic writes and contextual file reads
//! - [`progress`] - progress bar that falls back to plain lines

pub mod fs;
pub mod progress;

pub use fs::{atomic_write, ensure_dir, read_text_file, write_json_file};
pub use progress::ProgressBar;
