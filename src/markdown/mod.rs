//! README processing.
//!
//! - [`preview`] - derive a short plain-text preview from a README body

pub mod preview;

pub use preview::{extract_preview, readme_preview};
