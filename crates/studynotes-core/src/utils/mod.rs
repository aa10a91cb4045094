//! Utility functions for string formatting.

pub mod format;

// Re-export commonly used functions at module level
pub use format::{humanize_key, render_summary, truncate_string};
