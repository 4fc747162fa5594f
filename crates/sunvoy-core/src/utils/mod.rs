//! Utility functions for string handling.

pub mod format;

pub use format::{collapse_whitespace, strip_label, truncate};
