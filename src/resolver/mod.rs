//! Binary resolution.
//!
//! Finds the real executable behind a wrapped command name. Every executable
//! with that name on the search path is considered in order, and the first
//! one whose canonical path differs from the running wrapper is selected.

pub mod binary;
pub mod search_path;

pub use binary::{canonicalize_or, BinaryResolver, SelfIdentity};
pub use search_path::{is_executable, SearchPath};
