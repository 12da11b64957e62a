//! Build errors for combined store construction.

use thiserror::Error;

/// Errors that can occur when building a combined store set.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BuildError {
    #[error("Store name '{name}' is used more than once (positions {first} and {second})")]
    DuplicateStoreName {
        name: String,
        first: usize,
        second: usize,
    },
}
