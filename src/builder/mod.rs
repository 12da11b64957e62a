//! Builder API for validated store combinations.
//!
//! The free functions in [`core`](crate::core) accept any store list and
//! resolve duplicate names by last-write-wins. The builder lets callers
//! choose to reject duplicates at construction time instead.

pub mod combine;
pub mod error;

pub use combine::{Combined, CombineBuilder, DuplicatePolicy};
pub use error::BuildError;
