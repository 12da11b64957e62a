//! Core store combination types and logic.
//!
//! This module contains the pure functional core:
//! - Named stores and their `Reduction` results
//! - `StoreData`, the combined state keyed by store name
//! - The initial state builder and the combined reducer
//!
//! All logic in this module is pure (no side effects). Nothing here holds
//! shared mutable state.

mod data;
mod reducer;
mod store;

pub use data::StoreData;
pub use reducer::{combined_reducer, initial_state, CombinedReducer};
pub use store::{ReducerFn, Reduction, Store};
