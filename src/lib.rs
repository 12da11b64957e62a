//! Storefold: combine independent named stores into one state and reducer
//!
//! Each store owns a slice of state: a name, an initial value and a pure
//! reducer. Storefold folds a list of stores into a single [`StoreData`]
//! keyed by store name and builds a [`CombinedReducer`] that dispatches an
//! action to each store in turn.
//!
//! # Core Concepts
//!
//! - **Store**: a named state slice with its own reducer
//! - **Reduction**: a reducer's answer, `Unchanged` or `Changed(next)`
//! - **StoreData**: the combined state, shared structurally between updates
//! - **CombinedReducer**: applies an action until the first store changes
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use storefold::{combined_reducer, initial_state, Reduction, Store};
//!
//! #[derive(Debug)]
//! enum Action {
//!     Increment,
//!     Reset,
//! }
//!
//! let stores: Vec<Store<u32, Action>> = vec![
//!     Store::new("clicks", 0, |state, action| match (action, state) {
//!         (Action::Increment, Some(n)) => Reduction::changed(**n + 1),
//!         _ => Reduction::Unchanged,
//!     }),
//!     Store::new("resets", 0, |state, action| match (action, state) {
//!         (Action::Reset, Some(n)) => Reduction::changed(**n + 1),
//!         _ => Reduction::Unchanged,
//!     }),
//! ];
//!
//! let state = Arc::new(initial_state(&stores));
//! let reducer = combined_reducer(stores);
//!
//! let state = reducer.reduce(&state, &Action::Increment);
//! let state = reducer.reduce(&state, &Action::Reset);
//!
//! assert_eq!(state.get("clicks").map(|n| **n), Some(1));
//! assert_eq!(state.get("resets").map(|n| **n), Some(1));
//! ```

pub mod builder;
pub mod core;

// Re-export commonly used types
pub use builder::{BuildError, CombineBuilder, DuplicatePolicy};
pub use crate::core::{
    combined_reducer, initial_state, CombinedReducer, Reduction, Store, StoreData,
};
