//! Builder for validated store combinations.

use crate::builder::error::BuildError;
use crate::core::{combined_reducer, initial_state, CombinedReducer, Store, StoreData};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// What to do when two stores share a name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Keep every store; the later store's initial state wins.
    #[default]
    LastWriteWins,

    /// Fail the build.
    Reject,
}

/// Builder for combining stores with a fluent API.
///
/// # Example
///
/// ```rust
/// use storefold::builder::{BuildError, CombineBuilder, DuplicatePolicy};
/// use storefold::{Reduction, Store};
///
/// let result = CombineBuilder::<i32, ()>::new()
///     .store(Store::new("a", 0, |_, _| Reduction::Unchanged))
///     .store(Store::new("a", 1, |_, _| Reduction::Unchanged))
///     .on_duplicate(DuplicatePolicy::Reject)
///     .build();
///
/// assert!(matches!(result, Err(BuildError::DuplicateStoreName { .. })));
/// ```
pub struct CombineBuilder<S, A> {
    stores: Vec<Store<S, A>>,
    policy: DuplicatePolicy,
}

impl<S, A> CombineBuilder<S, A> {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            stores: Vec::new(),
            policy: DuplicatePolicy::default(),
        }
    }

    /// Add a store at the end of the dispatch order.
    pub fn store(mut self, store: Store<S, A>) -> Self {
        self.stores.push(store);
        self
    }

    /// Add multiple stores at once.
    pub fn stores(mut self, stores: impl IntoIterator<Item = Store<S, A>>) -> Self {
        self.stores.extend(stores);
        self
    }

    /// Set the duplicate name policy (defaults to last-write-wins).
    pub fn on_duplicate(mut self, policy: DuplicatePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Build the combination.
    /// Returns an error if a duplicate name is found under `Reject`.
    pub fn build(self) -> Result<Combined<S, A>, BuildError> {
        if self.policy == DuplicatePolicy::Reject {
            check_unique_names(&self.stores)?;
        }

        Ok(Combined {
            stores: self.stores.into(),
        })
    }
}

impl<S, A> Default for CombineBuilder<S, A> {
    fn default() -> Self {
        Self::new()
    }
}

fn check_unique_names<S, A>(stores: &[Store<S, A>]) -> Result<(), BuildError> {
    for (second, store) in stores.iter().enumerate() {
        let earlier = stores[..second]
            .iter()
            .position(|other| other.name() == store.name());

        if let Some(first) = earlier {
            debug!(store = store.name(), first, second, "rejecting duplicate store name");
            return Err(BuildError::DuplicateStoreName {
                name: store.name().to_string(),
                first,
                second,
            });
        }
    }
    Ok(())
}

/// A validated, immutable list of stores.
///
/// The initial state and reducer are both derived from the same list, so
/// their key sets always agree.
pub struct Combined<S, A> {
    stores: Arc<[Store<S, A>]>,
}

impl<S, A> Combined<S, A> {
    pub fn stores(&self) -> &[Store<S, A>] {
        &self.stores
    }

    /// Combined initial state, ready to hand to the reducer.
    pub fn initial_state(&self) -> Arc<StoreData<S>> {
        Arc::new(initial_state(&self.stores))
    }

    pub fn reducer(&self) -> CombinedReducer<S, A> {
        combined_reducer(self.stores.iter().cloned())
    }
}

impl<S, A> Clone for Combined<S, A> {
    fn clone(&self) -> Self {
        Self {
            stores: Arc::clone(&self.stores),
        }
    }
}
