//! Combining stores into one initial state and one reducer.
//!
//! Both functions are pure. The combined reducer walks stores in the order
//! they were supplied and stops at the first store whose state changes, so
//! at most one store is updated per dispatched action.

use super::data::StoreData;
use super::store::{Reduction, Store};
use std::sync::Arc;
use tracing::{debug, trace};

/// Build the combined initial state from a list of stores.
///
/// Each store's name maps to its initial state, in store order. When two
/// stores share a name the later store overwrites the earlier entry; use
/// [`CombineBuilder`](crate::builder::CombineBuilder) with
/// [`DuplicatePolicy::Reject`](crate::builder::DuplicatePolicy::Reject) to
/// turn that into an error instead.
///
/// # Example
///
/// ```rust
/// use storefold::{initial_state, Reduction, Store};
///
/// let stores: Vec<Store<&str, ()>> = vec![
///     Store::new("a", "zero", |_, _| Reduction::Unchanged),
///     Store::new("b", "x", |_, _| Reduction::Unchanged),
/// ];
///
/// let data = initial_state(&stores);
/// assert_eq!(data.names().collect::<Vec<_>>(), vec!["a", "b"]);
/// assert_eq!(data.get("b").map(|s| **s), Some("x"));
/// ```
pub fn initial_state<S, A>(stores: &[Store<S, A>]) -> StoreData<S> {
    stores
        .iter()
        .fold(StoreData::with_capacity(stores.len()), |mut data, store| {
            let name = Arc::clone(store.shared_name());
            if data.insert(name, Arc::clone(store.initial_state())).is_some() {
                debug!(store = store.name(), "duplicate store name, later initial state wins");
            }
            data
        })
}

/// Build a reducer over the combined state of `stores`.
///
/// The store list is captured once; later changes to the caller's
/// collection do not affect the returned reducer.
pub fn combined_reducer<S, A>(
    stores: impl IntoIterator<Item = Store<S, A>>,
) -> CombinedReducer<S, A> {
    CombinedReducer {
        stores: stores.into_iter().collect(),
    }
}

/// The next state when a store changed, `None` otherwise.
///
/// A store is changed when its reducer returns a state other than the
/// exact allocation it was given. Value-equal copies count as changed.
fn changed_state<S>(current: Option<&Arc<S>>, next: Reduction<S>) -> Option<Arc<S>> {
    match next {
        Reduction::Unchanged => None,
        Reduction::Changed(next) => {
            current.is_none_or(|current| !Arc::ptr_eq(current, &next)).then_some(next)
        }
    }
}

/// Reducer over the combined state of an immutable list of stores.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use storefold::{combined_reducer, initial_state, Reduction, Store};
///
/// #[derive(Debug, PartialEq)]
/// enum Value {
///     Count(i32),
///     Label(&'static str),
/// }
///
/// let stores: Vec<Store<Value, &str>> = vec![
///     Store::new("a", Value::Count(0), |state, action| match (state.map(|s| &**s), *action) {
///         (Some(Value::Count(n)), "INC") => Reduction::changed(Value::Count(n + 1)),
///         _ => Reduction::Unchanged,
///     }),
///     Store::new("b", Value::Label("x"), |_, _| Reduction::Unchanged),
/// ];
///
/// let state = Arc::new(initial_state(&stores));
/// let reducer = combined_reducer(stores);
///
/// let next = reducer.reduce(&state, &"INC");
/// assert_eq!(next.get("a").map(|s| &**s), Some(&Value::Count(1)));
/// assert!(Arc::ptr_eq(state.get("b").unwrap(), next.get("b").unwrap()));
///
/// let same = reducer.reduce(&state, &"NOOP");
/// assert!(Arc::ptr_eq(&state, &same));
/// ```
pub struct CombinedReducer<S, A> {
    stores: Arc<[Store<S, A>]>,
}

impl<S, A> CombinedReducer<S, A> {
    /// Stores in dispatch order.
    pub fn stores(&self) -> &[Store<S, A>] {
        &self.stores
    }

    /// Dispatch one action across the stores.
    ///
    /// Returns a new combined state as soon as one store changes, with only
    /// that store's entry replaced. Stores after it are not consulted. When
    /// no store changes, the input `Arc` itself is returned, so callers can
    /// detect a no-op with [`Arc::ptr_eq`].
    ///
    /// A panicking store reducer propagates to the caller.
    pub fn reduce(&self, state: &Arc<StoreData<S>>, action: &A) -> Arc<StoreData<S>> {
        for store in self.stores.iter() {
            let current = state.get(store.name());
            trace!(store = store.name(), "reducing");

            if let Some(next) = changed_state(current, store.reduce(current, action)) {
                debug!(store = store.name(), "store state changed");
                return Arc::new(state.with(Arc::clone(store.shared_name()), next));
            }
        }

        Arc::clone(state)
    }

    /// Convert into a plain function value with the same behavior.
    pub fn into_fn(self) -> impl Fn(&Arc<StoreData<S>>, &A) -> Arc<StoreData<S>> + Send + Sync
    where
        S: Send + Sync,
    {
        move |state: &Arc<StoreData<S>>, action: &A| self.reduce(state, action)
    }
}

impl<S, A> Clone for CombinedReducer<S, A> {
    fn clone(&self) -> Self {
        Self {
            stores: Arc::clone(&self.stores),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Clone, PartialEq)]
    enum Action {
        Inc,
        Rename(&'static str),
        Noop,
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Value {
        Count(i32),
        Label(String),
    }

    fn counter(name: &'static str) -> Store<Value, Action> {
        Store::new(name, Value::Count(0), |state: Option<&Arc<Value>>, action: &Action| {
            match (action, state.map(|s| &**s)) {
                (Action::Inc, Some(Value::Count(n))) => Reduction::changed(Value::Count(n + 1)),
                _ => Reduction::Unchanged,
            }
        })
    }

    fn label(name: &'static str) -> Store<Value, Action> {
        Store::new(
            name,
            Value::Label("x".to_string()),
            |_: Option<&Arc<Value>>, action: &Action| match action {
                Action::Rename(to) => Reduction::changed(Value::Label(to.to_string())),
                _ => Reduction::Unchanged,
            },
        )
    }

    fn counting(name: &'static str, calls: Arc<AtomicUsize>) -> Store<Value, Action> {
        Store::new(name, Value::Count(0), move |_: Option<&Arc<Value>>, _: &Action| {
            calls.fetch_add(1, Ordering::SeqCst);
            Reduction::Unchanged
        })
    }

    #[test]
    fn initial_state_maps_names_to_initial_values() {
        let stores = vec![counter("a"), label("b")];
        let data = initial_state(&stores);

        assert_eq!(data.names().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(data.get("a").map(|s| &**s), Some(&Value::Count(0)));
        assert_eq!(
            data.get("b").map(|s| &**s),
            Some(&Value::Label("x".to_string()))
        );
        assert!(Arc::ptr_eq(data.get("a").unwrap(), stores[0].initial_state()));
    }

    #[test]
    fn initial_state_of_no_stores_is_empty() {
        let stores: Vec<Store<Value, Action>> = Vec::new();
        assert!(initial_state(&stores).is_empty());
    }

    #[test]
    fn initial_state_last_write_wins() {
        let stores = vec![counter("a"), label("b"), label("a")];
        let data = initial_state(&stores);

        assert_eq!(data.len(), 2);
        assert_eq!(data.names().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(
            data.get("a").map(|s| &**s),
            Some(&Value::Label("x".to_string()))
        );
    }

    #[test]
    fn reduce_replaces_only_changed_store() {
        let stores = vec![counter("a"), label("b")];
        let state = Arc::new(initial_state(&stores));
        let reducer = combined_reducer(stores);

        let next = reducer.reduce(&state, &Action::Inc);

        assert!(!Arc::ptr_eq(&state, &next));
        assert_eq!(next.get("a").map(|s| &**s), Some(&Value::Count(1)));
        assert!(Arc::ptr_eq(state.get("b").unwrap(), next.get("b").unwrap()));
        assert_eq!(state.get("a").map(|s| &**s), Some(&Value::Count(0)));
    }

    #[test]
    fn reduce_returns_same_state_when_nothing_changes() {
        let stores = vec![counter("a"), label("b")];
        let state = Arc::new(initial_state(&stores));
        let reducer = combined_reducer(stores);

        let next = reducer.reduce(&state, &Action::Noop);
        assert!(Arc::ptr_eq(&state, &next));
    }

    #[test]
    fn empty_reducer_returns_input() {
        let reducer = combined_reducer(Vec::<Store<Value, Action>>::new());
        let state = Arc::new(StoreData::new());

        assert!(Arc::ptr_eq(&state, &reducer.reduce(&state, &Action::Inc)));
    }

    #[test]
    fn reduce_short_circuits_on_first_change() {
        let calls = Arc::new(AtomicUsize::new(0));
        let stores = vec![
            counter("first"),
            counter("second"),
            counting("third", Arc::clone(&calls)),
        ];
        let state = Arc::new(initial_state(&stores));
        let reducer = combined_reducer(stores);

        let next = reducer.reduce(&state, &Action::Inc);

        assert_eq!(next.get("first").map(|s| &**s), Some(&Value::Count(1)));
        assert_eq!(next.get("second").map(|s| &**s), Some(&Value::Count(0)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let next = reducer.reduce(&state, &Action::Noop);
        assert!(Arc::ptr_eq(&state, &next));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn returning_current_allocation_is_not_a_change() {
        let stores: Vec<Store<Value, Action>> = vec![
            Store::new("echo", Value::Count(0), |state: Option<&Arc<Value>>, _: &Action| {
                state.map_or(Reduction::Unchanged, Reduction::keep)
            }),
            label("b"),
        ];
        let state = Arc::new(initial_state(&stores));
        let reducer = combined_reducer(stores);

        let next = reducer.reduce(&state, &Action::Rename("y"));

        assert_eq!(
            next.get("b").map(|s| &**s),
            Some(&Value::Label("y".to_string()))
        );
        assert!(Arc::ptr_eq(state.get("echo").unwrap(), next.get("echo").unwrap()));
    }

    #[test]
    fn equal_value_in_new_allocation_is_a_change() {
        let stores: Vec<Store<Value, Action>> = vec![
            Store::new("copy", Value::Count(0), |state: Option<&Arc<Value>>, _: &Action| {
                state.map_or(Reduction::Unchanged, |s| Reduction::changed((**s).clone()))
            }),
            label("b"),
        ];
        let state = Arc::new(initial_state(&stores));
        let reducer = combined_reducer(stores);

        let next = reducer.reduce(&state, &Action::Rename("y"));

        assert!(!Arc::ptr_eq(&state, &next));
        assert_eq!(next.get("copy"), state.get("copy"));
        assert!(!Arc::ptr_eq(state.get("copy").unwrap(), next.get("copy").unwrap()));
        assert_eq!(
            next.get("b").map(|s| &**s),
            Some(&Value::Label("x".to_string()))
        );
    }

    #[test]
    fn missing_entry_is_passed_as_none() {
        let seen = Arc::new(AtomicUsize::new(0));
        let seen_in_reducer = Arc::clone(&seen);
        let store: Store<Value, Action> =
            Store::new("late", Value::Count(7), move |state: Option<&Arc<Value>>, _: &Action| {
                if state.is_none() {
                    seen_in_reducer.fetch_add(1, Ordering::SeqCst);
                    Reduction::changed(Value::Count(1))
                } else {
                    Reduction::Unchanged
                }
            });
        let reducer = combined_reducer(vec![store]);
        let state = Arc::new(StoreData::new());

        let next = reducer.reduce(&state, &Action::Noop);

        assert_eq!(seen.load(Ordering::SeqCst), 1);
        assert_eq!(next.get("late").map(|s| &**s), Some(&Value::Count(1)));
    }

    #[test]
    fn stores_are_captured_at_construction() {
        let mut stores = vec![counter("a")];
        let reducer = combined_reducer(stores.clone());
        stores.push(label("b"));

        assert_eq!(reducer.stores().len(), 1);
        assert_eq!(reducer.clone().stores()[0].name(), "a");
    }

    #[test]
    fn into_fn_behaves_like_reduce() {
        let stores = vec![counter("a"), label("b")];
        let state = Arc::new(initial_state(&stores));
        let reduce = combined_reducer(stores).into_fn();

        let next = reduce(&state, &Action::Rename("z"));
        assert_eq!(
            next.get("b").map(|s| &**s),
            Some(&Value::Label("z".to_string()))
        );
        assert!(Arc::ptr_eq(&state, &reduce(&state, &Action::Noop)));
    }

    #[test]
    fn changed_state_compares_allocations() {
        let current = Arc::new(Value::Count(1));

        assert_eq!(changed_state(Some(&current), Reduction::Unchanged), None);
        assert_eq!(changed_state(None, Reduction::<Value>::Unchanged), None);
        assert_eq!(changed_state(Some(&current), Reduction::keep(&current)), None);

        let copy = changed_state(Some(&current), Reduction::changed(Value::Count(1)));
        assert!(copy.is_some_and(|next| !Arc::ptr_eq(&next, &current)));

        let fresh = changed_state(None, Reduction::keep(&current));
        assert!(fresh.is_some_and(|next| Arc::ptr_eq(&next, &current)));
    }

    #[test]
    fn noop_dispatch_over_many_stores_consults_each_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let stores: Vec<Store<Value, Action>> = (0..10_000)
            .map(|i| {
                let calls = Arc::clone(&calls);
                Store::new(
                    format!("store-{i}"),
                    Value::Count(i),
                    move |state: Option<&Arc<Value>>, _: &Action| {
                        assert!(state.is_some());
                        calls.fetch_add(1, Ordering::SeqCst);
                        Reduction::Unchanged
                    },
                )
            })
            .collect();
        let state = Arc::new(initial_state(&stores));
        let reducer = combined_reducer(stores);

        assert_eq!(state.len(), 10_000);
        assert!(Arc::ptr_eq(&state, &reducer.reduce(&state, &Action::Noop)));
        assert_eq!(calls.load(Ordering::SeqCst), 10_000);
    }

    #[test]
    #[should_panic(expected = "reducer failed")]
    fn reducer_panic_propagates() {
        let store: Store<Value, Action> =
            Store::new("boom", Value::Count(0), |_: Option<&Arc<Value>>, _: &Action| {
                panic!("reducer failed")
            });
        let state = Arc::new(initial_state(std::slice::from_ref(&store)));
        combined_reducer(vec![store]).reduce(&state, &Action::Noop);
    }
}
