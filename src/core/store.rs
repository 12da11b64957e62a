//! Named stores and the result type their reducers return.

use std::fmt;
use std::sync::Arc;

/// Outcome of running one store's reducer against an action.
///
/// A reducer that does not handle an action returns `Unchanged` instead of
/// echoing its current state back.
#[derive(Debug, PartialEq)]
pub enum Reduction<S> {
    /// The store did not act on this action.
    Unchanged,

    /// The store produced a next state.
    Changed(Arc<S>),
}

impl<S> Reduction<S> {
    /// Wrap a freshly computed state.
    ///
    /// # Example
    ///
    /// ```rust
    /// use storefold::Reduction;
    ///
    /// let next = Reduction::changed(42);
    /// assert!(next.is_changed());
    /// ```
    pub fn changed(value: S) -> Self {
        Reduction::Changed(Arc::new(value))
    }

    /// Return the given state allocation as-is.
    ///
    /// The combined reducer compares allocations, so returning the current
    /// state through `keep` is reported as no change.
    pub fn keep(current: &Arc<S>) -> Self {
        Reduction::Changed(Arc::clone(current))
    }

    pub fn is_changed(&self) -> bool {
        matches!(self, Reduction::Changed(_))
    }
}

impl<S> Clone for Reduction<S> {
    fn clone(&self) -> Self {
        match self {
            Reduction::Unchanged => Reduction::Unchanged,
            Reduction::Changed(next) => Reduction::Changed(Arc::clone(next)),
        }
    }
}

impl<S> From<Option<S>> for Reduction<S> {
    fn from(value: Option<S>) -> Self {
        value.map_or(Reduction::Unchanged, Reduction::changed)
    }
}

/// Type alias for store reducer functions.
///
/// The first argument is the store's current state, or `None` when the
/// combined state has no entry for the store.
pub type ReducerFn<S, A> = Arc<dyn Fn(Option<&Arc<S>>, &A) -> Reduction<S> + Send + Sync>;

/// A named unit of state with its own initial value and reducer.
///
/// Stores are owned by the caller. Cloning is cheap: the name, initial
/// state and reducer are all shared.
///
/// # Example
///
/// ```rust
/// use storefold::{Reduction, Store};
///
/// let counter: Store<i64, &str> = Store::new("counter", 0, |state, action| {
///     match (*action, state) {
///         ("inc", Some(n)) => Reduction::changed(**n + 1),
///         _ => Reduction::Unchanged,
///     }
/// });
///
/// assert_eq!(counter.name(), "counter");
/// assert_eq!(**counter.initial_state(), 0);
/// ```
pub struct Store<S, A> {
    name: Arc<str>,
    initial_state: Arc<S>,
    reducer: ReducerFn<S, A>,
}

impl<S, A> Store<S, A> {
    /// Create a store from its name, initial state and reducer.
    ///
    /// The reducer must be pure and thread-safe (Send + Sync).
    pub fn new<F>(name: impl Into<Arc<str>>, initial_state: S, reducer: F) -> Self
    where
        F: Fn(Option<&Arc<S>>, &A) -> Reduction<S> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            initial_state: Arc::new(initial_state),
            reducer: Arc::new(reducer),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn shared_name(&self) -> &Arc<str> {
        &self.name
    }

    pub fn initial_state(&self) -> &Arc<S> {
        &self.initial_state
    }

    /// Run this store's reducer.
    pub fn reduce(&self, current: Option<&Arc<S>>, action: &A) -> Reduction<S> {
        (self.reducer)(current, action)
    }
}

impl<S, A> Clone for Store<S, A> {
    fn clone(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            initial_state: Arc::clone(&self.initial_state),
            reducer: Arc::clone(&self.reducer),
        }
    }
}

impl<S: fmt::Debug, A> fmt::Debug for Store<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("name", &self.name)
            .field("initial_state", &self.initial_state)
            .finish_non_exhaustive()
    }
}
