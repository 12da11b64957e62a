//! Combined state keyed by store name.
//!
//! `StoreData` is a persistent value: updates return a new mapping that
//! shares every untouched per-store state with the previous one.

use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Ordered mapping from store name to that store's current state.
///
/// Entries keep the order in which their names were first inserted. Name
/// lookups go through a hash index into the ordered entries.
///
/// # Example
///
/// ```rust
/// use storefold::StoreData;
/// use std::sync::Arc;
///
/// let data: StoreData<i32> = [("a", 1), ("b", 2)].into_iter().collect();
/// let next = data.with("a", Arc::new(10));
///
/// assert_eq!(data.get("a").map(|s| **s), Some(1)); // Original unchanged
/// assert_eq!(next.get("a").map(|s| **s), Some(10));
/// assert!(Arc::ptr_eq(data.get("b").unwrap(), next.get("b").unwrap()));
/// ```
pub struct StoreData<S> {
    entries: Vec<(Arc<str>, Arc<S>)>,
    index: HashMap<Arc<str>, usize>,
}

impl<S> StoreData<S> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Get the state stored under `name`.
    pub fn get(&self, name: &str) -> Option<&Arc<S>> {
        self.position(name).map(|index| &self.entries[index].1)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Store names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| &**key)
    }

    /// `(name, state)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<S>)> {
        self.entries.iter().map(|(key, value)| (&**key, value))
    }

    /// Insert or overwrite an entry in place.
    ///
    /// Overwriting keeps the entry at its original position. Returns the
    /// previous value when the name was already present.
    pub(crate) fn insert(&mut self, name: Arc<str>, value: Arc<S>) -> Option<Arc<S>> {
        match self.position(&name) {
            Some(index) => Some(std::mem::replace(&mut self.entries[index].1, value)),
            None => {
                self.index.insert(Arc::clone(&name), self.entries.len());
                self.entries.push((name, value));
                None
            }
        }
    }

    /// Return a new mapping with `name` set to `value`.
    ///
    /// This does not mutate `self`; every other entry is shared with the
    /// returned mapping.
    pub fn with(&self, name: impl Into<Arc<str>>, value: Arc<S>) -> Self {
        let mut next = self.clone();
        next.insert(name.into(), value);
        next
    }
}

impl<S> Default for StoreData<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Clone for StoreData<S> {
    fn clone(&self) -> Self {
        Self {
            entries: self
                .entries
                .iter()
                .map(|(key, value)| (Arc::clone(key), Arc::clone(value)))
                .collect(),
            index: self.index.clone(),
        }
    }
}

impl<S: fmt::Debug> fmt::Debug for StoreData<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<S: PartialEq> PartialEq for StoreData<S> {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<S: Eq> Eq for StoreData<S> {}

impl<K: Into<Arc<str>>, S> FromIterator<(K, S)> for StoreData<S> {
    fn from_iter<I: IntoIterator<Item = (K, S)>>(iter: I) -> Self {
        let mut data = StoreData::new();
        for (name, value) in iter {
            data.insert(name.into(), Arc::new(value));
        }
        data
    }
}

impl<S: Serialize> Serialize for StoreData<S> {
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, value.as_ref())?;
        }
        map.end()
    }
}

struct StoreDataVisitor<S> {
    _phantom: PhantomData<S>,
}

impl<'de, S: Deserialize<'de>> Visitor<'de> for StoreDataVisitor<S> {
    type Value = StoreData<S>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map from store name to store state")
    }

    fn visit_map<M: MapAccess<'de>>(self, mut access: M) -> Result<Self::Value, M::Error> {
        let mut data = StoreData::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((name, value)) = access.next_entry::<String, S>()? {
            data.insert(name.into(), Arc::new(value));
        }
        Ok(data)
    }
}

impl<'de, S: Deserialize<'de>> Deserialize<'de> for StoreData<S> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(StoreDataVisitor {
            _phantom: PhantomData,
        })
    }
}
