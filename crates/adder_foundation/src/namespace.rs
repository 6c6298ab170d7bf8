//! Persistent namespaces.
//!
//! A [`Namespace`] maps identifier names to values. It is a thin wrapper
//! around `im::OrdMap`, so cloning one is O(1): the REPL hands snapshots of
//! the live namespaces to the line editor before every read without copying
//! them.

use std::fmt;

/// A name-to-value mapping representing one scope.
///
/// Keys are plain strings; nothing requires them to be valid identifiers.
#[derive(Clone)]
pub struct Namespace<V: Clone>(im::OrdMap<String, V>);

impl<V: Clone> Namespace<V> {
    /// Creates an empty namespace.
    #[must_use]
    pub fn new() -> Self {
        Self(im::OrdMap::new())
    }

    /// Returns the number of bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no bindings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Looks up a binding by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&V> {
        self.0.get(name)
    }

    /// Returns true if `name` is bound.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Binds `name` to `value`, returning the previous value if any.
    pub fn insert(&mut self, name: impl Into<String>, value: V) -> Option<V> {
        self.0.insert(name.into(), value)
    }

    /// Removes a binding, returning its value if it was bound.
    pub fn remove(&mut self, name: &str) -> Option<V> {
        self.0.remove(name)
    }

    /// Iterates over the bound names in byte order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Iterates over `(name, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns a snapshot of this namespace.
    ///
    /// The snapshot shares structure with `self` and is unaffected by later
    /// writes to either side.
    #[must_use]
    pub fn snapshot(&self) -> Self {
        self.clone()
    }
}

impl<V: Clone> Default for Namespace<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone> fmt::Debug for Namespace<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}

impl<K: Into<String>, V: Clone> FromIterator<(K, V)> for Namespace<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut ns = Self::new();
        for (name, value) in iter {
            ns.insert(name, value);
        }
        ns
    }
}
