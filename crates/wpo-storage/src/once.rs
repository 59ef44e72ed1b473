//! Keyed build-once cells.
//!
//! Concurrent callers asking for the same key share a single build: the
//! first caller runs it while the rest block on the key's cell and then read
//! the stored value. Different keys never wait on each other beyond the brief
//! map lock. A build that fails stores nothing and leaves the cell in place;
//! the next caller on the same cell retries, so one successful build per key
//! is ever run.

use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

/// How a value was obtained from a [`BuildOnceMap`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<V> {
    /// The value was already stored.
    Cached(V),
    /// This call ran the build.
    Built(V),
}

impl<V> Lookup<V> {
    /// Returns true if this call ran the build.
    pub fn was_built(&self) -> bool {
        matches!(self, Lookup::Built(_))
    }

    /// Returns the value.
    pub fn into_inner(self) -> V {
        match self {
            Lookup::Cached(v) | Lookup::Built(v) => v,
        }
    }
}

/// Map whose values are computed at most once per key.
#[derive(Debug)]
pub struct BuildOnceMap<K, V> {
    cells: RwLock<HashMap<K, Arc<OnceCell<V>>>>,
}

impl<K, V> Default for BuildOnceMap<K, V> {
    fn default() -> Self {
        Self {
            cells: RwLock::new(HashMap::new()),
        }
    }
}

impl<K, V> BuildOnceMap<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the stored value for `key`, if its build has completed.
    pub fn get(&self, key: &K) -> Option<V> {
        self.cells.read().get(key).and_then(|cell| cell.get().cloned())
    }

    /// Returns the value for `key`, running `build` if none is stored yet.
    ///
    /// While a build for `key` is in flight, other callers for `key` block
    /// until it finishes. If it fails, the blocked callers retry one at a
    /// time on the same cell; later callers wait on that retry.
    pub fn get_or_try_build<F, E>(&self, key: &K, build: F) -> Result<Lookup<V>, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        let cell = self.cell(key);
        if let Some(value) = cell.get() {
            return Ok(Lookup::Cached(value.clone()));
        }

        let mut built = false;
        let value = cell.get_or_try_init(|| {
            built = true;
            build()
        })?;

        if built {
            Ok(Lookup::Built(value.clone()))
        } else {
            Ok(Lookup::Cached(value.clone()))
        }
    }

    /// Returns the number of keys with a stored value.
    pub fn len(&self) -> usize {
        self.cells
            .read()
            .values()
            .filter(|cell| cell.get().is_some())
            .count()
    }

    /// Returns true if no value is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn cell(&self, key: &K) -> Arc<OnceCell<V>> {
        if let Some(cell) = self.cells.read().get(key) {
            return Arc::clone(cell);
        }
        Arc::clone(self.cells.write().entry(key.clone()).or_default())
    }
}
