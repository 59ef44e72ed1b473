//! Cache of optimized page bodies.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;
use wpo_storage::{BuildOnceMap, Lookup};
use wpo_types::ResourceKind;

/// Identity of a rendered page for one optimizer kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageKey {
    /// Which optimizer rendered the body.
    pub kind: ResourceKind,
    /// Route of the page, e.g. `/account/login.jsp`.
    pub route: String,
}

impl PageKey {
    /// Creates a page key.
    pub fn new(kind: ResourceKind, route: impl Into<String>) -> Self {
        Self {
            kind,
            route: route.into(),
        }
    }
}

impl fmt::Display for PageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.route)
    }
}

/// Optimized bodies keyed by page, each rendered at most once.
#[derive(Debug, Default)]
pub struct RenderedBodyCache {
    bodies: BuildOnceMap<PageKey, String>,
    hits: AtomicU64,
    renders: AtomicU64,
}

impl RenderedBodyCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached body for `key`, rendering it on first request.
    ///
    /// A failed render is not cached.
    pub fn get_or_render<F, E>(&self, key: &PageKey, render: F) -> Result<String, E>
    where
        F: FnOnce() -> Result<String, E>,
    {
        match self.bodies.get_or_try_build(key, render)? {
            Lookup::Cached(body) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!(page = %key, "optimized body loaded from cache");
                Ok(body)
            }
            Lookup::Built(body) => {
                self.renders.fetch_add(1, Ordering::Relaxed);
                Ok(body)
            }
        }
    }

    /// Returns the cached body for `key`, if any.
    pub fn get(&self, key: &PageKey) -> Option<String> {
        self.bodies.get(key)
    }

    /// Returns the number of cached bodies.
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    /// Returns true if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Returns how many requests were served from the cache.
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Returns how many bodies were rendered.
    pub fn renders(&self) -> u64 {
        self.renders.load(Ordering::Relaxed)
    }
}
