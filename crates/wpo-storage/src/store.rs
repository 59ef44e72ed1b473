//! Filesystem and in-memory resource stores.

use crate::{ResourceStore, Result, StorageError};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Resource store backed by a deployment root directory.
///
/// Identifiers are resolved relative to `root` after stripping the
/// deployment's context path, so `/app/js/a.js` with context path `/app`
/// maps to `{root}/js/a.js`.
#[derive(Debug, Clone)]
pub struct FsResourceStore {
    root: PathBuf,
    context_path: String,
}

impl FsResourceStore {
    /// Creates a store rooted at `root` with no context path.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            context_path: String::new(),
        }
    }

    /// Sets the context path stripped from identifiers before resolution.
    #[must_use]
    pub fn with_context_path(mut self, context_path: impl Into<String>) -> Self {
        self.context_path = context_path.into().trim_end_matches('/').to_string();
        self
    }

    /// Returns the deployment root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps a web-root-relative identifier to a path under the root.
    pub fn resolve(&self, path: &str) -> Result<PathBuf> {
        let relative = if !self.context_path.is_empty() && path.starts_with(&self.context_path) {
            &path[self.context_path.len()..]
        } else {
            path
        };

        if relative.contains("://") || relative.starts_with("//") {
            return Err(StorageError::InvalidPath(path.to_string()));
        }

        let mut resolved = self.root.clone();
        for component in Path::new(relative.trim_start_matches('/')).components() {
            match component {
                Component::Normal(part) => resolved.push(part),
                Component::CurDir => {}
                _ => return Err(StorageError::InvalidPath(path.to_string())),
            }
        }

        if resolved == self.root {
            return Err(StorageError::InvalidPath(path.to_string()));
        }
        Ok(resolved)
    }
}

impl ResourceStore for FsResourceStore {
    fn read(&self, path: &str) -> Result<Vec<u8>> {
        let resolved = self.resolve(path)?;
        std::fs::read(&resolved).map_err(|source| StorageError::Read {
            path: path.to_string(),
            source,
        })
    }

    fn write(&self, path: &str, contents: &[u8]) -> Result<()> {
        let resolved = self.resolve(path)?;
        let write = || -> io::Result<()> {
            if let Some(parent) = resolved.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&resolved, contents)
        };
        write().map_err(|source| StorageError::Write {
            path: path.to_string(),
            source,
        })
    }

    fn exists(&self, path: &str) -> Result<bool> {
        Ok(self.resolve(path)?.is_file())
    }
}

/// In-memory resource store.
///
/// Counts reads and writes, and can be switched to read-only to simulate a
/// deployment root that rejects writes.
#[derive(Debug, Default)]
pub struct MemoryResourceStore {
    resources: RwLock<HashMap<String, Vec<u8>>>,
    read_only: AtomicBool,
    reads: AtomicU64,
    writes: AtomicU64,
}

impl MemoryResourceStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a resource without counting it as a write.
    pub fn insert(&self, path: impl Into<String>, contents: impl Into<Vec<u8>>) {
        self.resources.write().insert(path.into(), contents.into());
    }

    /// Returns a copy of a resource.
    pub fn get(&self, path: &str) -> Option<Vec<u8>> {
        self.resources.read().get(path).cloned()
    }

    /// Removes a resource.
    pub fn remove(&self, path: &str) -> Option<Vec<u8>> {
        self.resources.write().remove(path)
    }

    /// Makes subsequent writes fail (or succeed again).
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::SeqCst);
    }

    /// Returns the number of resources held.
    pub fn len(&self) -> usize {
        self.resources.read().len()
    }

    /// Returns true if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.resources.read().is_empty()
    }

    /// Returns the number of read calls served.
    pub fn reads(&self) -> u64 {
        self.reads.load(Ordering::Relaxed)
    }

    /// Returns the number of successful writes.
    pub fn writes(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }
}

impl ResourceStore for MemoryResourceStore {
    fn read(&self, path: &str) -> Result<Vec<u8>> {
        self.reads.fetch_add(1, Ordering::Relaxed);
        self.get(path)
            .ok_or_else(|| StorageError::NotFound(path.to_string()))
    }

    fn write(&self, path: &str, contents: &[u8]) -> Result<()> {
        if self.read_only.load(Ordering::SeqCst) {
            return Err(StorageError::Write {
                path: path.to_string(),
                source: io::Error::new(io::ErrorKind::PermissionDenied, "store is read-only"),
            });
        }
        self.insert(path, contents);
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn exists(&self, path: &str) -> Result<bool> {
        Ok(self.resources.read().contains_key(path))
    }
}
