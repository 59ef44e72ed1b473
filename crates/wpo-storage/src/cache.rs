//! Reference set to merged artifact cache.
//!
//! Each distinct [`ResourceReferenceSet`] is merged and post-processed at
//! most once per process. Later requests for the same membership, in any
//! order, get the stored artifact path without touching the store.

use crate::compression::CompressionStatsSnapshot;
use crate::merger::ArtifactMerger;
use crate::once::{BuildOnceMap, Lookup};
use crate::pipeline::PostProcessingPipeline;
use crate::{Charset, ResourceStore, Result, StorageError};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{error, info};
use wpo_types::{artifact_path, BuildMode, ResourceKind, ResourceReferenceSet};

/// Merge cache statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Requests answered from the cache.
    pub hits: u64,
    /// Requests that ran a build.
    pub misses: u64,
    /// Builds that produced an artifact.
    pub builds: u64,
    /// Builds that failed and stored nothing.
    pub failed_builds: u64,
    /// Number of cached artifacts.
    pub size: usize,
}

impl CacheStats {
    /// Returns the cache hit ratio.
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Cache metrics for monitoring.
#[derive(Debug, Default)]
pub struct CacheMetrics {
    hits: AtomicU64,
    misses: AtomicU64,
    builds: AtomicU64,
    failed_builds: AtomicU64,
}

impl CacheMetrics {
    /// Creates new cache metrics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a cache hit.
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a cache miss.
    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a finished build.
    pub fn record_build(&self) {
        self.builds.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a failed build.
    pub fn record_failed_build(&self) {
        self.failed_builds.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns current metrics.
    pub fn snapshot(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            builds: self.builds.load(Ordering::Relaxed),
            failed_builds: self.failed_builds.load(Ordering::Relaxed),
            size: 0,
        }
    }
}

/// Build-once cache from reference sets to artifact paths, for one kind.
#[derive(Debug)]
pub struct MergeCache<S> {
    kind: ResourceKind,
    mode: BuildMode,
    directory: String,
    merger: ArtifactMerger<S>,
    pipeline: PostProcessingPipeline,
    artifacts: BuildOnceMap<ResourceReferenceSet, String>,
    metrics: CacheMetrics,
}

impl<S: ResourceStore> MergeCache<S> {
    /// Creates a cache writing artifacts of `kind` under `directory`.
    pub fn new(
        store: S,
        kind: ResourceKind,
        mode: BuildMode,
        directory: impl Into<String>,
        pipeline: PostProcessingPipeline,
    ) -> Self {
        Self {
            kind,
            mode,
            directory: directory.into(),
            merger: ArtifactMerger::new(store),
            pipeline,
            artifacts: BuildOnceMap::new(),
            metrics: CacheMetrics::new(),
        }
    }

    /// Reads sources and writes artifacts in `charset`.
    #[must_use]
    pub fn with_charset(self, charset: Charset) -> Self {
        Self {
            merger: self.merger.with_charset(charset),
            ..self
        }
    }

    /// Returns the kind of artifacts this cache builds.
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &S {
        self.merger.store()
    }

    /// Returns the artifact path for `set`, merging and post-processing it
    /// on first request.
    ///
    /// Concurrent first requests for the same membership run one build; the
    /// others wait for its path. A failed merge write records nothing.
    pub fn get_or_build_artifact_path(&self, set: &ResourceReferenceSet) -> Result<String> {
        if set.is_empty() {
            return Err(StorageError::EmptyReferenceSet);
        }

        match self.artifacts.get_or_try_build(set, || self.build(set)) {
            Ok(Lookup::Cached(path)) => {
                self.metrics.record_hit();
                Ok(path)
            }
            Ok(Lookup::Built(path)) => {
                self.metrics.record_miss();
                self.metrics.record_build();
                Ok(path)
            }
            Err(e) => {
                self.metrics.record_miss();
                self.metrics.record_failed_build();
                error!(kind = %self.kind, members = set.len(), error = %e, "artifact build failed");
                Err(e)
            }
        }
    }

    /// Returns the stored artifact path for `set`, if built.
    pub fn get(&self, set: &ResourceReferenceSet) -> Option<String> {
        self.artifacts.get(set)
    }

    /// Returns the number of cached artifacts.
    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    /// Returns true if nothing has been built.
    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.metrics.snapshot();
        stats.size = self.artifacts.len();
        stats
    }

    /// Returns compression statistics for artifacts built so far.
    pub fn compression_stats(&self) -> CompressionStatsSnapshot {
        self.pipeline.compression_stats()
    }

    fn build(&self, set: &ResourceReferenceSet) -> Result<String> {
        let path = artifact_path(&self.directory, self.mode, self.kind, set);
        let report = self.merger.merge(set, &path)?;
        let steps = self.pipeline.run(self.merger.store(), &path);
        info!(
            kind = %self.kind,
            path = %path,
            merged = report.merged.len(),
            skipped = report.skipped.len(),
            steps = ?steps.applied,
            "optimized resource file"
        );
        Ok(path)
    }
}
