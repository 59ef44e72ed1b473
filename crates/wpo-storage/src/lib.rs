//! Artifact building for wpo.
//!
//! This crate turns a [`ResourceReferenceSet`](wpo_types::ResourceReferenceSet)
//! into a merged, post-processed artifact on a [`ResourceStore`], and
//! remembers the result so each distinct set is built only once.
//!
//! ```
//! use wpo_storage::{MemoryResourceStore, MergeCache, PostProcessingPipeline, ResourceStore};
//! use wpo_types::{BuildMode, ResourceKind, ResourceReferenceSet};
//!
//! let store = MemoryResourceStore::new();
//! store.insert("/js/a.js", "var a = 1;");
//! store.insert("/js/b.js", "var b = 2;");
//!
//! let cache = MergeCache::new(
//!     store,
//!     ResourceKind::Script,
//!     BuildMode::Static,
//!     "/js",
//!     PostProcessingPipeline::new(),
//! );
//! let set = ResourceReferenceSet::new(["/js/a.js", "/js/b.js"]);
//! let path = cache.get_or_build_artifact_path(&set).unwrap();
//! assert_eq!(
//!     cache.store().read_to_string(&path).unwrap(),
//!     "var a = 1;\nvar b = 2;\n"
//! );
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cache;
pub mod charset;
pub mod compression;
mod error;
pub mod merger;
pub mod once;
pub mod pipeline;
pub mod store;
mod traits;

pub use cache::{CacheMetrics, CacheStats, MergeCache};
pub use charset::Charset;
pub use compression::{gunzip, gzip, CompressionLevel, CompressionStats, CompressionStatsSnapshot};
pub use error::{Result, StorageError};
pub use merger::{ArtifactMerger, MergeReport};
pub use once::{BuildOnceMap, Lookup};
pub use pipeline::{
    ArtifactPolicy, ArtifactStep, GzipStep, MinifyStep, PipelineReport, PostProcessingPipeline,
};
pub use store::{FsResourceStore, MemoryResourceStore};
pub use traits::ResourceStore;
