//! In-place post-processing of merged artifacts.
//!
//! A pipeline is an ordered list of [`ArtifactStep`]s run against the file a
//! merge just produced. Text-rewriting steps always run before steps that
//! encode bytes, so gzip is the last thing to touch an artifact.

use crate::compression::{gzip, CompressionLevel, CompressionStats, CompressionStatsSnapshot};
use crate::{Charset, ResourceStore, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error};
use wpo_types::ResourceKind;

/// Per-kind output and post-processing policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactPolicy {
    /// Output directory for artifacts; the kind's default when unset.
    pub directory: Option<String>,
    /// Whether to minify artifacts of this kind.
    pub minify: bool,
    /// Whether to gzip artifacts of this kind.
    pub compress: bool,
    /// Gzip level used when `compress` is set.
    pub compression_level: CompressionLevel,
}

impl Default for ArtifactPolicy {
    fn default() -> Self {
        Self {
            directory: None,
            minify: true,
            compress: false,
            compression_level: CompressionLevel::Default,
        }
    }
}

impl ArtifactPolicy {
    /// Returns the output directory for artifacts of `kind`.
    pub fn directory(&self, kind: ResourceKind) -> &str {
        match self.directory.as_deref() {
            Some(dir) if !dir.trim().is_empty() => dir,
            _ => kind.default_directory(),
        }
    }
}

/// A single in-place transformation of an artifact.
pub trait ArtifactStep: Send + Sync + fmt::Debug {
    /// Short name used in logs and reports.
    fn name(&self) -> &'static str;

    /// Rewrites the artifact at `path`.
    fn apply(&self, store: &dyn ResourceStore, path: &str) -> Result<()>;

    /// True if the step's output is no longer text.
    fn encodes_bytes(&self) -> bool {
        false
    }
}

/// Minifies an artifact as text of a given kind.
#[derive(Debug, Clone, Copy)]
pub struct MinifyStep {
    kind: ResourceKind,
    charset: Charset,
}

impl MinifyStep {
    /// Creates a minify step for UTF-8 artifacts of `kind`.
    pub fn new(kind: ResourceKind) -> Self {
        Self {
            kind,
            charset: Charset::default(),
        }
    }

    /// Reads and writes the artifact in `charset`.
    #[must_use]
    pub fn with_charset(mut self, charset: Charset) -> Self {
        self.charset = charset;
        self
    }
}

impl ArtifactStep for MinifyStep {
    fn name(&self) -> &'static str {
        "minify"
    }

    fn apply(&self, store: &dyn ResourceStore, path: &str) -> Result<()> {
        let text = store.read_text(path, self.charset)?;
        let minified = wpo_minify::minify(self.kind, &text)?;
        store.write_text(path, &minified, self.charset)
    }
}

/// Gzip-encodes an artifact.
#[derive(Debug, Clone)]
pub struct GzipStep {
    level: CompressionLevel,
    stats: Arc<CompressionStats>,
}

impl GzipStep {
    /// Creates a gzip step recording into `stats`.
    pub fn new(level: CompressionLevel, stats: Arc<CompressionStats>) -> Self {
        Self { level, stats }
    }
}

impl ArtifactStep for GzipStep {
    fn name(&self) -> &'static str {
        "compress"
    }

    fn apply(&self, store: &dyn ResourceStore, path: &str) -> Result<()> {
        let data = store.read(path)?;
        let encoded = gzip(&data, self.level)?;
        store.write(path, &encoded)?;
        self.stats
            .record_compress(data.len() as u64, encoded.len() as u64);
        Ok(())
    }

    fn encodes_bytes(&self) -> bool {
        true
    }
}

/// Steps applied or failed during one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PipelineReport {
    /// Steps that completed.
    pub applied: Vec<&'static str>,
    /// Steps that failed and left the artifact as the previous step wrote it.
    pub failed: Vec<&'static str>,
}

impl PipelineReport {
    /// Returns true if every step completed.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Ordered post-processing steps for one resource kind.
#[derive(Debug, Default)]
pub struct PostProcessingPipeline {
    steps: Vec<Box<dyn ArtifactStep>>,
    stats: Arc<CompressionStats>,
}

impl PostProcessingPipeline {
    /// Creates an empty pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the pipeline for UTF-8 artifacts of `kind`.
    ///
    /// A stage is included only when both its master switch and the kind's
    /// policy enable it.
    pub fn for_kind(
        kind: ResourceKind,
        policy: &ArtifactPolicy,
        enable_minify: bool,
        enable_compress: bool,
    ) -> Self {
        Self::for_kind_in(Charset::default(), kind, policy, enable_minify, enable_compress)
    }

    /// Builds the pipeline for artifacts of `kind` encoded in `charset`.
    pub fn for_kind_in(
        charset: Charset,
        kind: ResourceKind,
        policy: &ArtifactPolicy,
        enable_minify: bool,
        enable_compress: bool,
    ) -> Self {
        let mut pipeline = Self::new();
        if enable_minify && policy.minify {
            pipeline = pipeline.with_step(MinifyStep::new(kind).with_charset(charset));
        }
        if enable_compress && policy.compress {
            let step = GzipStep::new(policy.compression_level, Arc::clone(&pipeline.stats));
            pipeline = pipeline.with_step(step);
        }
        pipeline
    }

    /// Adds a step, keeping byte-encoding steps after text steps.
    #[must_use]
    pub fn with_step(mut self, step: impl ArtifactStep + 'static) -> Self {
        let step: Box<dyn ArtifactStep> = Box::new(step);
        if step.encodes_bytes() {
            self.steps.push(step);
        } else {
            let at = self
                .steps
                .iter()
                .position(|s| s.encodes_bytes())
                .unwrap_or(self.steps.len());
            self.steps.insert(at, step);
        }
        self
    }

    /// Returns the step names in execution order.
    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Returns true if the pipeline has no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Returns the compression statistics of this pipeline's gzip stage.
    pub fn compression_stats(&self) -> CompressionStatsSnapshot {
        self.stats.snapshot()
    }

    /// Runs every step against the artifact at `path`.
    ///
    /// A failing step is logged and skipped; the artifact keeps whatever the
    /// previous step wrote.
    pub fn run(&self, store: &dyn ResourceStore, path: &str) -> PipelineReport {
        let mut report = PipelineReport::default();
        for step in &self.steps {
            let start = Instant::now();
            match step.apply(store, path) {
                Ok(()) => {
                    debug!(
                        step = step.name(),
                        path = %path,
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        "post-processed artifact"
                    );
                    report.applied.push(step.name());
                }
                Err(e) => {
                    error!(step = step.name(), path = %path, error = %e, "post-processing step failed");
                    report.failed.push(step.name());
                }
            }
        }
        report
    }
}
