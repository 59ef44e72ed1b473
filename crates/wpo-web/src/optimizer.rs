//! End-to-end page optimization.

use crate::body_cache::{PageKey, RenderedBodyCache};
use crate::markup::TagScanner;
use crate::{OptimizerConfig, Result};
use std::borrow::Cow;
use std::sync::Arc;
use tracing::error;
use wpo_storage::{CacheStats, MergeCache, PostProcessingPipeline, ResourceStore};
use wpo_types::{ResourceKind, ResourceReferenceSet};

/// Character some template layouts inject after their tags.
const TOGGLE_CHAR: char = '\0';

/// Replaces toggle characters with spaces.
pub fn scrub_toggle_chars(markup: &str) -> Cow<'_, str> {
    if markup.contains(TOGGLE_CHAR) {
        Cow::Owned(markup.replace(TOGGLE_CHAR, " "))
    } else {
        Cow::Borrowed(markup)
    }
}

/// Rewrites page fragments so their scripts and style sheets load from one
/// merged artifact per kind.
///
/// All caches are owned by the optimizer; share it between request
/// handlers behind an [`Arc`].
pub struct PageOptimizer<S: ResourceStore + ?Sized> {
    config: OptimizerConfig,
    scanner: TagScanner,
    scripts: MergeCache<Arc<S>>,
    styles: MergeCache<Arc<S>>,
    bodies: RenderedBodyCache,
}

impl<S: ResourceStore + ?Sized> PageOptimizer<S> {
    /// Creates an optimizer reading sources from and writing artifacts to
    /// `store`.
    pub fn new(config: OptimizerConfig, store: Arc<S>) -> Result<Self> {
        let charset = config.charset()?;
        let cache = |kind: ResourceKind| {
            let policy = config.policy(kind);
            MergeCache::new(
                Arc::clone(&store),
                kind,
                config.build_mode(),
                policy.directory(kind),
                PostProcessingPipeline::for_kind_in(
                    charset,
                    kind,
                    policy,
                    config.minify,
                    config.compress,
                ),
            )
            .with_charset(charset)
        };
        let scripts = cache(ResourceKind::Script);
        let styles = cache(ResourceKind::Style);

        Ok(Self {
            scanner: TagScanner::new(config.exclude_keywords()),
            scripts,
            styles,
            bodies: RenderedBodyCache::new(),
            config,
        })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Returns the merge cache for `kind`.
    pub fn merge_cache(&self, kind: ResourceKind) -> &MergeCache<Arc<S>> {
        match kind {
            ResourceKind::Script => &self.scripts,
            ResourceKind::Style => &self.styles,
        }
    }

    /// Returns merge cache statistics for `kind`.
    pub fn merge_stats(&self, kind: ResourceKind) -> CacheStats {
        self.merge_cache(kind).stats()
    }

    /// Returns the rendered-body cache.
    pub fn body_cache(&self) -> &RenderedBodyCache {
        &self.bodies
    }

    /// Optimizes the `kind` references of the page at `route`.
    ///
    /// Never fails: if anything goes wrong the scrubbed original markup is
    /// returned. Blank markup and failed optimizations are not cached.
    pub fn optimize_page(&self, kind: ResourceKind, route: &str, markup: &str) -> String {
        if !self.config.enabled {
            return markup.to_string();
        }

        let markup = scrub_toggle_chars(markup);
        if markup.trim().is_empty() {
            return markup.into_owned();
        }

        let result = if self.config.cache {
            let key = PageKey::new(kind, route);
            self.bodies
                .get_or_render(&key, || self.try_optimize(kind, &markup))
        } else {
            self.try_optimize(kind, &markup)
        };

        match result {
            Ok(body) => body,
            Err(e) => {
                error!(kind = %kind, route = %route, error = %e, "cannot generate optimized body, serving original");
                markup.into_owned()
            }
        }
    }

    /// Optimizes `markup` without the rendered-body cache, reporting errors.
    pub fn try_optimize(&self, kind: ResourceKind, markup: &str) -> Result<String> {
        let markup = scrub_toggle_chars(markup);
        let tags = self.scanner.scan(kind, &markup)?;

        let set: ResourceReferenceSet = tags
            .iter()
            .filter(|t| t.eligible)
            .map(|t| t.reference.id.clone())
            .collect();
        if set.is_empty() {
            return Ok(markup.into_owned());
        }

        let path = self.merge_cache(kind).get_or_build_artifact_path(&set)?;
        let src = format!("{}{}", self.config.context_prefix(), path);
        Ok(TagScanner::rewrite(kind, &markup, &tags, &src))
    }
}
