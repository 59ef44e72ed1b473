//! Optimizer configuration.
//!
//! Values come from an optional file (TOML, YAML or JSON, by extension)
//! overlaid with `WPO_`-prefixed environment variables. Nested keys use a
//! double underscore: `WPO_SCRIPT__COMPRESS=true`.

use crate::{OptimizeError, Result};
use ::config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use wpo_storage::{ArtifactPolicy, Charset};
use wpo_types::{BuildMode, ResourceKind};

/// Configuration for a [`PageOptimizer`](crate::PageOptimizer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// When false, markup passes through untouched.
    pub enabled: bool,
    /// Comma-separated substrings; matching references are never merged.
    pub exclude: String,
    /// Text encoding of source resources and artifacts, as a WHATWG label
    /// such as `UTF-8`, `GBK` or `ISO-8859-1`.
    pub charset: String,
    /// Master switch for minification.
    pub minify: bool,
    /// Master switch for gzip compression.
    pub compress: bool,
    /// Cache optimized page bodies.
    pub cache: bool,
    /// Name artifacts for servlet delivery instead of static files.
    pub use_servlet: bool,
    /// Deployment context path, prepended to emitted artifact references.
    pub context_path: String,
    /// Policy for script artifacts.
    pub script: ArtifactPolicy,
    /// Policy for style artifacts.
    pub style: ArtifactPolicy,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            exclude: String::new(),
            charset: "UTF-8".to_string(),
            minify: true,
            compress: false,
            cache: true,
            use_servlet: false,
            context_path: String::new(),
            script: default_policy(ResourceKind::Script),
            style: default_policy(ResourceKind::Style),
        }
    }
}

fn default_policy(kind: ResourceKind) -> ArtifactPolicy {
    ArtifactPolicy {
        directory: Some(kind.default_directory().to_string()),
        ..ArtifactPolicy::default()
    }
}

impl OptimizerConfig {
    /// Loads configuration from `path` (if given) and the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_from(path, None)
    }

    /// Loads configuration with an explicit environment map in place of the
    /// process environment.
    pub fn load_from(
        path: Option<&Path>,
        env: Option<::config::Map<String, String>>,
    ) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }
        builder = builder.add_source(
            Environment::with_prefix("WPO")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(env),
        );

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values the type system cannot.
    pub fn validate(&self) -> Result<()> {
        self.charset().map(|_| ())
    }

    /// Resolves the configured charset label.
    pub fn charset(&self) -> Result<Charset> {
        Charset::for_label(&self.charset)
            .ok_or_else(|| OptimizeError::UnsupportedCharset(self.charset.clone()))
    }

    /// Returns the exclusion keywords, trimmed, with blanks dropped.
    pub fn exclude_keywords(&self) -> Vec<String> {
        self.exclude
            .split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Returns the artifact policy for `kind`.
    pub fn policy(&self, kind: ResourceKind) -> &ArtifactPolicy {
        match kind {
            ResourceKind::Script => &self.script,
            ResourceKind::Style => &self.style,
        }
    }

    /// Returns the artifact naming mode.
    pub fn build_mode(&self) -> BuildMode {
        if self.use_servlet {
            BuildMode::Servlet
        } else {
            BuildMode::Static
        }
    }

    /// Returns the context path without a trailing slash.
    pub fn context_prefix(&self) -> &str {
        self.context_path.trim().trim_end_matches('/')
    }
}
