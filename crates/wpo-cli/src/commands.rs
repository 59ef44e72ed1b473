//! CLI command implementations.

use anyhow::{bail, Context, Result};
use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;
use std::sync::Arc;
use wpo_storage::{ArtifactMerger, FsResourceStore, PostProcessingPipeline};
use wpo_types::{artifact_path, ResourceKind, ResourceReferenceSet};
use wpo_web::{OptimizerConfig, PageOptimizer};

fn read_input(input: Option<&Path>) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    match input {
        Some(path) if path != Path::new("-") => {
            buf = fs::read(path).with_context(|| format!("cannot read {}", path.display()))?;
        }
        _ => {
            io::stdin().read_to_end(&mut buf).context("cannot read stdin")?;
        }
    }
    Ok(buf)
}

fn write_output(output: Option<&Path>, contents: &[u8]) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, contents).with_context(|| format!("cannot write {}", path.display()))
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(contents)?;
            stdout.flush()?;
            Ok(())
        }
    }
}

fn store_for(config: &OptimizerConfig, root: &Path) -> Result<FsResourceStore> {
    if !root.is_dir() {
        bail!("deployment root {} is not a directory", root.display());
    }
    Ok(FsResourceStore::new(root).with_context_path(config.context_prefix()))
}

/// Optimizes a page fragment for the given kinds, in order.
pub fn optimize(
    config: OptimizerConfig,
    root: &Path,
    kinds: &[ResourceKind],
    route: &str,
    input: Option<&Path>,
    output: Option<&Path>,
) -> Result<()> {
    let markup = String::from_utf8(read_input(input)?).context("page is not valid UTF-8")?;
    let store = store_for(&config, root)?;
    let optimizer = PageOptimizer::new(config, Arc::new(store))?;

    let mut page = markup;
    for &kind in kinds {
        page = optimizer.optimize_page(kind, route, &page);
        let stats = optimizer.merge_stats(kind);
        tracing::info!(kind = %kind, builds = stats.builds, failed = stats.failed_builds, "optimized page");
    }

    write_output(output, page.as_bytes())
}

/// Merges `members` into one artifact and prints its path or a JSON report.
pub fn merge(
    config: OptimizerConfig,
    root: &Path,
    kind: ResourceKind,
    members: Vec<String>,
    json: bool,
) -> Result<()> {
    let set = ResourceReferenceSet::new(members);
    if set.is_empty() {
        bail!("no resources to merge");
    }

    let store = store_for(&config, root)?;
    let charset = config.charset()?;
    let policy = config.policy(kind);
    let path = artifact_path(policy.directory(kind), config.build_mode(), kind, &set);

    let merger = ArtifactMerger::new(store).with_charset(charset);
    let report = merger.merge(&set, &path)?;
    let pipeline =
        PostProcessingPipeline::for_kind_in(charset, kind, policy, config.minify, config.compress);
    let steps = pipeline.run(merger.store(), &path);

    if json {
        let value = serde_json::json!({
            "artifact": report,
            "steps": steps,
            "compression": pipeline.compression_stats(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("{}{}", config.context_prefix(), report.path);
    }

    if !report.skipped.is_empty() {
        tracing::warn!(skipped = ?report.skipped, "some resources were left out of the merge");
    }
    Ok(())
}

/// Minifies a single file of the given kind.
pub fn minify(kind: ResourceKind, input: Option<&Path>, output: Option<&Path>) -> Result<()> {
    match kind {
        ResourceKind::Script => {
            let source = read_input(input)?;
            let mut minified = Vec::with_capacity(source.len());
            wpo_minify::minify_script(source.as_slice(), &mut minified)?;
            write_output(output, &minified)
        }
        ResourceKind::Style => {
            let source = String::from_utf8(read_input(input)?).context("style sheet is not valid UTF-8")?;
            let minified = wpo_minify::minify_style(&source)?;
            write_output(output, minified.as_bytes())
        }
    }
}
