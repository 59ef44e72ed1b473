//! Concatenation of reference-set members into a single artifact.

use crate::{Charset, ResourceStore, Result};
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, warn};
use wpo_types::ResourceReferenceSet;

/// Outcome of a single merge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    /// Web-root-relative path of the written artifact.
    pub path: String,
    /// Members whose content made it into the artifact, in discovery order.
    pub merged: Vec<String>,
    /// Members that could not be read and were omitted.
    pub skipped: Vec<String>,
    /// Size of the written artifact in bytes.
    pub bytes: usize,
}

/// Reads the members of a reference set and writes their concatenation.
#[derive(Debug, Clone)]
pub struct ArtifactMerger<S> {
    store: S,
    charset: Charset,
}

impl<S: ResourceStore> ArtifactMerger<S> {
    /// Creates a merger reading from and writing to `store` in UTF-8.
    pub fn new(store: S) -> Self {
        Self {
            store,
            charset: Charset::default(),
        }
    }

    /// Reads members and writes the artifact in `charset`.
    #[must_use]
    pub fn with_charset(mut self, charset: Charset) -> Self {
        self.charset = charset;
        self
    }

    /// Returns the charset members are read and written in.
    pub fn charset(&self) -> Charset {
        self.charset
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Merges `set` into `output_path`.
    ///
    /// Every line of every readable member is written followed by `\n`, so
    /// members are always separated by a line terminator. A member that
    /// cannot be read is logged and left out. Only the final write can fail
    /// the merge.
    pub fn merge(&self, set: &ResourceReferenceSet, output_path: &str) -> Result<MergeReport> {
        let start = Instant::now();
        let mut content = String::new();
        let mut merged = Vec::with_capacity(set.len());
        let mut skipped = Vec::new();

        for member in set.iter() {
            match self.store.read_text(member, self.charset) {
                Ok(text) => {
                    for line in text.lines() {
                        content.push_str(line);
                        content.push('\n');
                    }
                    merged.push(member.to_string());
                }
                Err(e) => {
                    warn!(member = %member, error = %e, "omitting unreadable resource from merge");
                    skipped.push(member.to_string());
                }
            }
        }

        let encoded = self.charset.encode(output_path, &content)?;
        self.store.write(output_path, &encoded)?;

        debug!(
            path = %output_path,
            members = merged.len(),
            skipped = skipped.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "merged resources"
        );

        Ok(MergeReport {
            path: output_path.to_string(),
            merged,
            skipped,
            bytes: encoded.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemoryResourceStore, StorageError};
    use pretty_assertions::assert_eq;

    fn store() -> MemoryResourceStore {
        let store = MemoryResourceStore::new();
        store.insert("/js/a.js", "var a = 1;");
        store.insert("/js/b.js", "var b = 2;\r\nvar c = 3;\n");
        store
    }

    #[test]
    fn test_merge_concatenates_in_discovery_order() {
        let merger = ArtifactMerger::new(store());
        let set = ResourceReferenceSet::new(["/js/b.js", "/js/a.js"]);

        let report = merger.merge(&set, "/js/out.js").unwrap();

        let written = merger.store().get("/js/out.js").unwrap();
        assert_eq!(
            String::from_utf8(written).unwrap(),
            "var b = 2;\nvar c = 3;\nvar a = 1;\n"
        );
        assert_eq!(report.merged, vec!["/js/b.js", "/js/a.js"]);
        assert!(report.skipped.is_empty());
        assert_eq!(report.bytes, 33);
    }

    #[test]
    fn test_merge_skips_unreadable_member() {
        let merger = ArtifactMerger::new(store());
        let set = ResourceReferenceSet::new(["/js/a.js", "/js/missing.js", "/js/b.js"]);

        let report = merger.merge(&set, "/js/out.js").unwrap();

        assert_eq!(report.skipped, vec!["/js/missing.js"]);
        assert_eq!(report.merged, vec!["/js/a.js", "/js/b.js"]);
        assert_eq!(
            merger.store().get("/js/out.js").unwrap(),
            b"var a = 1;\nvar b = 2;\nvar c = 3;\n"
        );
    }

    #[test]
    fn test_merge_skips_non_utf8_member() {
        let store = store();
        store.insert("/js/latin1.js", vec![0x76, 0x61, 0x72, 0xe9]);
        let merger = ArtifactMerger::new(store);
        let set = ResourceReferenceSet::new(["/js/latin1.js", "/js/a.js"]);

        let report = merger.merge(&set, "/js/out.js").unwrap();
        assert_eq!(report.skipped, vec!["/js/latin1.js"]);
    }

    #[test]
    fn test_merge_in_configured_charset() {
        let store = MemoryResourceStore::new();
        // "var s = '中文';" in GBK
        store.insert("/js/zh.js", b"var s = '\xd6\xd0\xce\xc4';\r\n".to_vec());
        store.insert("/js/a.js", "var a = 1;");
        let gbk = Charset::for_label("GBK").unwrap();
        let merger = ArtifactMerger::new(store).with_charset(gbk);
        let set = ResourceReferenceSet::new(["/js/zh.js", "/js/a.js"]);

        let report = merger.merge(&set, "/js/out.js").unwrap();

        assert!(report.skipped.is_empty());
        let written = merger.store().get("/js/out.js").unwrap();
        assert_eq!(written, b"var s = '\xd6\xd0\xce\xc4';\nvar a = 1;\n");
        assert_eq!(report.bytes, written.len());
        assert_eq!(
            merger.store().read_text("/js/out.js", gbk).unwrap(),
            "var s = '中文';\nvar a = 1;\n"
        );
    }

    #[test]
    fn test_merge_write_failure_propagates() {
        let store = store();
        store.set_read_only(true);
        let merger = ArtifactMerger::new(store);
        let set = ResourceReferenceSet::new(["/js/a.js"]);

        let err = merger.merge(&set, "/js/out.js").unwrap_err();
        assert!(matches!(err, StorageError::Write { .. }));
    }

    #[test]
    fn test_report_serializes() {
        let merger = ArtifactMerger::new(store());
        let set = ResourceReferenceSet::new(["/js/a.js"]);
        let report = merger.merge(&set, "/js/out.js").unwrap();

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["path"], "/js/out.js");
        assert_eq!(json["bytes"], 11);
    }
}
