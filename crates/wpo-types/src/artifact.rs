//! Merged artifact naming.
//!
//! An artifact's path is a pure function of the kind, the build mode and
//! the membership of its reference set:
//! `{directory}/Opt_{static|servlet}_{fingerprint}.{ext}`.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

use crate::{ResourceKind, ResourceReferenceSet};

/// How merged artifacts are served.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    /// Written as static files under the deployment root.
    #[default]
    Static,
    /// Reserved for artifacts served on demand; only the naming exists.
    Servlet,
}

impl BuildMode {
    /// Returns the filename prefix for artifacts built in this mode.
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Static => "Opt_static_",
            Self::Servlet => "Opt_servlet_",
        }
    }
}

/// A stable, order-independent digest of a reference set's membership.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 16]);

impl Fingerprint {
    /// The length of a fingerprint in bytes.
    pub const LEN: usize = 16;

    /// Computes the fingerprint of a reference set.
    #[must_use]
    pub fn of(set: &ResourceReferenceSet) -> Self {
        let mut hasher = Sha256::new();
        for member in set.canonical_members() {
            hasher.update((member.len() as u64).to_le_bytes());
            hasher.update(member.as_bytes());
        }
        let digest = hasher.finalize();
        let mut bytes = [0u8; Self::LEN];
        bytes.copy_from_slice(&digest[..Self::LEN]);
        Self(bytes)
    }

    /// Returns the raw bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Returns the hex representation.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", self.to_hex())
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Returns the web-root-relative output path of the artifact merging `set`.
///
/// `directory` is normalised to start with a single `/` and to carry no
/// trailing slash.
#[must_use]
pub fn artifact_path(
    directory: &str,
    mode: BuildMode,
    kind: ResourceKind,
    set: &ResourceReferenceSet,
) -> String {
    let directory = directory.trim().trim_matches('/');
    let fingerprint = Fingerprint::of(set);
    if directory.is_empty() {
        format!("/{}{}.{}", mode.prefix(), fingerprint, kind.extension())
    } else {
        format!(
            "/{}/{}{}.{}",
            directory,
            mode.prefix(),
            fingerprint,
            kind.extension()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_fingerprint_order_independent() {
        let a = ResourceReferenceSet::new(["a.js", "b.js", "c.js"]);
        let b = ResourceReferenceSet::new(["c.js", "a.js", "b.js"]);
        assert_eq!(Fingerprint::of(&a), Fingerprint::of(&b));
    }

    #[test]
    fn test_fingerprint_no_concatenation_ambiguity() {
        let a = ResourceReferenceSet::new(["ab", "c"]);
        let b = ResourceReferenceSet::new(["a", "bc"]);
        assert_ne!(Fingerprint::of(&a), Fingerprint::of(&b));
    }

    #[test]
    fn test_artifact_path_shape() {
        let set = ResourceReferenceSet::new(["a.js", "b.js"]);
        let path = artifact_path("/js", BuildMode::Static, ResourceKind::Script, &set);
        let expected = format!("/js/Opt_static_{}.js", Fingerprint::of(&set));
        assert_eq!(path, expected);
        assert_eq!(path.len(), "/js/Opt_static_".len() + 32 + ".js".len());
    }

    #[test]
    fn test_artifact_path_servlet_style() {
        let set = ResourceReferenceSet::new(["/style/a.css"]);
        let path = artifact_path("style/", BuildMode::Servlet, ResourceKind::Style, &set);
        assert!(path.starts_with("/style/Opt_servlet_"));
        assert!(path.ends_with(".css"));
    }

    #[test]
    fn test_artifact_path_root_directory() {
        let set = ResourceReferenceSet::new(["a.js"]);
        let path = artifact_path("/", BuildMode::Static, ResourceKind::Script, &set);
        assert!(path.starts_with("/Opt_static_"));
    }
}
