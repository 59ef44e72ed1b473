//! Resource references and reference sets.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::{Fingerprint, ResourceKind};

/// A single reference to a resource, as extracted from markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceReference {
    /// The resource identifier, usually a web-root-relative path.
    pub id: String,
    /// The declared media type (`type` attribute), if any.
    pub media_type: Option<String>,
    /// The declared relation (`rel` attribute), if any.
    pub rel: Option<String>,
    /// Whether the element opted out of optimization.
    pub opt_out: bool,
}

impl ResourceReference {
    /// Creates a reference with no declared media type.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            media_type: None,
            rel: None,
            opt_out: false,
        }
    }

    /// Sets the declared media type.
    #[must_use]
    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = Some(media_type.into());
        self
    }

    /// Sets the declared relation.
    #[must_use]
    pub fn with_rel(mut self, rel: impl Into<String>) -> Self {
        self.rel = Some(rel.into());
        self
    }

    /// Marks the reference as opted out.
    #[must_use]
    pub fn opted_out(mut self) -> Self {
        self.opt_out = true;
        self
    }

    /// Returns whether this reference may be merged by an aggregator of `kind`.
    ///
    /// Exclusion keywords are applied separately by the caller.
    #[must_use]
    pub fn is_mergeable_as(&self, kind: ResourceKind) -> bool {
        !self.opt_out
            && !self.id.trim().is_empty()
            && kind.accepts_media_type(self.media_type.as_deref(), self.rel.as_deref())
    }
}

/// An immutable, deduplicated collection of resource identifiers.
///
/// Members keep their discovery order for merging, but equality and hashing
/// only consider membership: two sets built from the same identifiers in a
/// different order are the same cache key.
#[derive(Clone)]
pub struct ResourceReferenceSet {
    members: Arc<[String]>,
    sorted: Arc<[String]>,
}

impl ResourceReferenceSet {
    /// Builds a set from identifiers in discovery order, dropping duplicates.
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let members: Vec<String> = ids
            .into_iter()
            .map(Into::into)
            .filter(|id| seen.insert(id.clone()))
            .collect();

        let mut sorted = members.clone();
        sorted.sort_unstable();

        Self {
            members: members.into(),
            sorted: sorted.into(),
        }
    }

    /// Returns the members in discovery order.
    #[must_use]
    pub fn members(&self) -> &[String] {
        &self.members
    }

    /// Returns the members in a canonical, order-independent order.
    #[must_use]
    pub fn canonical_members(&self) -> &[String] {
        &self.sorted
    }

    /// Returns the number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns true if the set has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Returns true if `id` is a member.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.sorted
            .binary_search_by(|m| m.as_str().cmp(id))
            .is_ok()
    }

    /// Iterates over the members in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(String::as_str)
    }

    /// Returns the order-independent fingerprint of the membership.
    #[must_use]
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::of(self)
    }
}

impl Default for ResourceReferenceSet {
    fn default() -> Self {
        Self::new(std::iter::empty::<String>())
    }
}

impl PartialEq for ResourceReferenceSet {
    fn eq(&self, other: &Self) -> bool {
        self.sorted == other.sorted
    }
}

impl Eq for ResourceReferenceSet {}

impl Hash for ResourceReferenceSet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.sorted.hash(state);
    }
}

impl std::fmt::Debug for ResourceReferenceSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.members.iter()).finish()
    }
}

impl<S: Into<String>> FromIterator<S> for ResourceReferenceSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl Serialize for ResourceReferenceSet {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.members.as_ref().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ResourceReferenceSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let members = Vec::<String>::deserialize(deserializer)?;
        Ok(Self::new(members))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    #[test]
    fn test_dedup_keeps_first_occurrence() {
        let set = ResourceReferenceSet::new(["b.js", "a.js", "b.js", "c.js"]);
        assert_eq!(set.members(), &["b.js", "a.js", "c.js"]);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_equality_ignores_order() {
        let a = ResourceReferenceSet::new(["a.js", "b.js"]);
        let b = ResourceReferenceSet::new(["b.js", "a.js"]);
        assert_eq!(a, b);

        let mut map = HashMap::new();
        map.insert(a, 1);
        assert_eq!(map.get(&b), Some(&1));
    }

    #[test]
    fn test_different_membership_not_equal() {
        let a = ResourceReferenceSet::new(["a.js", "b.js"]);
        let b = ResourceReferenceSet::new(["a.js", "b.js", "c.js"]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_contains() {
        let set = ResourceReferenceSet::new(["/js/x.js", "/js/a.js"]);
        assert!(set.contains("/js/a.js"));
        assert!(!set.contains("/js/b.js"));
    }

    #[test]
    fn test_reference_mergeable() {
        let r = ResourceReference::new("/js/a.js").with_media_type("text/javascript");
        assert!(r.is_mergeable_as(ResourceKind::Script));
        assert!(!r.is_mergeable_as(ResourceKind::Style));
        assert!(!r.clone().opted_out().is_mergeable_as(ResourceKind::Script));
        assert!(!ResourceReference::new("  ").is_mergeable_as(ResourceKind::Script));
    }

    #[test]
    fn test_serde_keeps_discovery_order() {
        let set = ResourceReferenceSet::new(["b.js", "a.js"]);
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"["b.js","a.js"]"#);
        let back: ResourceReferenceSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back.members(), set.members());
    }
}
