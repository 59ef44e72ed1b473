//! # WPO Types
//!
//! Shared vocabulary for the web page optimizer: the kinds of resources that
//! can be aggregated, the references a page makes to them, and the
//! deterministic naming of merged artifacts.
//!
//! ## Example
//!
//! ```rust
//! use wpo_types::{artifact_path, BuildMode, ResourceKind, ResourceReferenceSet};
//!
//! let a: ResourceReferenceSet = ["/js/a.js", "/js/b.js"].into_iter().collect();
//! let b: ResourceReferenceSet = ["/js/b.js", "/js/a.js"].into_iter().collect();
//!
//! let kind = ResourceKind::Script;
//! assert_eq!(
//!     artifact_path(kind.default_directory(), BuildMode::Static, kind, &a),
//!     artifact_path(kind.default_directory(), BuildMode::Static, kind, &b),
//! );
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod artifact;
pub mod kind;
pub mod reference;

pub use artifact::{artifact_path, BuildMode, Fingerprint};
pub use kind::ResourceKind;
pub use reference::{ResourceReference, ResourceReferenceSet};
