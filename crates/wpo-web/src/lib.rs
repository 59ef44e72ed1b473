//! Page markup optimization for wpo.
//!
//! A [`PageOptimizer`] takes the rendered markup of a page fragment, finds
//! the `script` or `link` elements it can merge, builds (once) the merged
//! artifact for that set of references and returns markup that loads the
//! artifact instead. Any failure along the way serves the original markup.
//!
//! ```
//! use std::sync::Arc;
//! use wpo_storage::MemoryResourceStore;
//! use wpo_types::ResourceKind;
//! use wpo_web::{OptimizerConfig, PageOptimizer};
//!
//! let store = MemoryResourceStore::new();
//! store.insert("/js/a.js", "var a = 1;");
//! store.insert("/js/b.js", "var b = 2;");
//!
//! let optimizer = PageOptimizer::new(OptimizerConfig::default(), Arc::new(store)).unwrap();
//! let page = r#"<script src="/js/a.js"></script><script src="/js/b.js"></script>"#;
//! let out = optimizer.optimize_page(ResourceKind::Script, "/index", page);
//! assert!(out.starts_with(r#"<script type="text/javascript" src="/js/Opt_static_"#));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod body_cache;
pub mod config;
mod error;
pub mod markup;
pub mod optimizer;

pub use body_cache::{PageKey, RenderedBodyCache};
pub use crate::config::OptimizerConfig;
pub use error::{OptimizeError, Result};
pub use markup::{merged_element, ScannedTag, TagScanner};
pub use optimizer::{scrub_toggle_chars, PageOptimizer};
