//! Resource store traits.
//!
//! Defines the read/write abstraction the merger and post-processing steps
//! work against, so the deployment root can be a real directory or an
//! in-memory map.

use crate::{Charset, Result};
use std::sync::Arc;

/// Trait for stores holding source resources and generated artifacts.
///
/// Paths are web-root-relative identifiers such as `/js/app.js`.
pub trait ResourceStore: Send + Sync {
    /// Reads the full contents of a resource.
    fn read(&self, path: &str) -> Result<Vec<u8>>;

    /// Creates or overwrites a resource.
    fn write(&self, path: &str, contents: &[u8]) -> Result<()>;

    /// Checks if a resource exists.
    fn exists(&self, path: &str) -> Result<bool>;

    /// Reads a resource as UTF-8 text.
    fn read_to_string(&self, path: &str) -> Result<String> {
        self.read_text(path, Charset::default())
    }

    /// Reads a resource as text in `charset`.
    fn read_text(&self, path: &str, charset: Charset) -> Result<String> {
        charset.decode(path, &self.read(path)?)
    }

    /// Writes `text` encoded in `charset`.
    fn write_text(&self, path: &str, text: &str, charset: Charset) -> Result<()> {
        self.write(path, &charset.encode(path, text)?)
    }
}

impl<T: ResourceStore + ?Sized> ResourceStore for Arc<T> {
    fn read(&self, path: &str) -> Result<Vec<u8>> {
        (**self).read(path)
    }

    fn write(&self, path: &str, contents: &[u8]) -> Result<()> {
        (**self).write(path, contents)
    }

    fn exists(&self, path: &str) -> Result<bool> {
        (**self).exists(path)
    }

    fn read_to_string(&self, path: &str) -> Result<String> {
        (**self).read_to_string(path)
    }
}

impl<T: ResourceStore + ?Sized> ResourceStore for &T {
    fn read(&self, path: &str) -> Result<Vec<u8>> {
        (**self).read(path)
    }

    fn write(&self, path: &str, contents: &[u8]) -> Result<()> {
        (**self).write(path, contents)
    }

    fn exists(&self, path: &str) -> Result<bool> {
        (**self).exists(path)
    }

    fn read_to_string(&self, path: &str) -> Result<String> {
        (**self).read_to_string(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StorageError;

    struct FixedStore(&'static [u8]);

    impl ResourceStore for FixedStore {
        fn read(&self, _path: &str) -> Result<Vec<u8>> {
            Ok(self.0.to_vec())
        }

        fn write(&self, _path: &str, _contents: &[u8]) -> Result<()> {
            Ok(())
        }

        fn exists(&self, _path: &str) -> Result<bool> {
            Ok(true)
        }
    }

    #[test]
    fn test_read_to_string_default() {
        let store = FixedStore(b"var a;");
        assert_eq!(store.read_to_string("/a.js").unwrap(), "var a;");
    }

    #[test]
    fn test_read_to_string_rejects_invalid_utf8() {
        let store = FixedStore(&[0xff, 0xfe]);
        let err = store.read_to_string("/bad.js").unwrap_err();
        assert!(matches!(err, StorageError::Encoding { ref path, .. } if path == "/bad.js"));
    }

    #[test]
    fn test_read_text_in_charset() {
        let store = FixedStore(b"s = '\xe9t\xe9';");
        let latin1 = Charset::for_label("ISO-8859-1").unwrap();
        assert_eq!(store.read_text("/a.js", latin1).unwrap(), "s = '\u{e9}t\u{e9}';");
        assert!(store.read_to_string("/a.js").is_err());
    }

    #[test]
    fn test_arc_dyn_store() {
        let store: Arc<dyn ResourceStore> = Arc::new(FixedStore(b"x"));
        assert!(store.exists("/x").unwrap());
        assert_eq!(store.read("/x").unwrap(), b"x");
    }
}
