//! Text encodings for source resources and artifacts.
//!
//! Sources are decoded into Rust strings before merging and minifying, and
//! the results are encoded back with the same charset, so a deployment whose
//! files are all GBK or Latin-1 gets GBK or Latin-1 artifacts.

use crate::{Result, StorageError};
use encoding_rs::Encoding;
use std::fmt;

/// A text encoding that resources can be both read and written in.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Charset(&'static Encoding);

impl Charset {
    /// Resolves a charset label such as `UTF-8`, `gbk` or `ISO-8859-1`.
    ///
    /// Labels are matched case-insensitively, ignoring surrounding
    /// whitespace. Returns `None` for unknown labels and for encodings that
    /// cannot be written back, such as UTF-16.
    pub fn for_label(label: &str) -> Option<Self> {
        let encoding = Encoding::for_label(label.trim().as_bytes())?;
        (encoding.output_encoding() == encoding).then_some(Self(encoding))
    }

    /// Returns the canonical name of the encoding.
    pub fn name(self) -> &'static str {
        self.0.name()
    }

    /// Decodes `bytes` read from `path`. A leading byte order mark is
    /// dropped; malformed input is an error.
    pub fn decode(self, path: &str, bytes: &[u8]) -> Result<String> {
        let (text, malformed) = self.0.decode_with_bom_removal(bytes);
        if malformed {
            return Err(StorageError::Encoding {
                path: path.to_string(),
                charset: self.name(),
            });
        }
        Ok(text.into_owned())
    }

    /// Encodes `text` for writing to `path`. Characters the encoding cannot
    /// represent are an error.
    pub fn encode(self, path: &str, text: &str) -> Result<Vec<u8>> {
        let (bytes, _, unmappable) = self.0.encode(text);
        if unmappable {
            return Err(StorageError::Encoding {
                path: path.to_string(),
                charset: self.name(),
            });
        }
        Ok(bytes.into_owned())
    }
}

impl Default for Charset {
    fn default() -> Self {
        Self(encoding_rs::UTF_8)
    }
}

impl fmt::Debug for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Charset({})", self.name())
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
