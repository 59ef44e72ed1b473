//! Gzip encoding for generated artifacts.
//!
//! Provides configurable compression levels and statistics so the share of
//! bytes saved by the compression step can be reported.

use crate::{Result, StorageError};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::sync::atomic::{AtomicU64, Ordering};

/// Compression level configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionLevel {
    /// Store only, no compression.
    None,
    /// Fast compression (lower ratio).
    Fast,
    /// Balanced compression.
    #[default]
    Default,
    /// Best compression (slower, higher ratio).
    Best,
}

impl CompressionLevel {
    /// Converts to a flate2 compression level.
    pub fn to_flate2(self) -> flate2::Compression {
        match self {
            CompressionLevel::None => flate2::Compression::none(),
            CompressionLevel::Fast => flate2::Compression::fast(),
            CompressionLevel::Default => flate2::Compression::default(),
            CompressionLevel::Best => flate2::Compression::best(),
        }
    }
}

/// Gzip-encodes `data`.
pub fn gzip(data: &[u8], level: CompressionLevel) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::with_capacity(data.len() / 2), level.to_flate2());
    encoder
        .write_all(data)
        .map_err(|e| StorageError::Compression(e.to_string()))?;
    encoder
        .finish()
        .map_err(|e| StorageError::Compression(e.to_string()))
}

/// Decodes a gzip stream produced by [`gzip`].
pub fn gunzip(data: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = GzDecoder::new(data);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(|e| StorageError::Compression(e.to_string()))?;
    Ok(out)
}

/// Compression statistics.
#[derive(Debug, Default)]
pub struct CompressionStats {
    input_bytes: AtomicU64,
    output_bytes: AtomicU64,
    compress_count: AtomicU64,
}

impl CompressionStats {
    /// Creates new compression stats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a compression operation.
    pub fn record_compress(&self, input_size: u64, output_size: u64) {
        self.input_bytes.fetch_add(input_size, Ordering::Relaxed);
        self.output_bytes.fetch_add(output_size, Ordering::Relaxed);
        self.compress_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns a snapshot of the stats.
    pub fn snapshot(&self) -> CompressionStatsSnapshot {
        CompressionStatsSnapshot {
            input_bytes: self.input_bytes.load(Ordering::Relaxed),
            output_bytes: self.output_bytes.load(Ordering::Relaxed),
            compress_count: self.compress_count.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of compression statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CompressionStatsSnapshot {
    /// Bytes handed to the encoder.
    pub input_bytes: u64,
    /// Bytes written after encoding.
    pub output_bytes: u64,
    /// Artifacts compressed.
    pub compress_count: u64,
}

impl CompressionStatsSnapshot {
    /// Returns the compression ratio (output/input).
    pub fn compression_ratio(&self) -> f64 {
        if self.input_bytes == 0 {
            1.0
        } else {
            self.output_bytes as f64 / self.input_bytes as f64
        }
    }

    /// Returns the fraction of bytes saved.
    pub fn space_savings(&self) -> f64 {
        1.0 - self.compression_ratio()
    }
}
