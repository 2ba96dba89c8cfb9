//! Lossless entropy coding
//!
//! The last stage of the encoder is a general-purpose byte-stream compressor
//! treated as a black box. The only contract is an exact round trip:
//!
//! ```text
//! decompress(compress(x)) == x      for every x, including []
//! ```
//!
//! [`DeflateCompressor`] implements it with raw DEFLATE via `flate2`.

use std::io::{Read, Write};

use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use flate2::Compression;

use crate::error::CodecError;

/// Highest DEFLATE level.
pub const BEST_LEVEL: u32 = 9;

/// A lossless byte-stream compressor.
pub trait EntropyCompressor {
    /// Compress `data` into an opaque artifact.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Compression`] if the stream cannot be written or
    /// finalized.
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>, CodecError>;

    /// Recover the exact bytes passed to [`compress`](Self::compress).
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Decompression`] if `artifact` is malformed.
    fn decompress(&self, artifact: &[u8]) -> Result<Vec<u8>, CodecError>;

    /// Compress the concatenation of `parts`.
    ///
    /// The default joins the parts first; streaming implementations override
    /// it to feed them one at a time.
    ///
    /// # Errors
    ///
    /// Same as [`compress`](Self::compress).
    fn compress_parts(&self, parts: &[&[u8]]) -> Result<Vec<u8>, CodecError> {
        self.compress(&parts.concat())
    }

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

/// Raw DEFLATE stream compressor (no zlib/gzip framing).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeflateCompressor {
    level: u32,
}

impl DeflateCompressor {
    /// Create a compressor at `level` (0 = store, 9 = best). Higher values
    /// are capped at 9.
    #[must_use]
    pub fn new(level: u32) -> Self {
        Self {
            level: level.min(BEST_LEVEL),
        }
    }

    #[inline]
    pub fn level(&self) -> u32 {
        self.level
    }
}

impl Default for DeflateCompressor {
    fn default() -> Self {
        Self::new(BEST_LEVEL)
    }
}

impl EntropyCompressor for DeflateCompressor {
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>, CodecError> {
        self.compress_parts(&[data])
    }

    fn compress_parts(&self, parts: &[&[u8]]) -> Result<Vec<u8>, CodecError> {
        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::new(self.level));
        for part in parts {
            encoder.write_all(part).map_err(CodecError::Compression)?;
        }
        encoder.finish().map_err(CodecError::Compression)
    }

    fn decompress(&self, artifact: &[u8]) -> Result<Vec<u8>, CodecError> {
        let mut out = Vec::new();
        DeflateDecoder::new(artifact)
            .read_to_end(&mut out)
            .map_err(CodecError::Decompression)?;
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "deflate"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_roundtrip() {
        let c = DeflateCompressor::default();
        let artifact = c.compress(&[]).unwrap();
        assert!(!artifact.is_empty());
        assert!(c.decompress(&artifact).unwrap().is_empty());
    }

    #[test]
    fn test_zeros_compress_well() {
        let c = DeflateCompressor::default();
        let data = vec![0u8; 64 * 1024];
        let artifact = c.compress(&data).unwrap();
        assert!(artifact.len() < data.len() / 100, "got {}", artifact.len());
        assert_eq!(c.decompress(&artifact).unwrap(), data);
    }

    #[test]
    fn test_parts_equal_concatenation() {
        let c = DeflateCompressor::new(6);
        let a = vec![1u8; 300];
        let b: Vec<u8> = (0..=255).collect();
        let whole = [a.clone(), b.clone()].concat();
        let artifact = c.compress_parts(&[a.as_slice(), b.as_slice()]).unwrap();
        assert_eq!(c.decompress(&artifact).unwrap(), whole);
    }

    #[test]
    fn test_level_capped() {
        assert_eq!(DeflateCompressor::new(42).level(), BEST_LEVEL);
        assert_eq!(DeflateCompressor::new(0).level(), 0);
    }

    #[test]
    fn test_store_level_roundtrip() {
        let c = DeflateCompressor::new(0);
        let data: Vec<u8> = (0..5000u32).map(|i| (i * 31 % 251) as u8).collect();
        assert_eq!(c.decompress(&c.compress(&data).unwrap()).unwrap(), data);
    }

    #[test]
    fn test_garbage_rejected() {
        let c = DeflateCompressor::default();
        // BTYPE = 11 is reserved in DEFLATE.
        let err = c.decompress(&[0xff, 0xff, 0xff, 0xff]);
        assert!(matches!(err, Err(CodecError::Decompression(_))));
    }
}
