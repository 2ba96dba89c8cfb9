//! Error types for yuvdelta
//!
//! All public APIs that can fail return `Result<T, CodecError>`. Running out
//! of input is not an error: [`FrameSource`](crate::source::FrameSource)
//! simply stops yielding frames.

use std::io;

use thiserror::Error;

/// Errors that can occur while reading, transforming, compressing or writing
/// frames.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Width or height is zero or odd. 4:2:0 subsampling needs 2x2 blocks.
    #[error("invalid dimensions: {width}x{height} (both must be even and non-zero)")]
    InvalidDimensions { width: u32, height: u32 },

    /// Dimensions overflow `usize` when multiplied together.
    #[error("dimensions overflow usize")]
    DimensionOverflow,

    /// A buffer length does not match what the dimensions require.
    #[error("buffer size mismatch: expected {expected}, got {got}")]
    InvalidBufferSize { expected: usize, got: usize },

    /// A serialized run-length stream is malformed.
    #[error("invalid run-length stream: {0}")]
    InvalidRunLength(String),

    /// The entropy compressor failed to write or finalize its stream.
    #[error("compression failed: {0}")]
    Compression(#[source] io::Error),

    /// The entropy compressor could not decode the artifact.
    #[error("decompression failed: {0}")]
    Decompression(#[source] io::Error),

    /// Any other read or write failure on an input or output.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = CodecError::InvalidDimensions { width: 3, height: 4 };
        assert_eq!(
            err.to_string(),
            "invalid dimensions: 3x4 (both must be even and non-zero)"
        );

        let err = CodecError::InvalidBufferSize { expected: 12, got: 7 };
        assert_eq!(err.to_string(), "buffer size mismatch: expected 12, got 7");
    }

    #[test]
    fn test_io_conversion() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "nope");
        let err: CodecError = io_err.into();
        assert!(matches!(err, CodecError::Io(_)));
    }
}
