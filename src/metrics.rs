//! Size and quality metrics.
//!
//! [`SizeReport`] tracks the byte size after each pipeline stage relative to
//! the raw input. [`mse`] / [`psnr`] measure how far a reconstruction drifted
//! from the original.

use core::fmt;

use crate::error::CodecError;

/// Byte sizes observed after each stage. Purely observational.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SizeReport {
    /// Interleaved RGB24 input.
    pub raw: usize,
    /// Planar YUV 4:2:0 after color conversion.
    pub planar: usize,
    /// Keyframe plus run-length coded deltas (diagnostic only).
    pub rle: usize,
    /// Entropy-coded artifact.
    pub compressed: usize,
}

impl SizeReport {
    /// `size` as a percentage of the raw size. `0.0` when the input was empty.
    #[must_use]
    pub fn percent_of_raw(&self, size: usize) -> f64 {
        if self.raw == 0 {
            0.0
        } else {
            100.0 * size as f64 / self.raw as f64
        }
    }

    /// Raw size divided by compressed size (`0.0` for an empty artifact).
    #[must_use]
    pub fn compression_ratio(&self) -> f64 {
        if self.compressed == 0 {
            0.0
        } else {
            self.raw as f64 / self.compressed as f64
        }
    }
}

impl fmt::Display for SizeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "raw {} B, yuv420p {} B ({:.2}%), rle {} B ({:.2}%), compressed {} B ({:.2}%)",
            self.raw,
            self.planar,
            self.percent_of_raw(self.planar),
            self.rle,
            self.percent_of_raw(self.rle),
            self.compressed,
            self.percent_of_raw(self.compressed),
        )
    }
}

fn squared_error(a: &[u8], b: &[u8]) -> Result<f64, CodecError> {
    if a.len() != b.len() {
        return Err(CodecError::InvalidBufferSize {
            expected: a.len(),
            got: b.len(),
        });
    }
    Ok(a
        .iter()
        .zip(b.iter())
        .map(|(&x, &y)| {
            let diff = f64::from(x) - f64::from(y);
            diff * diff
        })
        .sum())
}

fn psnr_from_mse(mse: f64) -> f64 {
    if mse == 0.0 {
        f64::INFINITY
    } else {
        10.0 * (255.0_f64 * 255.0 / mse).log10()
    }
}

/// Compute MSE (Mean Squared Error) between two byte buffers.
///
/// Returns `0.0` for empty buffers.
///
/// # Errors
///
/// Returns [`CodecError::InvalidBufferSize`] if `a` and `b` have different lengths.
#[inline]
pub fn mse(a: &[u8], b: &[u8]) -> Result<f64, CodecError> {
    let sum = squared_error(a, b)?;
    if a.is_empty() {
        return Ok(0.0);
    }
    Ok(sum / a.len() as f64)
}

/// Compute PSNR (Peak Signal-to-Noise Ratio) between two byte buffers.
///
/// Returns `f64::INFINITY` when the buffers are identical (MSE = 0) or empty.
///
/// # Errors
///
/// Returns [`CodecError::InvalidBufferSize`] if `a` and `b` have different lengths.
///
/// # Example
///
/// ```
/// use yuvdelta::metrics::psnr;
///
/// let original = [100u8, 150, 200];
/// let decoded  = [101u8, 149, 198];
/// let db = psnr(&original, &decoded).unwrap();
/// assert!(db > 30.0);
/// ```
#[inline]
pub fn psnr(a: &[u8], b: &[u8]) -> Result<f64, CodecError> {
    Ok(psnr_from_mse(mse(a, b)?))
}

/// PSNR over two frame sequences taken as one continuous buffer.
///
/// # Errors
///
/// Returns [`CodecError::InvalidBufferSize`] if the sequences differ in frame
/// count or any pair of frames differs in length.
pub fn psnr_frames<T: AsRef<[u8]>>(original: &[T], decoded: &[T]) -> Result<f64, CodecError> {
    if original.len() != decoded.len() {
        return Err(CodecError::InvalidBufferSize {
            expected: original.len(),
            got: decoded.len(),
        });
    }
    let mut sum = 0.0;
    let mut count = 0usize;
    for (a, b) in original.iter().zip(decoded) {
        sum += squared_error(a.as_ref(), b.as_ref())?;
        count += a.as_ref().len();
    }
    if count == 0 {
        return Ok(f64::INFINITY);
    }
    Ok(psnr_from_mse(sum / count as f64))
}
