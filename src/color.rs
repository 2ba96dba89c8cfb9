//! RGB ↔ YUV 4:2:0 Color Space Conversion
//!
//! Lossy conversion between interleaved RGB24 and planar YUV 4:2:0.
//!
//! # Transform
//!
//! ```text
//! RGB → YUV (Forward):
//!   Y =  0.299 R + 0.587 G + 0.114  B
//!   U = -0.169 R - 0.331 G + 0.449  B + 128
//!   V =  0.499 R - 0.418 G - 0.0813 B + 128
//!
//! YUV → RGB (Inverse):
//!   R = Y + 1.402 (V - 128)
//!   G = Y - 0.344 (U - 128) - 0.714 (V - 128)
//!   B = Y + 1.772 (U - 128)
//! ```
//!
//! # Subsampling
//!
//! ```text
//! +---------+---------+        Y plane keeps every sample.
//! | Y00 u v | Y01 u v |
//! +---------+---------+  -->   U and V planes keep one sample per 2x2
//! | Y10 u v | Y11 u v |        block: the mean of the four unrounded
//! +---------+---------+        values, truncated after averaging.
//! ```
//!
//! The inverse replicates each stored chroma sample to the four pixels of its
//! block.
//!
//! # Properties
//!
//! - **Lossy**: Y, U and V are truncated to 8 bits and chroma is averaged
//! - **Half size**: a planar frame is `w * h * 3 / 2` bytes
//! - **Data-parallel**: frames are independent, so sequences can be converted
//!   on several threads with identical output

use std::thread;

use crate::frame::{Dimensions, PlanarFrame, RawFrame};

/// YUV pixel before truncation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Yuv {
    pub y: f64,
    pub u: f64,
    pub v: f64,
}

/// RGB pixel (R, G, B components)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Create a new RGB pixel.
    #[must_use]
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Convert a single RGB pixel to full-precision YUV.
///
/// # Example
///
/// ```
/// use yuvdelta::color::{rgb_to_yuv_pixel, Rgb};
///
/// let yuv = rgb_to_yuv_pixel(Rgb::new(0, 0, 0));
/// assert_eq!((yuv.y, yuv.u, yuv.v), (0.0, 128.0, 128.0));
/// ```
#[must_use]
#[inline]
pub fn rgb_to_yuv_pixel(rgb: Rgb) -> Yuv {
    let r = f64::from(rgb.r);
    let g = f64::from(rgb.g);
    let b = f64::from(rgb.b);

    Yuv {
        y: 0.299 * r + 0.587 * g + 0.114 * b,
        u: -0.169 * r - 0.331 * g + 0.449 * b + 128.0,
        v: 0.499 * r - 0.418 * g - 0.0813 * b + 128.0,
    }
}

/// Convert stored 8-bit YUV samples back to RGB.
#[must_use]
#[inline]
pub fn yuv_to_rgb_pixel(y: u8, u: u8, v: u8) -> Rgb {
    let y = f64::from(y);
    let u = f64::from(u) - 128.0;
    let v = f64::from(v) - 128.0;

    Rgb {
        r: clamp_channel(y + 1.402 * v),
        g: clamp_channel(y - 0.344 * u - 0.714 * v),
        b: clamp_channel(y + 1.772 * u),
    }
}

/// Clamp to `[0, 255]`, then truncate to a byte.
#[must_use]
#[inline]
pub fn clamp_channel(value: f64) -> u8 {
    truncate(value.clamp(0.0, 255.0))
}

/// Drop the fractional part. Values above 255 saturate.
#[inline]
fn truncate(value: f64) -> u8 {
    value as u8
}

/// Downsample a full-resolution chroma plane into one byte per 2x2 block.
///
/// Each output sample is the mean of the four unrounded inputs, truncated
/// after averaging. `full` must hold `dims.pixels()` values and `out`
/// `dims.chroma_len()` bytes.
pub fn subsample_chroma(full: &[f64], dims: &Dimensions, out: &mut [u8]) {
    let w = dims.width() as usize;
    let h = dims.height() as usize;
    let cw = dims.chroma_width();
    debug_assert_eq!(full.len(), dims.pixels());
    debug_assert_eq!(out.len(), dims.chroma_len());

    for row in (0..h).step_by(2) {
        for col in (0..w).step_by(2) {
            let top = row * w + col;
            let bottom = top + w;
            let mean = (full[top] + full[top + 1] + full[bottom] + full[bottom + 1]) / 4.0;
            out[(row / 2) * cw + col / 2] = truncate(mean);
        }
    }
}

/// Convert one interleaved RGB24 frame to planar YUV 4:2:0.
#[must_use]
pub fn rgb_to_yuv420(frame: &RawFrame) -> PlanarFrame {
    let dims = frame.dimensions();
    let n = dims.pixels();

    let mut out = vec![0u8; dims.planar_len()];
    let mut u_full = vec![0f64; n];
    let mut v_full = vec![0f64; n];

    let (luma, chroma) = out.split_at_mut(dims.luma_len());
    for (i, px) in frame.as_bytes().chunks_exact(3).enumerate() {
        let yuv = rgb_to_yuv_pixel(Rgb::new(px[0], px[1], px[2]));
        luma[i] = truncate(yuv.y);
        u_full[i] = yuv.u;
        v_full[i] = yuv.v;
    }

    let (u_plane, v_plane) = chroma.split_at_mut(dims.chroma_len());
    subsample_chroma(&u_full, &dims, u_plane);
    subsample_chroma(&v_full, &dims, v_plane);

    PlanarFrame::from_transform(out, dims)
}

/// Convert one planar YUV 4:2:0 frame back to interleaved RGB24.
#[must_use]
pub fn yuv420_to_rgb(frame: &PlanarFrame) -> RawFrame {
    let dims = frame.dimensions();
    let w = dims.width() as usize;
    let h = dims.height() as usize;
    let cw = dims.chroma_width();

    let data = frame.as_bytes();
    let (luma, chroma) = data.split_at(dims.luma_len());
    let (u_plane, v_plane) = chroma.split_at(dims.chroma_len());

    let mut rgb = Vec::with_capacity(dims.raw_len());
    for row in 0..h {
        for col in 0..w {
            let c = (row / 2) * cw + col / 2;
            let px = yuv_to_rgb_pixel(luma[row * w + col], u_plane[c], v_plane[c]);
            rgb.extend_from_slice(&[px.r, px.g, px.b]);
        }
    }

    RawFrame::from_transform(rgb, dims)
}

/// Convert a whole sequence to planar YUV 4:2:0 using up to `workers` threads.
#[must_use]
pub fn forward_sequence(frames: &[RawFrame], workers: usize) -> Vec<PlanarFrame> {
    map_frames(frames, workers, rgb_to_yuv420)
}

/// Convert a whole planar sequence back to RGB24 using up to `workers` threads.
#[must_use]
pub fn inverse_sequence(frames: &[PlanarFrame], workers: usize) -> Vec<RawFrame> {
    map_frames(frames, workers, yuv420_to_rgb)
}

/// Order-preserving map over frames, split into contiguous chunks per worker.
fn map_frames<T, U, F>(frames: &[T], workers: usize, f: F) -> Vec<U>
where
    T: Sync,
    U: Send,
    F: Fn(&T) -> U + Sync,
{
    if workers <= 1 || frames.len() < 2 {
        return frames.iter().map(f).collect();
    }

    let chunk = frames.len().div_ceil(workers);
    let f = &f;
    thread::scope(|s| {
        let handles: Vec<_> = frames
            .chunks(chunk)
            .map(|part| s.spawn(move || part.iter().map(f).collect::<Vec<U>>()))
            .collect();

        let mut out = Vec::with_capacity(frames.len());
        for handle in handles {
            match handle.join() {
                Ok(part) => out.extend(part),
                Err(panic) => std::panic::resume_unwind(panic),
            }
        }
        out
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Plane;

    fn uniform_frame(w: u32, h: u32, px: [u8; 3]) -> RawFrame {
        let dims = Dimensions::new(w, h).unwrap();
        let data = px.repeat(dims.pixels());
        RawFrame::new(data, dims).unwrap()
    }

    #[test]
    fn test_uniform_block_exact_samples() {
        let frame = uniform_frame(2, 2, [100, 150, 50]);
        let planar = rgb_to_yuv420(&frame);

        // Y = 123.65, U = 83.9, V = 111.135 before truncation.
        assert_eq!(planar.plane(Plane::Y), &[123, 123, 123, 123]);
        assert_eq!(planar.plane(Plane::U), &[83]);
        assert_eq!(planar.plane(Plane::V), &[111]);
    }

    #[test]
    fn test_uniform_block_roundtrip() {
        let frame = uniform_frame(2, 2, [100, 150, 50]);
        let back = yuv420_to_rgb(&rgb_to_yuv420(&frame));

        for row in 0..2 {
            for col in 0..2 {
                let [r, g, b] = back.pixel(row, col);
                assert!((i16::from(r) - 100).abs() <= 1, "r = {r}");
                assert!((i16::from(g) - 150).abs() <= 1, "g = {g}");
                // 0.449 forward vs 1.772 inverse are not exact inverses,
                // so blue loses more than the truncation step.
                assert_eq!(b, 43);
            }
        }
    }

    #[test]
    fn test_black_roundtrip_exact() {
        let frame = uniform_frame(4, 2, [0, 0, 0]);
        let planar = rgb_to_yuv420(&frame);
        assert!(planar.plane(Plane::Y).iter().all(|&y| y == 0));
        assert!(planar.plane(Plane::U).iter().all(|&u| u == 128));
        assert!(planar.plane(Plane::V).iter().all(|&v| v == 128));
        assert_eq!(yuv420_to_rgb(&planar), frame);
    }

    #[test]
    fn test_planar_size_is_half() {
        let frame = uniform_frame(8, 4, [10, 20, 30]);
        let planar = rgb_to_yuv420(&frame);
        assert_eq!(planar.len() * 2, frame.len());
    }

    #[test]
    fn test_average_then_truncate() {
        let dims = Dimensions::new(2, 2).unwrap();
        let full = [83.9, 83.9, 84.9, 84.9];
        let mut out = [0u8; 1];
        subsample_chroma(&full, &dims, &mut out);
        // Truncating first would give (83 + 83 + 84 + 84) / 4 = 83.
        assert_eq!(out[0], 84);
    }

    #[test]
    fn test_subsample_block_order() {
        let dims = Dimensions::new(4, 4).unwrap();
        #[rustfmt::skip]
        let full = [
            10.0, 10.0, 20.0, 20.0,
            10.0, 10.0, 20.0, 20.0,
            30.0, 30.0, 40.0, 40.0,
            30.0, 30.0, 40.0, 40.0,
        ];
        let mut out = [0u8; 4];
        subsample_chroma(&full, &dims, &mut out);
        assert_eq!(out, [10, 20, 30, 40]);
    }

    #[test]
    fn test_chroma_replicated_per_block() {
        let dims = Dimensions::new(4, 2).unwrap();
        // Y plane (8) | U plane (2) | V plane (2)
        let mut data = vec![100u8; 8];
        data.extend_from_slice(&[128, 200]);
        data.extend_from_slice(&[128, 128]);
        let planar = PlanarFrame::new(data, dims).unwrap();

        let rgb = yuv420_to_rgb(&planar);
        for row in 0..2 {
            assert_eq!(rgb.pixel(row, 0), [100, 100, 100]);
            assert_eq!(rgb.pixel(row, 1), [100, 100, 100]);
            // u - 128 = 72: g = 100 - 24.768, b = 100 + 127.584
            assert_eq!(rgb.pixel(row, 2), [100, 75, 227]);
            assert_eq!(rgb.pixel(row, 3), [100, 75, 227]);
        }
    }

    #[test]
    fn test_clamp_channel() {
        assert_eq!(clamp_channel(300.7), 255);
        assert_eq!(clamp_channel(255.0), 255);
        assert_eq!(clamp_channel(254.9), 254);
        assert_eq!(clamp_channel(0.0), 0);
        assert_eq!(clamp_channel(-20.5), 0);
        assert_eq!(clamp_channel(12.99), 12);
    }

    #[test]
    fn test_inverse_clamps_out_of_range() {
        // r = 255 + 1.402 * 127 overflows.
        assert_eq!(yuv_to_rgb_pixel(255, 128, 255).r, 255);
        // b = 0 + 1.772 * -128 underflows.
        assert_eq!(yuv_to_rgb_pixel(0, 0, 128).b, 0);
        // g = 0 - 0.344 * 127 - 0.714 * 127 underflows.
        assert_eq!(yuv_to_rgb_pixel(0, 255, 255).g, 0);
    }

    #[test]
    fn test_grayscale_luma() {
        for v in (0..=250u8).step_by(10) {
            let yuv = rgb_to_yuv_pixel(Rgb::new(v, v, v));
            let expected = f64::from(v);
            assert!((yuv.y - expected).abs() < 1e-9, "gray {v}: y = {}", yuv.y);
        }
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let dims = Dimensions::new(4, 4).unwrap();
        let frames: Vec<RawFrame> = (0..7u8)
            .map(|t| {
                let data = (0..dims.raw_len())
                    .map(|i| (i as u8).wrapping_mul(13).wrapping_add(t * 31))
                    .collect();
                RawFrame::new(data, dims).unwrap()
            })
            .collect();

        let seq = forward_sequence(&frames, 1);
        let par = forward_sequence(&frames, 3);
        assert_eq!(seq, par);

        let back_seq = inverse_sequence(&seq, 1);
        let back_par = inverse_sequence(&seq, 4);
        assert_eq!(back_seq, back_par);
        assert_eq!(back_seq.len(), frames.len());
    }

    #[test]
    fn test_empty_sequence() {
        assert!(forward_sequence(&[], 4).is_empty());
        assert!(inverse_sequence(&[], 4).is_empty());
    }
}
