//! Temporal delta prediction
//!
//! Frame 0 is the keyframe and is stored as-is. Every later frame is stored as
//! its byte-wise wrapping difference to the frame before it:
//!
//! ```text
//! forward:  d[0] = f[0]            d[i] = f[i] - f[i-1]   (mod 256)
//! inverse:  f[0] = d[0]            f[i] = f[i-1] + d[i]   (mod 256)
//! ```
//!
//! Reconstruction is a prefix sum over the delta sequence. [`scan_in_place`]
//! is that prefix sum for any combine step; with modulo-256 addition every
//! byte offset is its own independent scan, which is what
//! [`inverse_delta_parallel`] splits across threads.

use std::thread;

use crate::error::CodecError;
use crate::frame::{DeltaFrame, PlanarFrame};

/// Inclusive prefix scan: `items[i] = combine(items[i-1], items[i])` for
/// `i = 1..len`, in increasing order, each step seeing the already combined
/// predecessor.
pub fn scan_in_place<T, F>(items: &mut [T], mut combine: F)
where
    F: FnMut(&T, &mut T),
{
    for i in 1..items.len() {
        let (done, rest) = items.split_at_mut(i);
        combine(&done[i - 1], &mut rest[0]);
    }
}

/// `acc[j] += delta[j]` with wrapping.
#[inline]
pub fn add_wrapping(acc: &mut [u8], delta: &[u8]) {
    for (a, &d) in acc.iter_mut().zip(delta) {
        *a = a.wrapping_add(d);
    }
}

/// `cur[j] -= prev[j]` with wrapping.
#[inline]
pub fn sub_wrapping(cur: &mut [u8], prev: &[u8]) {
    for (c, &p) in cur.iter_mut().zip(prev) {
        *c = c.wrapping_sub(p);
    }
}

fn check_uniform(mut lens: impl Iterator<Item = usize>) -> Result<(), CodecError> {
    let Some(expected) = lens.next() else {
        return Ok(());
    };
    match lens.find(|&len| len != expected) {
        Some(got) => Err(CodecError::InvalidBufferSize { expected, got }),
        None => Ok(()),
    }
}

/// Replace every frame after the first with its difference to the original
/// predecessor.
///
/// Runs in place from the last frame down so that each predecessor is still
/// unmodified when it is read.
///
/// # Errors
///
/// Returns [`CodecError::InvalidBufferSize`] if the frames differ in length.
pub fn forward_delta(mut frames: Vec<PlanarFrame>) -> Result<Vec<DeltaFrame>, CodecError> {
    check_uniform(frames.iter().map(PlanarFrame::len))?;

    for i in (1..frames.len()).rev() {
        let (before, current) = frames.split_at_mut(i);
        sub_wrapping(current[0].bytes_mut(), before[i - 1].as_bytes());
    }

    Ok(frames.into_iter().map(DeltaFrame::from_planar).collect())
}

/// Rebuild planar frames from a delta sequence by cumulative addition.
///
/// # Errors
///
/// Returns [`CodecError::InvalidBufferSize`] if the frames differ in length.
pub fn inverse_delta(mut deltas: Vec<DeltaFrame>) -> Result<Vec<PlanarFrame>, CodecError> {
    check_uniform(deltas.iter().map(DeltaFrame::len))?;

    scan_in_place(&mut deltas, |prev, cur| {
        add_wrapping(cur.bytes_mut(), prev.as_bytes());
    });

    Ok(deltas.into_iter().map(DeltaFrame::into_planar).collect())
}

/// [`inverse_delta`] with the byte range split into `workers` column bands,
/// each scanned on its own thread. Output is identical to the sequential
/// version.
///
/// # Errors
///
/// Returns [`CodecError::InvalidBufferSize`] if the frames differ in length.
pub fn inverse_delta_parallel(
    mut deltas: Vec<DeltaFrame>,
    workers: usize,
) -> Result<Vec<PlanarFrame>, CodecError> {
    check_uniform(deltas.iter().map(DeltaFrame::len))?;

    let frame_len = deltas.first().map_or(0, DeltaFrame::len);
    if workers <= 1 || deltas.len() < 2 || frame_len == 0 {
        return inverse_delta(deltas);
    }

    let band = frame_len.div_ceil(workers);
    let n_bands = frame_len.div_ceil(band);

    // bands[k][i] is column band k of frame i.
    let mut bands: Vec<Vec<&mut [u8]>> = (0..n_bands)
        .map(|_| Vec::with_capacity(deltas.len()))
        .collect();
    for frame in &mut deltas {
        for (k, column) in frame.bytes_mut().chunks_mut(band).enumerate() {
            bands[k].push(column);
        }
    }

    thread::scope(|s| {
        for column in &mut bands {
            s.spawn(move || {
                scan_in_place(column, |prev, cur| add_wrapping(cur, prev));
            });
        }
    });
    drop(bands);

    Ok(deltas.into_iter().map(DeltaFrame::into_planar).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Dimensions;

    fn planar(dims: Dimensions, fill: impl Fn(usize) -> u8) -> PlanarFrame {
        let data = (0..dims.planar_len()).map(fill).collect();
        PlanarFrame::new(data, dims).unwrap()
    }

    fn dims() -> Dimensions {
        Dimensions::new(2, 2).unwrap()
    }

    #[test]
    fn test_single_frame_unchanged() {
        let f = planar(dims(), |i| i as u8 * 40);
        let deltas = forward_delta(vec![f.clone()]).unwrap();
        assert_eq!(deltas.len(), 1);
        assert_eq!(deltas[0].as_bytes(), f.as_bytes());
    }

    #[test]
    fn test_empty_sequence() {
        assert!(forward_delta(Vec::new()).unwrap().is_empty());
        assert!(inverse_delta(Vec::new()).unwrap().is_empty());
        assert!(inverse_delta_parallel(Vec::new(), 4).unwrap().is_empty());
    }

    #[test]
    fn test_identical_frames_give_zero_delta() {
        let f = planar(dims(), |i| 200 - i as u8);
        let deltas = forward_delta(vec![f.clone(), f.clone()]).unwrap();
        assert_eq!(deltas[0].as_bytes(), f.as_bytes());
        assert!(deltas[1].as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_wrapping_not_saturating() {
        let a = PlanarFrame::new(vec![250, 5, 0, 255, 128, 1], dims()).unwrap();
        let b = PlanarFrame::new(vec![4, 250, 255, 0, 128, 0], dims()).unwrap();
        let deltas = forward_delta(vec![a.clone(), b.clone()]).unwrap();
        // 4 - 250 = -246 = 10 (mod 256), 250 - 5 = 245, 255 - 0, 0 - 255 = 1
        assert_eq!(deltas[1].as_bytes(), &[10, 245, 255, 1, 0, 255]);

        let back = inverse_delta(deltas).unwrap();
        assert_eq!(back, vec![a, b]);
    }

    #[test]
    fn test_delta_uses_original_predecessor() {
        let f0 = PlanarFrame::new(vec![10; 6], dims()).unwrap();
        let f1 = PlanarFrame::new(vec![30; 6], dims()).unwrap();
        let f2 = PlanarFrame::new(vec![35; 6], dims()).unwrap();
        let deltas = forward_delta(vec![f0, f1, f2]).unwrap();
        assert_eq!(deltas[1].as_bytes(), &[20; 6]);
        // Against the original f1 (30), not against the delta (20).
        assert_eq!(deltas[2].as_bytes(), &[5; 6]);
    }

    #[test]
    fn test_inverse_is_prefix_sum() {
        let deltas = vec![
            DeltaFrame::new(vec![1; 6], dims()).unwrap(),
            DeltaFrame::new(vec![2; 6], dims()).unwrap(),
            DeltaFrame::new(vec![3; 6], dims()).unwrap(),
            DeltaFrame::new(vec![255; 6], dims()).unwrap(),
        ];
        let frames = inverse_delta(deltas).unwrap();
        let firsts: Vec<u8> = frames.iter().map(|f| f.as_bytes()[0]).collect();
        assert_eq!(firsts, vec![1, 3, 6, 5]);
    }

    #[test]
    fn test_mismatched_lengths_rejected() {
        let small = planar(dims(), |_| 0);
        let big = planar(Dimensions::new(4, 2).unwrap(), |_| 0);
        assert!(matches!(
            forward_delta(vec![small, big]),
            Err(CodecError::InvalidBufferSize { expected: 6, got: 12 })
        ));
    }

    #[test]
    fn test_scan_in_place_generic() {
        let mut xs = [1u32, 2, 3, 4, 5];
        scan_in_place(&mut xs, |prev, cur| *cur += *prev);
        assert_eq!(xs, [1, 3, 6, 10, 15]);

        let mut empty: [u32; 0] = [];
        scan_in_place(&mut empty, |prev, cur| *cur += *prev);
    }

    #[test]
    fn test_parallel_inverse_matches_sequential() {
        let dims = Dimensions::new(6, 4).unwrap();
        let frames: Vec<PlanarFrame> = (0..9u8)
            .map(|t| planar(dims, |i| (i as u8).wrapping_mul(7).wrapping_add(t * t)))
            .collect();
        let deltas = forward_delta(frames.clone()).unwrap();

        for workers in [1, 2, 5, 64] {
            let back = inverse_delta_parallel(deltas.clone(), workers).unwrap();
            assert_eq!(back, frames, "workers = {workers}");
        }
    }
}
