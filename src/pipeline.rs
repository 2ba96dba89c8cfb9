//! End-to-end encode/decode pipeline
//!
//! Wires together frame ingestion, color conversion, temporal deltas and
//! entropy coding into a single API, then runs the inverse to reconstruct the
//! video.
//!
//! # Pipeline
//!
//! ```text
//! Encode: RGB frames -> YUV 4:2:0 -> [planar artifact] -> Delta -> (RLE stats) -> DEFLATE -> bytes
//! Decode: bytes -> INFLATE -> Prefix sum -> [decoded planar] -> RGB frames
//! ```
//!
//! The whole sequence is held in memory. Peak usage is roughly two to three
//! times the raw input size (input frames, planar/delta buffers and the
//! artifact coexist).

use std::io::{Read, Write};

use tracing::{debug, info};

use crate::color::{forward_sequence, inverse_sequence};
use crate::delta::{forward_delta, inverse_delta_parallel};
use crate::entropy::{DeflateCompressor, EntropyCompressor, BEST_LEVEL};
use crate::error::CodecError;
use crate::frame::{total_len, DeltaFrame, Dimensions, PlanarFrame, RawFrame};
use crate::metrics::{psnr_frames, SizeReport};
use crate::rle;
use crate::source::FrameSource;

// ── Configuration ──────────────────────────────────────────────

/// Frame rate assumed for playback hints.
pub const DEFAULT_FRAME_RATE: u32 = 25;

/// Pipeline settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Resolution of every frame in the input.
    pub dimensions: Dimensions,
    /// DEFLATE level, 0-9.
    pub compression_level: u32,
    /// Threads used by the data-parallel stages. Output does not depend on it.
    pub workers: usize,
    /// Only used for playback hints; frames carry no timing.
    pub frame_rate: u32,
}

impl PipelineConfig {
    /// Defaults with the given resolution.
    #[must_use]
    pub fn new(dimensions: Dimensions) -> Self {
        Self {
            dimensions,
            ..Self::default()
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            dimensions: Dimensions::default(),
            compression_level: BEST_LEVEL,
            workers: 1,
            frame_rate: DEFAULT_FRAME_RATE,
        }
    }
}

// ── Outputs & reports ──────────────────────────────────────────

/// Sinks written by [`Pipeline::run`].
pub struct PipelineOutputs<'a> {
    /// Planar YUV 4:2:0 frames after forward color conversion.
    pub planar: &'a mut dyn Write,
    /// Planar frames rebuilt from the artifact, before inverse color.
    pub decoded_planar: Option<&'a mut dyn Write>,
    /// Reconstructed RGB24 frames.
    pub reconstructed: &'a mut dyn Write,
}

/// Result of [`Pipeline::encode`].
#[derive(Clone, Debug)]
pub struct EncodedVideo {
    /// Entropy-coded concatenation of all delta frames.
    pub artifact: Vec<u8>,
    /// Number of frames in the artifact.
    pub frames: usize,
    /// Stage sizes; `rle` is the diagnostic run-length size.
    pub sizes: SizeReport,
}

/// Summary of a full [`Pipeline::run`].
#[derive(Clone, Copy, Debug)]
pub struct PipelineReport {
    pub frames: usize,
    pub sizes: SizeReport,
    /// Reconstruction quality against the input, in dB.
    pub psnr: f64,
}

fn write_frames<T: AsRef<[u8]>>(sink: &mut dyn Write, frames: &[T]) -> Result<(), CodecError> {
    for frame in frames {
        sink.write_all(frame.as_ref())?;
    }
    sink.flush()?;
    Ok(())
}

/// Keyframe bytes plus run-length size of every delta frame.
fn rle_size(deltas: &[DeltaFrame]) -> usize {
    let mut iter = deltas.iter();
    let keyframe = iter.next().map_or(0, DeltaFrame::len);
    keyframe + iter.map(|d| rle::encoded_len(d.as_bytes())).sum::<usize>()
}

// ── Pipeline ───────────────────────────────────────────────────

/// Raw video encoder/decoder.
pub struct Pipeline<C = DeflateCompressor> {
    config: PipelineConfig,
    compressor: C,
}

impl Pipeline<DeflateCompressor> {
    /// Create a pipeline using DEFLATE at `config.compression_level`.
    #[must_use]
    pub fn new(config: PipelineConfig) -> Self {
        let compressor = DeflateCompressor::new(config.compression_level);
        Self::with_compressor(config, compressor)
    }
}

impl<C: EntropyCompressor> Pipeline<C> {
    /// Create a pipeline with an explicit entropy coder.
    #[must_use]
    pub fn with_compressor(mut config: PipelineConfig, compressor: C) -> Self {
        config.workers = config.workers.max(1);
        Self { config, compressor }
    }

    #[inline]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    #[inline]
    pub fn compressor(&self) -> &C {
        &self.compressor
    }

    /// Read every complete frame from `input`.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Io`] if reading fails.
    pub fn ingest<R: Read>(&self, input: R) -> Result<Vec<RawFrame>, CodecError> {
        let frames = FrameSource::new(input, self.config.dimensions).read_all()?;
        debug!(frames = frames.len(), dims = %self.config.dimensions, "ingested");
        Ok(frames)
    }

    fn check_dimensions(&self, dims: Dimensions) -> Result<(), CodecError> {
        if dims == self.config.dimensions {
            Ok(())
        } else {
            Err(CodecError::InvalidDimensions {
                width: dims.width(),
                height: dims.height(),
            })
        }
    }

    /// Forward color conversion of a whole sequence.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::InvalidDimensions`] if a frame's resolution
    /// differs from the configured one.
    pub fn to_planar(&self, frames: &[RawFrame]) -> Result<Vec<PlanarFrame>, CodecError> {
        for frame in frames {
            self.check_dimensions(frame.dimensions())?;
        }
        Ok(forward_sequence(frames, self.config.workers))
    }

    /// Delta-code and entropy-code planar frames.
    ///
    /// Returns the artifact and the diagnostic run-length size.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::InvalidDimensions`] for a foreign resolution and
    /// [`CodecError::Compression`] if the entropy coder fails.
    pub fn compress_planar(
        &self,
        planar: Vec<PlanarFrame>,
    ) -> Result<(Vec<u8>, usize), CodecError> {
        for frame in &planar {
            self.check_dimensions(frame.dimensions())?;
        }

        let deltas = forward_delta(planar)?;
        let rle = rle_size(&deltas);
        debug!(frames = deltas.len(), rle, "delta coded");

        let parts: Vec<&[u8]> = deltas.iter().map(DeltaFrame::as_bytes).collect();
        let artifact = self.compressor.compress_parts(&parts)?;
        debug!(
            compressor = self.compressor.name(),
            bytes = artifact.len(),
            "entropy coded"
        );
        Ok((artifact, rle))
    }

    /// Encode RGB frames into a compressed artifact.
    ///
    /// # Errors
    ///
    /// See [`to_planar`](Self::to_planar) and
    /// [`compress_planar`](Self::compress_planar).
    pub fn encode(&self, frames: &[RawFrame]) -> Result<EncodedVideo, CodecError> {
        let raw = total_len(frames);
        let planar = self.to_planar(frames)?;
        let planar_size = total_len(&planar);
        let (artifact, rle) = self.compress_planar(planar)?;

        Ok(EncodedVideo {
            frames: frames.len(),
            sizes: SizeReport {
                raw,
                planar: planar_size,
                rle,
                compressed: artifact.len(),
            },
            artifact,
        })
    }

    /// Decompress an artifact and undo the temporal deltas.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Decompression`] for a malformed artifact and
    /// [`CodecError::InvalidBufferSize`] if its decoded length is not a whole
    /// number of planar frames.
    pub fn decode(&self, artifact: &[u8]) -> Result<Vec<PlanarFrame>, CodecError> {
        let dims = self.config.dimensions;
        let frame_len = dims.planar_len();
        let bytes = self.compressor.decompress(artifact)?;

        if bytes.len() % frame_len != 0 {
            return Err(CodecError::InvalidBufferSize {
                expected: (bytes.len() / frame_len + 1) * frame_len,
                got: bytes.len(),
            });
        }

        let deltas = bytes
            .chunks_exact(frame_len)
            .map(|chunk| DeltaFrame::new(chunk.to_vec(), dims))
            .collect::<Result<Vec<_>, _>>()?;
        drop(bytes);

        let planar = inverse_delta_parallel(deltas, self.config.workers)?;
        debug!(frames = planar.len(), "delta decoded");
        Ok(planar)
    }

    /// Inverse color conversion of a whole sequence.
    #[must_use]
    pub fn to_rgb(&self, planar: &[PlanarFrame]) -> Vec<RawFrame> {
        inverse_sequence(planar, self.config.workers)
    }

    /// Decode an artifact all the way back to RGB frames.
    ///
    /// # Errors
    ///
    /// See [`decode`](Self::decode).
    pub fn decode_rgb(&self, artifact: &[u8]) -> Result<Vec<RawFrame>, CodecError> {
        let planar = self.decode(artifact)?;
        Ok(self.to_rgb(&planar))
    }

    /// Run the full round trip: ingest, encode, report, decode, write.
    ///
    /// # Errors
    ///
    /// Any [`CodecError`] from a stage or from writing an output aborts the
    /// run.
    pub fn run<R: Read>(
        &self,
        input: R,
        outputs: &mut PipelineOutputs<'_>,
    ) -> Result<PipelineReport, CodecError> {
        let frames = self.ingest(input)?;
        let mut sizes = SizeReport {
            raw: total_len(&frames),
            ..SizeReport::default()
        };
        info!(frames = frames.len(), "raw size: {} bytes", sizes.raw);

        let planar = self.to_planar(&frames)?;
        sizes.planar = total_len(&planar);
        write_frames(outputs.planar, &planar)?;
        info!(
            "yuv420p size: {} bytes ({:.2}% of raw)",
            sizes.planar,
            sizes.percent_of_raw(sizes.planar)
        );

        let (artifact, rle) = self.compress_planar(planar)?;
        sizes.rle = rle;
        sizes.compressed = artifact.len();
        info!(
            "rle size: {} bytes ({:.2}% of raw)",
            sizes.rle,
            sizes.percent_of_raw(sizes.rle)
        );
        info!(
            "{} size: {} bytes ({:.2}% of raw)",
            self.compressor.name(),
            sizes.compressed,
            sizes.percent_of_raw(sizes.compressed)
        );

        let decoded = self.decode(&artifact)?;
        drop(artifact);
        if let Some(sink) = outputs.decoded_planar.as_deref_mut() {
            write_frames(sink, &decoded)?;
        }

        let reconstructed = self.to_rgb(&decoded);
        drop(decoded);
        write_frames(outputs.reconstructed, &reconstructed)?;

        let psnr = psnr_frames(&frames, &reconstructed)?;
        info!(frames = reconstructed.len(), "reconstruction psnr: {psnr:.2} dB");

        Ok(PipelineReport {
            frames: frames.len(),
            sizes,
            psnr,
        })
    }
}

// ── Thread-safety compile-time assertions ──────────────────────

const _: () = {
    const fn assert_send_sync<T: Send + Sync>() {}
    #[allow(dead_code)]
    const fn check() {
        assert_send_sync::<Pipeline>();
        assert_send_sync::<PipelineConfig>();
        assert_send_sync::<EncodedVideo>();
        assert_send_sync::<CodecError>();
    }
};

// ── Tests ──────────────────────────────────────────────────────
