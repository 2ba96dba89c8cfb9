//! yuvdelta: YUV 4:2:0 + temporal delta + DEFLATE raw video codec
//!
//! > "Most of a frame is the frame before it."
//!
//! Compresses a stream of interleaved RGB24 frames by throwing away chroma
//! resolution, replacing every frame after the first with its difference to
//! the previous one, and handing the mostly-zero result to a lossless entropy
//! coder. Decoding reverses the last two stages exactly; only the color stage
//! is lossy.
//!
//! # Architecture
//!
//! ```text
//! RGB24 → YUV 4:2:0 → Temporal Delta → DEFLATE → artifact
//!                          │
//!                          └→ RLE (size statistic only)
//!
//! artifact → INFLATE → Prefix Sum → YUV 4:2:0 → RGB24
//! ```
//!
//! # Example
//!
//! ```rust
//! use std::io::Cursor;
//! use yuvdelta::{Dimensions, Pipeline, PipelineConfig};
//!
//! let dims = Dimensions::new(4, 2).unwrap();
//! let pipeline = Pipeline::new(PipelineConfig::new(dims));
//!
//! // Two identical grey frames.
//! let raw = vec![128u8; dims.raw_len() * 2];
//! let frames = pipeline.ingest(Cursor::new(raw)).unwrap();
//! let encoded = pipeline.encode(&frames).unwrap();
//!
//! let decoded = pipeline.decode_rgb(&encoded.artifact).unwrap();
//! assert_eq!(decoded.len(), 2);
//! ```

pub mod color;
pub mod delta;
pub mod entropy;
pub mod error;
pub mod frame;
pub mod metrics;
pub mod pipeline;
pub mod rle;
pub mod source;

// Re-exports
pub use color::{rgb_to_yuv420, yuv420_to_rgb};
pub use delta::{forward_delta, inverse_delta, inverse_delta_parallel};
pub use entropy::{DeflateCompressor, EntropyCompressor};
pub use error::CodecError;
pub use frame::{DeltaFrame, Dimensions, PlanarFrame, Plane, RawFrame};
pub use metrics::{psnr, SizeReport};
pub use pipeline::{
    EncodedVideo, Pipeline, PipelineConfig, PipelineOutputs, PipelineReport, DEFAULT_FRAME_RATE,
};
pub use source::FrameSource;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default frame width (pixels)
pub const DEFAULT_WIDTH: u32 = 384;

/// Default frame height (pixels)
pub const DEFAULT_HEIGHT: u32 = 216;
