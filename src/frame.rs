//! Typed frame buffers
//!
//! Every stage of the pipeline consumes one of these buffers and produces the
//! next, so each stage's input shape is checked by the type system:
//!
//! ```text
//! RawFrame (w*h*3, interleaved RGB)
//!    -> PlanarFrame (w*h*3/2, Y plane | U plane | V plane)
//!    -> DeltaFrame  (w*h*3/2, wrapping difference to the previous frame)
//! ```
//!
//! All buffers carry their [`Dimensions`], which are validated once and then
//! trusted by the transforms.

use crate::error::CodecError;
use crate::{DEFAULT_HEIGHT, DEFAULT_WIDTH};

/// Frame resolution in pixels.
///
/// Both sides must be non-zero and even: every chroma sample covers an
/// aligned 2x2 block of luma samples.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Dimensions {
    width: u32,
    height: u32,
    pixels: usize,
    raw_len: usize,
}

impl Dimensions {
    /// Validate and create a resolution.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::InvalidDimensions`] if either side is zero or
    /// odd, and [`CodecError::DimensionOverflow`] if `width * height * 3`
    /// does not fit in `usize`.
    pub fn new(width: u32, height: u32) -> Result<Self, CodecError> {
        if width == 0 || height == 0 || width % 2 != 0 || height % 2 != 0 {
            return Err(CodecError::InvalidDimensions { width, height });
        }
        let pixels = (width as usize)
            .checked_mul(height as usize)
            .ok_or(CodecError::DimensionOverflow)?;
        let raw_len = pixels
            .checked_mul(3)
            .ok_or(CodecError::DimensionOverflow)?;
        Ok(Self {
            width,
            height,
            pixels,
            raw_len,
        })
    }

    #[inline]
    pub const fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Number of pixels in one frame.
    #[inline]
    pub const fn pixels(&self) -> usize {
        self.pixels
    }

    /// Byte length of one interleaved RGB24 frame.
    #[inline]
    pub const fn raw_len(&self) -> usize {
        self.raw_len
    }

    /// Byte length of one planar YUV 4:2:0 frame.
    #[inline]
    pub const fn planar_len(&self) -> usize {
        self.pixels + self.pixels / 2
    }

    /// Byte length of the luma plane.
    #[inline]
    pub const fn luma_len(&self) -> usize {
        self.pixels
    }

    /// Byte length of one chroma plane.
    #[inline]
    pub const fn chroma_len(&self) -> usize {
        self.pixels / 4
    }

    /// Width of a chroma plane in samples.
    #[inline]
    pub const fn chroma_width(&self) -> usize {
        self.width as usize / 2
    }
}

impl Default for Dimensions {
    /// [`DEFAULT_WIDTH`] x [`DEFAULT_HEIGHT`].
    fn default() -> Self {
        let pixels = DEFAULT_WIDTH as usize * DEFAULT_HEIGHT as usize;
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            pixels,
            raw_len: pixels * 3,
        }
    }
}

impl core::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// One plane of a [`PlanarFrame`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Plane {
    /// Luma, full resolution.
    Y = 0,
    /// Blue-difference chroma, one sample per 2x2 block.
    U = 1,
    /// Red-difference chroma, one sample per 2x2 block.
    V = 2,
}

impl Plane {
    /// All planes in storage order.
    pub const ALL: [Plane; 3] = [Plane::Y, Plane::U, Plane::V];

    #[inline]
    pub const fn is_chroma(&self) -> bool {
        matches!(self, Plane::U | Plane::V)
    }

    /// Byte offset of this plane inside a planar frame.
    #[inline]
    pub const fn offset(&self, dims: &Dimensions) -> usize {
        match self {
            Plane::Y => 0,
            Plane::U => dims.luma_len(),
            Plane::V => dims.luma_len() + dims.chroma_len(),
        }
    }

    /// Byte length of this plane.
    #[inline]
    pub const fn len(&self, dims: &Dimensions) -> usize {
        if self.is_chroma() {
            dims.chroma_len()
        } else {
            dims.luma_len()
        }
    }
}

fn check_len(expected: usize, got: usize) -> Result<(), CodecError> {
    if expected == got {
        Ok(())
    } else {
        Err(CodecError::InvalidBufferSize { expected, got })
    }
}

/// Interleaved RGB24 frame: `[R0,G0,B0, R1,G1,B1, ...]`, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawFrame {
    dims: Dimensions,
    data: Vec<u8>,
}

impl RawFrame {
    /// Wrap `data` as a raw frame.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::InvalidBufferSize`] unless
    /// `data.len() == dims.raw_len()`.
    pub fn new(data: Vec<u8>, dims: Dimensions) -> Result<Self, CodecError> {
        check_len(dims.raw_len(), data.len())?;
        Ok(Self { dims, data })
    }

    /// Wrap a buffer a transform produced for `dims`.
    #[inline]
    pub(crate) fn from_transform(data: Vec<u8>, dims: Dimensions) -> Self {
        debug_assert_eq!(data.len(), dims.raw_len());
        Self { dims, data }
    }

    #[inline]
    pub fn dimensions(&self) -> Dimensions {
        self.dims
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// RGB triplet of the pixel at `(row, col)`.
    #[inline]
    pub fn pixel(&self, row: usize, col: usize) -> [u8; 3] {
        let i = (row * self.dims.width() as usize + col) * 3;
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }
}

/// Planar YUV 4:2:0 frame: the Y plane followed by the U and V planes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlanarFrame {
    dims: Dimensions,
    data: Vec<u8>,
}

impl PlanarFrame {
    /// Wrap `data` as a planar frame.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::InvalidBufferSize`] unless
    /// `data.len() == dims.planar_len()`.
    pub fn new(data: Vec<u8>, dims: Dimensions) -> Result<Self, CodecError> {
        check_len(dims.planar_len(), data.len())?;
        Ok(Self { dims, data })
    }

    /// Wrap a buffer a transform produced for `dims`.
    #[inline]
    pub(crate) fn from_transform(data: Vec<u8>, dims: Dimensions) -> Self {
        debug_assert_eq!(data.len(), dims.planar_len());
        Self { dims, data }
    }

    #[inline]
    pub fn dimensions(&self) -> Dimensions {
        self.dims
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub(crate) fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    #[inline]
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Borrow one plane.
    pub fn plane(&self, plane: Plane) -> &[u8] {
        let start = plane.offset(&self.dims);
        &self.data[start..start + plane.len(&self.dims)]
    }
}

/// Wrapping byte-wise difference of a planar frame against its predecessor.
///
/// The first frame of a sequence is a keyframe and holds planar samples
/// unchanged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeltaFrame {
    dims: Dimensions,
    data: Vec<u8>,
}

impl DeltaFrame {
    /// Wrap `data` as a delta frame.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::InvalidBufferSize`] unless
    /// `data.len() == dims.planar_len()`.
    pub fn new(data: Vec<u8>, dims: Dimensions) -> Result<Self, CodecError> {
        check_len(dims.planar_len(), data.len())?;
        Ok(Self { dims, data })
    }

    /// Reinterpret a planar buffer whose bytes already hold a delta.
    #[inline]
    pub(crate) fn from_planar(frame: PlanarFrame) -> Self {
        Self {
            dims: frame.dims,
            data: frame.data,
        }
    }

    /// Reinterpret a delta buffer whose bytes have been reconstructed.
    #[inline]
    pub(crate) fn into_planar(self) -> PlanarFrame {
        PlanarFrame {
            dims: self.dims,
            data: self.data,
        }
    }

    #[inline]
    pub fn dimensions(&self) -> Dimensions {
        self.dims
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub(crate) fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    #[inline]
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Total byte size of a frame sequence.
pub fn total_len<T: AsRef<[u8]>>(frames: &[T]) -> usize {
    frames.iter().map(|f| f.as_ref().len()).sum()
}

impl AsRef<[u8]> for RawFrame {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

impl AsRef<[u8]> for PlanarFrame {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

impl AsRef<[u8]> for DeltaFrame {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}
