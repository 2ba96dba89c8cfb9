//! Raw frame ingestion
//!
//! [`FrameSource`] cuts a byte stream of concatenated RGB24 frames into
//! [`RawFrame`]s. A trailing partial frame (including an empty stream) ends
//! the sequence and is discarded; it is not an error.

use std::io::{ErrorKind, Read};

use tracing::{debug, warn};

use crate::error::CodecError;
use crate::frame::{Dimensions, RawFrame};

/// Lazy, finite, non-restartable reader of fixed-size raw frames.
pub struct FrameSource<R> {
    reader: R,
    dims: Dimensions,
    frames_read: usize,
    done: bool,
}

impl<R: Read> FrameSource<R> {
    pub fn new(reader: R, dims: Dimensions) -> Self {
        Self {
            reader,
            dims,
            frames_read: 0,
            done: false,
        }
    }

    /// Number of complete frames yielded so far.
    #[inline]
    pub fn frames_read(&self) -> usize {
        self.frames_read
    }

    /// Drain the source into memory.
    ///
    /// # Errors
    ///
    /// Returns the first [`CodecError::Io`] raised by the reader.
    pub fn read_all(self) -> Result<Vec<RawFrame>, CodecError> {
        self.collect()
    }

    /// Fill `buf` as far as the reader allows, returning the byte count.
    ///
    /// Unlike `read_exact`, running dry is reported through the count rather
    /// than as an error.
    fn fill(&mut self, buf: &mut [u8]) -> Result<usize, CodecError> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.reader.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(CodecError::Io(e)),
            }
        }
        Ok(filled)
    }
}

impl<R: Read> Iterator for FrameSource<R> {
    type Item = Result<RawFrame, CodecError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let mut buf = vec![0u8; self.dims.raw_len()];
        match self.fill(&mut buf) {
            Ok(n) if n == buf.len() => {
                self.frames_read += 1;
                Some(RawFrame::new(buf, self.dims))
            }
            Ok(n) => {
                self.done = true;
                if n > 0 {
                    debug!(
                        discarded = n,
                        frame_len = buf.len(),
                        "partial trailing frame dropped"
                    );
                }
                debug!(frames = self.frames_read, "end of input");
                None
            }
            Err(e) => {
                self.done = true;
                warn!(frames = self.frames_read, "input read failed");
                Some(Err(e))
            }
        }
    }
}

impl<R: Read> core::iter::FusedIterator for FrameSource<R> {}
