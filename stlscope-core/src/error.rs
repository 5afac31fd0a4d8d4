/// Error types for STL decoding
use thiserror::Error;

use crate::reader::ReadError;

/// Result type alias for decode operations.
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Fatal decode failures. Any of these aborts the whole decode; no partial mesh
/// is ever returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// A binary read ran past the end of the buffer, including buffers too short
    /// to hold the 84-byte header and facet count.
    #[error("read of {size} bytes at offset {offset} is out of bounds (buffer is {len} bytes)")]
    OutOfBounds { offset: u64, size: usize, len: u64 },

    /// An ASCII token in a numeric slot is not a number.
    #[error("malformed number {token:?} at token {index}")]
    MalformedNumber { token: String, index: usize },

    /// The facet count cannot be stored in a binary STL header.
    #[error("{count} facets exceed the binary STL limit")]
    TooManyFacets { count: usize },

    /// A background decode ended without delivering a result.
    #[error("decode worker exited without a result")]
    WorkerLost,
}

impl From<ReadError> for DecodeError {
    fn from(err: ReadError) -> Self {
        match err {
            ReadError::OutOfBounds { offset, size, len } => {
                DecodeError::OutOfBounds { offset, size, len }
            }
        }
    }
}
