/// STL format detection
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::DecodeResult;
use crate::reader::ByteReader;

/// Bytes before the facet count in a binary STL
pub const HEADER_LEN: u64 = 80;
/// Header plus the u32 facet count
pub const PREAMBLE_LEN: u64 = HEADER_LEN + 4;
/// Normal, three vertices and the attribute word
pub const FACET_LEN: u64 = 50;

/// Representation of an STL file, decided once by [`detect_format`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Binary,
    Ascii,
}

impl Format {
    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Binary => "binary",
            Format::Ascii => "ascii",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Expected byte length of a binary STL holding `facets` facets.
pub fn binary_len(facets: u32) -> u64 {
    PREAMBLE_LEN + FACET_LEN * u64::from(facets)
}

/// Classify a buffer as binary when its length is exactly `84 + 50 * N`, with
/// N read from bytes 80..84, and as ASCII otherwise.
///
/// STL has no type tag, so this is a length heuristic: text whose size happens
/// to match is classified binary. Buffers too short to hold the facet count
/// fail with `OutOfBounds`.
pub fn detect_format(bytes: &[u8]) -> DecodeResult<Format> {
    let mut reader = ByteReader::new(bytes);
    reader.skip(HEADER_LEN as i64);
    let facets: u32 = reader.read()?;

    let expected = binary_len(facets);
    let format = if expected == reader.len() {
        Format::Binary
    } else {
        Format::Ascii
    };
    debug!(facets, expected, actual = reader.len(), %format, "detected STL format");
    Ok(format)
}
