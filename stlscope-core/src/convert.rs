/// Binary STL writing and ASCII-to-binary conversion
use tracing::debug;

use crate::ascii::{lex, number_at, Keyword, Word};
use crate::error::{DecodeError, DecodeResult};
use crate::format::{binary_len, HEADER_LEN};
use crate::notify::{NotificationSink, ProgressTicker, DEFAULT_PROGRESS_INTERVAL};

/// Start of the header written by [`ascii_to_binary`]; the rest is `-` padding.
pub const CONVERTED_HEADER_PREFIX: &str = "STLSCOPE-CONVERTED-STL-BINARY-FORMAT";

/// One 50-byte binary facet
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FacetRecord {
    pub normal: [f32; 3],
    pub vertices: [[f32; 3]; 3],
    pub attribute: u16,
}

/// The 80-byte header stamped on converted files.
pub fn converted_header() -> [u8; HEADER_LEN as usize] {
    let mut header = [b'-'; HEADER_LEN as usize];
    let prefix = CONVERTED_HEADER_PREFIX.as_bytes();
    header[..prefix.len()].copy_from_slice(prefix);
    header
}

/// Serialize facets as a little-endian binary STL.
///
/// `header` is truncated or zero-padded to 80 bytes. At most `u32::MAX` facets
/// are written so the count always matches the body.
pub fn write_binary(header: &[u8], facets: &[FacetRecord]) -> Vec<u8> {
    let facets = &facets[..facets.len().min(u32::MAX as usize)];
    let count = facets.len() as u32;

    let mut buf = Vec::with_capacity(binary_len(count) as usize);
    buf.extend_from_slice(&header[..header.len().min(HEADER_LEN as usize)]);
    buf.resize(HEADER_LEN as usize, 0u8);
    buf.extend_from_slice(&count.to_le_bytes());

    for facet in facets {
        for value in facet.normal.iter().chain(facet.vertices.iter().flatten()) {
            buf.extend_from_slice(&value.to_le_bytes());
        }
        buf.extend_from_slice(&facet.attribute.to_le_bytes());
    }

    buf
}

/// Where the next value word of a facet block goes
#[derive(Debug, Clone, Copy)]
enum Slot {
    Normal(usize),
    Vertex(usize, usize),
    Ignore,
}

/// Convert ASCII STL text into a binary STL.
///
/// Each `facet ... endfacet` block becomes one record. The `normal` triple and
/// the first three `vertex` triples fill it; anything missing stays zero.
/// Reports `ConvertProgress` every 100 completed facets.
pub fn ascii_to_binary(text: &str, sink: &mut dyn NotificationSink) -> DecodeResult<Vec<u8>> {
    let words = lex(text);
    let expected = words
        .iter()
        .filter(|word| **word == Word::Keyword(Keyword::EndFacet))
        .count();
    let total =
        u32::try_from(expected).map_err(|_| DecodeError::TooManyFacets { count: expected })?;
    let ticker = ProgressTicker::new(total, DEFAULT_PROGRESS_INTERVAL);

    let mut records = Vec::with_capacity(expected);
    let mut current: Option<FacetRecord> = None;
    let mut slot = Slot::Ignore;
    let mut vertices_seen = 0;
    let mut value_index = 0;

    for word in words {
        match word {
            Word::Keyword(Keyword::Facet) => {
                current = Some(FacetRecord::default());
                slot = Slot::Ignore;
                vertices_seen = 0;
            }
            Word::Keyword(Keyword::Normal) => slot = Slot::Normal(0),
            Word::Keyword(Keyword::Vertex) => {
                slot = if vertices_seen < 3 {
                    Slot::Vertex(vertices_seen, 0)
                } else {
                    Slot::Ignore
                };
                vertices_seen += 1;
            }
            Word::Keyword(Keyword::EndFacet) => {
                if let Some(record) = current.take() {
                    records.push(record);
                    ticker.tick_convert(records.len() as u32, sink);
                }
                slot = Slot::Ignore;
            }
            Word::Keyword(_) => slot = Slot::Ignore,
            Word::Value(token) => {
                let index = value_index;
                value_index += 1;

                let Some(record) = current.as_mut() else {
                    continue;
                };
                let target = match &mut slot {
                    Slot::Normal(k) if *k < 3 => {
                        let target = &mut record.normal[*k];
                        *k += 1;
                        target
                    }
                    Slot::Vertex(v, k) if *k < 3 => {
                        let target = &mut record.vertices[*v][*k];
                        *k += 1;
                        target
                    }
                    _ => continue,
                };
                *target = number_at(token, index)?;
            }
        }
    }

    debug!(facets = records.len(), "converted ASCII STL to binary");
    Ok(write_binary(&converted_header(), &records))
}
