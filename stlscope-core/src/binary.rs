/// Binary STL facet extraction and the vendor color extension
use tracing::debug;

use crate::decoder::DecodeOptions;
use crate::error::DecodeResult;
use crate::format::{FACET_LEN, HEADER_LEN, PREAMBLE_LEN};
use crate::geometry::{Facet, Mesh};
use crate::notify::{NotificationSink, ProgressTicker};
use crate::reader::{ByteReader, Endian};

/// `"COLO"` read as a big-endian u32
pub const COLOR_TAG: u32 = 0x434F_4C4F;

/// Offset of the attribute word within a facet
const ATTRIBUTE_OFFSET: u64 = 48;
/// Set in an attribute word when the facet uses the header's default color
const DEFAULT_COLOR_FLAG: u16 = 0x8000;

/// Mesh-wide color declared by a `COLOR=` tag in the header
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VendorColor {
    pub rgb: [f32; 3],
    pub alpha: f32,
}

/// Scan the 80-byte header for `COLOR=` followed by R, G, B and alpha bytes.
///
/// Offsets `0..70` are probed; when several tags match, the last one wins. A
/// header that spells `COLOR=` by accident is read as colored too.
pub fn probe_vendor_color(reader: &ByteReader) -> DecodeResult<Option<VendorColor>> {
    let mut found = None;

    for i in 0..HEADER_LEN - 10 {
        if reader.peek_endian::<u32>(i, Endian::Big)? == COLOR_TAG
            && reader.peek::<u8>(i + 4)? == b'R'
            && reader.peek::<u8>(i + 5)? == b'='
        {
            let channel = |offset: u64| -> DecodeResult<f32> {
                Ok(f32::from(reader.peek::<u8>(i + offset)?) / 255.0)
            };
            found = Some(VendorColor {
                rgb: [channel(6)?, channel(7)?, channel(8)?],
                alpha: channel(9)?,
            });
        }
    }

    Ok(found)
}

/// Decode a facet's packed 5-5-5 attribute color. Words with the high bit set
/// take `default` instead.
pub fn decode_attribute_color(word: u16, default: [f32; 3]) -> [f32; 3] {
    if word & DEFAULT_COLOR_FLAG != 0 {
        return default;
    }
    let channel = |shift: u16| f32::from((word >> shift) & 0x1F) / 31.0;
    [channel(0), channel(5), channel(10)]
}

/// Extract every facet of a binary STL into flat buffers.
pub fn parse_binary(
    bytes: &[u8],
    options: &DecodeOptions,
    sink: &mut dyn NotificationSink,
) -> DecodeResult<Mesh> {
    let mut reader = ByteReader::new(bytes);

    let vendor = probe_vendor_color(&reader)?;
    reader.skip(HEADER_LEN as i64);
    let facet_count: u32 = reader.read()?;

    // The count is untrusted; never reserve more than the buffer can hold.
    let room = reader.len().saturating_sub(PREAMBLE_LEN) / FACET_LEN;
    let capacity = u64::from(facet_count).min(room) as usize;
    let mut mesh = match vendor {
        Some(color) => {
            debug!(rgb = ?color.rgb, alpha = color.alpha, "header declares vendor color");
            Mesh::with_colors(capacity, color.alpha)
        }
        None => Mesh::with_capacity(capacity),
    };

    let ticker = ProgressTicker::new(facet_count, options.progress_interval);
    for i in 0..facet_count {
        ticker.tick(i, sink);

        let color = match vendor {
            Some(color) => {
                let word: u16 = reader.peek(reader.position() + ATTRIBUTE_OFFSET)?;
                Some(decode_attribute_color(word, color.rgb))
            }
            None => None,
        };

        let facet = read_facet(&mut reader)?;
        // Attribute byte count
        reader.read::<u16>()?;

        mesh.push_facet(&facet, color);
    }

    debug!(facets = facet_count, colored = mesh.has_colors(), "parsed binary STL");
    Ok(mesh)
}

fn read_facet(reader: &mut ByteReader) -> DecodeResult<Facet> {
    let mut values = [0f32; 12];
    for value in &mut values {
        *value = reader.read()?;
    }
    Ok(Facet::from_floats(&values))
}
