/// STL decoder entry points
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::ascii::parse_ascii;
use crate::binary::parse_binary;
use crate::bounds::{finish_mesh, BoundingInfo};
use crate::error::DecodeResult;
use crate::format::{detect_format, Format};
use crate::geometry::Mesh;
use crate::notify::{
    format_byte_size, InfoKey, Notification, NotificationSink, NullSink, DEFAULT_PROGRESS_INTERVAL,
};

/// Decode settings. Missing fields take their defaults when deserialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeOptions {
    /// Shift off-center meshes so their centroid sits at the origin
    pub recenter: bool,
    /// Facets between progress notifications; 0 disables progress
    pub progress_interval: u32,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            recenter: true,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodeMetadata {
    pub format: Format,
    pub byte_size: u64,
    pub facet_count: u32,
}

/// Everything a successful decode produces.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodeOutput {
    pub mesh: Mesh,
    pub bounds: BoundingInfo,
    pub metadata: DecodeMetadata,
    /// Whether the vertices were shifted by the negative centroid
    pub recentered: bool,
}

/// Decode an STL buffer with default options, discarding notifications.
pub fn decode(bytes: &[u8]) -> DecodeResult<DecodeOutput> {
    decode_with(bytes, &DecodeOptions::default(), &mut NullSink)
}

/// Detect the format of `bytes` and decode them.
pub fn decode_with(
    bytes: &[u8],
    options: &DecodeOptions,
    sink: &mut dyn NotificationSink,
) -> DecodeResult<DecodeOutput> {
    let format = detect_format(bytes)?;
    decode_as(bytes, format, options, sink)
}

/// Decode `bytes` as `format` without running detection.
///
/// ASCII bytes are read as UTF-8, with invalid sequences replaced.
pub fn decode_as(
    bytes: &[u8],
    format: Format,
    options: &DecodeOptions,
    sink: &mut dyn NotificationSink,
) -> DecodeResult<DecodeOutput> {
    let byte_size = bytes.len() as u64;
    announce(format, byte_size, sink);

    let mesh = match format {
        Format::Binary => parse_binary(bytes, options, sink)?,
        Format::Ascii => parse_ascii(&String::from_utf8_lossy(bytes), options, sink)?,
    };

    Ok(finish(mesh, format, byte_size, options, sink))
}

/// Decode text that is already known to be an ASCII STL.
pub fn decode_text(
    text: &str,
    options: &DecodeOptions,
    sink: &mut dyn NotificationSink,
) -> DecodeResult<DecodeOutput> {
    let byte_size = text.len() as u64;
    announce(Format::Ascii, byte_size, sink);

    let mesh = parse_ascii(text, options, sink)?;
    Ok(finish(mesh, Format::Ascii, byte_size, options, sink))
}

fn announce(format: Format, byte_size: u64, sink: &mut dyn NotificationSink) {
    sink.notify(Notification::Info {
        prop: InfoKey::Type,
        data: format.to_string(),
    });
    sink.notify(Notification::Info {
        prop: InfoKey::Size,
        data: format_byte_size(byte_size),
    });
}

fn finish(
    mut mesh: Mesh,
    format: Format,
    byte_size: u64,
    options: &DecodeOptions,
    sink: &mut dyn NotificationSink,
) -> DecodeOutput {
    let (bounds, recentered) = finish_mesh(&mut mesh, options.recenter);
    if recentered {
        let c = bounds.centroid;
        info!(x = c.x, y = c.y, z = c.z, "recentered mesh on its centroid");
        sink.notify(Notification::Message {
            data: format!(
                "model recentered around its centroid ({:.3}, {:.3}, {:.3})",
                c.x, c.y, c.z
            ),
        });
    }

    // Both parsers cap the facet count at u32::MAX.
    let facet_count = mesh.facet_count() as u32;
    info!(%format, byte_size, facet_count, "decoded STL");

    DecodeOutput {
        mesh,
        bounds,
        metadata: DecodeMetadata {
            format,
            byte_size,
            facet_count,
        },
        recentered,
    }
}
