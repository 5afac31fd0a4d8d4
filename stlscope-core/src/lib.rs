/// stlscope core - STL geometry decoding
///
/// Turns the bytes of a binary or ASCII STL file into flat, flat-shaded mesh
/// buffers plus bounding information, reporting progress along the way.
/// Nothing here touches files, sockets or screens.

pub mod ascii;
pub mod binary;
pub mod bounds;
pub mod convert;
pub mod decoder;
pub mod error;
pub mod format;
pub mod geometry;
pub mod notify;
pub mod reader;
pub mod worker;

// Re-export commonly used types
pub use bounds::BoundingInfo;
pub use convert::{ascii_to_binary, write_binary, FacetRecord};
pub use decoder::{
    decode, decode_as, decode_text, decode_with, DecodeMetadata, DecodeOptions, DecodeOutput,
};
pub use error::{DecodeError, DecodeResult};
pub use format::{detect_format, Format};
pub use geometry::{Facet, Mesh};
pub use notify::{InfoKey, Notification, NotificationSink, NullSink};
pub use reader::{ByteReader, Endian};
pub use worker::{spawn_decode, DecodeHandle, WorkerEvent};
