/// stlscope web - decoding inside a browser worker
///
/// The `messages` module builds the JSON strings posted back to the page and
/// compiles everywhere; the `wasm-bindgen` entry points exist only on wasm32.
pub mod messages;

#[cfg(target_arch = "wasm32")]
mod wasm_api;

#[cfg(target_arch = "wasm32")]
pub use wasm_api::{convert, decode, DecodedStl};
