/// `wasm-bindgen` entry points for a browser worker.
///
/// The page posts a file's bytes to the worker, the worker calls `decode` and
/// relays every JSON string handed to `on_message` back to the page.
use js_sys::Function;
use wasm_bindgen::prelude::*;

use stlscope_core::{ascii_to_binary, decode_with, DecodeOutput, Notification};

use crate::messages::{notification_json, outcome_json, parse_options, Outcome};

fn post(on_message: &Function, json: String) {
    // A throwing callback must not abort the decode.
    let _ = on_message.call1(&JsValue::NULL, &JsValue::from_str(&json));
}

/// A decoded mesh held in WASM memory; getters copy out typed arrays.
#[wasm_bindgen]
pub struct DecodedStl {
    output: DecodeOutput,
}

#[wasm_bindgen]
impl DecodedStl {
    #[wasm_bindgen(getter)]
    pub fn vertices(&self) -> Vec<f32> {
        self.output.mesh.vertices.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn normals(&self) -> Vec<f32> {
        self.output.mesh.normals.clone()
    }

    /// Per-vertex RGB, present only for files with a vendor color header.
    #[wasm_bindgen(getter)]
    pub fn colors(&self) -> Option<Vec<f32>> {
        self.output.mesh.colors.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn alpha(&self) -> Option<f32> {
        self.output.mesh.alpha
    }

    #[wasm_bindgen(getter, js_name = facetCount)]
    pub fn facet_count(&self) -> u32 {
        self.output.metadata.facet_count
    }

    #[wasm_bindgen(getter)]
    pub fn format(&self) -> String {
        self.output.metadata.format.to_string()
    }

    #[wasm_bindgen(getter, js_name = byteSize)]
    pub fn byte_size(&self) -> f64 {
        self.output.metadata.byte_size as f64
    }

    #[wasm_bindgen(getter)]
    pub fn min(&self) -> Vec<f32> {
        self.output.bounds.min.coords.as_slice().to_vec()
    }

    #[wasm_bindgen(getter)]
    pub fn max(&self) -> Vec<f32> {
        self.output.bounds.max.coords.as_slice().to_vec()
    }

    #[wasm_bindgen(getter)]
    pub fn centroid(&self) -> Vec<f32> {
        self.output.bounds.centroid.coords.as_slice().to_vec()
    }

    #[wasm_bindgen(getter)]
    pub fn recentered(&self) -> bool {
        self.output.recentered
    }
}

/// Decode `bytes`, posting notifications and then one outcome message to
/// `on_message`. Errors are also returned to the caller.
#[wasm_bindgen]
pub fn decode(
    bytes: &[u8],
    options_json: &str,
    on_message: &Function,
) -> Result<DecodedStl, JsValue> {
    let options = parse_options(options_json).map_err(|e| {
        post(on_message, outcome_json(&Outcome::Error(e.clone())));
        JsValue::from_str(&e)
    })?;

    let mut sink = |notification: Notification| post(on_message, notification_json(&notification));
    let result = decode_with(bytes, &options, &mut sink);
    post(on_message, outcome_json(&Outcome::from_result(result.as_ref())));

    result
        .map(|output| DecodedStl { output })
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Rewrite ASCII STL text as binary STL, posting convert-progress messages.
#[wasm_bindgen]
pub fn convert(text: &str, on_message: &Function) -> Result<Vec<u8>, JsValue> {
    let mut sink = |notification: Notification| post(on_message, notification_json(&notification));
    ascii_to_binary(text, &mut sink).map_err(|e| {
        post(on_message, outcome_json(&Outcome::Error(e.to_string())));
        JsValue::from_str(&e.to_string())
    })
}
