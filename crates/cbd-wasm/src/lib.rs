//! WASM bindings for cbd-core.
//!
//! JavaScript hands documents across as JSON text and gets CBD back as a
//! `Uint8Array`, so no JS object graph has to be walked on the Rust side.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p cbd-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target nodejs --out-dir packages/cbd-js/wasm/ \
//!   target/wasm32-unknown-unknown/release/cbd_wasm.wasm
//! ```

use wasm_bindgen::prelude::*;

fn to_js_error(e: cbd_core::CbdError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Encode a JSON string into a CBD document.
///
/// Throws a JS error if the input is not valid JSON or holds a value CBD
/// cannot encode (negative numbers, more than 255 distinct keys).
#[wasm_bindgen]
pub fn serialize(json: &str) -> std::result::Result<Vec<u8>, JsValue> {
    cbd_core::json_to_cbd(json).map_err(to_js_error)
}

/// Decode a CBD document into compact JSON text.
///
/// Throws a JS error on a bad header, truncated input or trailing bytes.
#[wasm_bindgen]
pub fn deserialize(bytes: &[u8]) -> std::result::Result<String, JsValue> {
    cbd_core::cbd_to_json(bytes).map_err(to_js_error)
}

/// Decode a CBD document into indented JSON text.
#[wasm_bindgen(js_name = deserializePretty)]
pub fn deserialize_pretty(bytes: &[u8]) -> std::result::Result<String, JsValue> {
    cbd_core::cbd_to_json_pretty(bytes).map_err(to_js_error)
}

/// List the key dictionary of a CBD document in index order.
#[wasm_bindgen(js_name = dictionaryKeys)]
pub fn dictionary_keys(bytes: &[u8]) -> std::result::Result<Vec<String>, JsValue> {
    cbd_core::inspect(bytes)
        .map(|info| info.keys)
        .map_err(to_js_error)
}
