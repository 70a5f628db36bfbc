//! WebAssembly bindings for jp2bridge-rs.
//!
//! This module provides JavaScript-compatible functions via wasm-bindgen
//! for use in browsers and Node.js. Each call returns a freshly allocated
//! interleaved byte buffer that wasm-bindgen hands to JavaScript as a
//! `Uint8Array`.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
use crate::repack::DecodeSession;

/// Repack a grayscale component plane into bytes.
///
/// # Arguments
/// * `plane` - One 32-bit sample per pixel
/// * `precision_bits` - Bit depth of the decoded samples
///
/// # Returns
/// Interleaved pixel data as Uint8Array, `ceil(precision_bits / 8)` bytes
/// per pixel, little-endian
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn repack_grayscale(plane: &[i32], precision_bits: u32) -> Result<Vec<u8>, JsValue> {
    let mut session = DecodeSession::new();
    session
        .convert_grayscale(plane, precision_bits)
        .map_err(|e| JsValue::from_str(&format!("{e}")))?;
    Ok(session.take_image_data().unwrap_or_default())
}

/// Repack three component planes into interleaved RGB bytes.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn repack_rgb(red: &[i32], green: &[i32], blue: &[i32]) -> Result<Vec<u8>, JsValue> {
    if red.len() != green.len() || red.len() != blue.len() {
        return Err(JsValue::from_str("Component planes differ in length"));
    }
    let mut session = DecodeSession::new();
    session.convert_rgb(red, green, blue);
    Ok(session.take_image_data().unwrap_or_default())
}

/// Repack four component planes into interleaved RGBA bytes.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn repack_rgba(
    red: &[i32],
    green: &[i32],
    blue: &[i32],
    alpha: &[i32],
) -> Result<Vec<u8>, JsValue> {
    if red.len() != green.len() || red.len() != blue.len() || red.len() != alpha.len() {
        return Err(JsValue::from_str("Component planes differ in length"));
    }
    let mut session = DecodeSession::new();
    session.convert_rgba(red, green, blue, alpha);
    Ok(session.take_image_data().unwrap_or_default())
}
