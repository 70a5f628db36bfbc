//! Bridge between a native JPEG 2000 decoder and a host rendering surface.
//!
//! The decoder produces one 32-bit sample plane per color component; hosts
//! want interleaved per-pixel bytes. This crate repacks 1, 3, or 4 planes
//! into gray, RGB, or RGBA byte buffers, relays the decoder's warning and
//! error text, and sniffs JP2/J2K codestream signatures. The entropy
//! decoding itself stays behind the [`ComponentDecoder`] trait.

pub mod decode;
pub mod error;
pub mod format;
pub mod repack;

#[cfg(feature = "ffi")]
pub mod ffi;
#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use decode::{ComponentDecoder, DecodeOptions, DecodedImage, decode_image};
pub use error::BridgeError;
pub use format::CodecFormat;
pub use repack::{DecodeSession, DiagnosticSink, TracingSink};
