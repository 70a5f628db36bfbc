//! Codestream signature detection.
//!
//! A JPEG 2000 payload arrives either wrapped in the JP2 container (ISO/IEC
//! 15444-1 Annex I) or as a raw codestream starting with the SOC marker.
//! Detection only looks at the leading bytes; everything past the signature
//! belongs to the decoder.

use crate::error::BridgeError;

/// Start of the JP2 signature box as defined in RFC 3745.
pub const JP2_RFC3745_MAGIC: [u8; 12] = [
    0x00, 0x00, 0x00, 0x0C, 0x6A, 0x50, 0x20, 0x20, 0x0D, 0x0A, 0x87, 0x0A,
];

/// Signature-box payload alone; some producers emit the file without the
/// length/type prefix.
pub const JP2_MAGIC: [u8; 4] = [0x0D, 0x0A, 0x87, 0x0A];

/// SOC marker opening a raw J2K codestream, followed by SIZ.
pub const J2K_CODESTREAM_MAGIC: [u8; 4] = [0xFF, 0x4F, 0xFF, 0x51];

/// Container kind of an encoded JPEG 2000 payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecFormat {
    /// JP2 container (boxed codestream).
    Jp2,
    /// Raw J2K codestream.
    J2k,
}

impl CodecFormat {
    /// Sniff the payload kind from its leading bytes.
    pub fn detect(data: &[u8]) -> Result<Self, BridgeError> {
        if data.starts_with(&JP2_MAGIC) || data.starts_with(&JP2_RFC3745_MAGIC) {
            Ok(Self::Jp2)
        } else if data.starts_with(&J2K_CODESTREAM_MAGIC) {
            Ok(Self::J2k)
        } else {
            Err(BridgeError::UnknownFormat)
        }
    }
}
