//! Decode driver: format sniffing, backend invocation, plane dispatch.
//!
//! The entropy decoder itself lives behind the [`ComponentDecoder`] trait;
//! this module only decides which repack path the decoded planes take and
//! records the coarse failure messages the host reads back from the session.

use crate::error::BridgeError;
use crate::format::CodecFormat;
use crate::repack::DecodeSession;

/// Decoder parameters forwarded from the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecodeOptions {
    /// Skip application of palette / component-mapping boxes, leaving index
    /// values in the planes. Hosts that resolve indexed color themselves
    /// (e.g. from a PDF /Indexed color space) set this.
    pub ignore_color_lookup_table: bool,
}

/// A decoded image as component planes, one `i32` sample per pixel per
/// component.
#[derive(Debug, Clone, Default)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    /// Bit depth of the decoded samples.
    pub precision_bits: u32,
    /// One plane per component, each `width * height` samples long.
    pub planes: Vec<Vec<i32>>,
}

impl DecodedImage {
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Backend that turns an encoded payload into component planes.
///
/// Implementations report their own warnings and errors through the
/// session's diagnostic registers.
pub trait ComponentDecoder {
    fn decode(
        &mut self,
        data: &[u8],
        format: CodecFormat,
        options: &DecodeOptions,
        session: &mut DecodeSession,
    ) -> Result<DecodedImage, BridgeError>;
}

/// Decode `data` and leave the interleaved pixels in the session buffer.
///
/// Dispatches on the decoded component count: 1 plane is repacked as
/// grayscale at the image's bit depth, 3 as RGB, 4 as RGBA. Failures are
/// also recorded in the session error log so the host can surface them.
pub fn decode_image(
    decoder: &mut dyn ComponentDecoder,
    data: &[u8],
    options: &DecodeOptions,
    session: &mut DecodeSession,
) -> Result<(), BridgeError> {
    let format = match CodecFormat::detect(data) {
        Ok(format) => format,
        Err(err) => {
            session.report_error("Unknown format");
            return Err(err);
        }
    };

    let image = match decoder.decode(data, format, options, session) {
        Ok(image) => image,
        Err(_) => {
            session.report_error("Failed to decode the image");
            return Err(BridgeError::DecodeFailed);
        }
    };

    tracing::debug!(
        target: "jp2bridge",
        width = image.width,
        height = image.height,
        components = image.planes.len(),
        precision_bits = image.precision_bits,
        "decoded image"
    );

    match image.planes.as_slice() {
        [gray] => {
            session.convert_grayscale(gray, image.precision_bits)?;
        }
        [r, g, b] => {
            session.convert_rgb(r, g, b);
        }
        [r, g, b, a] => {
            session.convert_rgba(r, g, b, a);
        }
        planes => {
            return Err(BridgeError::UnsupportedComponentCount(planes.len() as u32));
        }
    }
    Ok(())
}
