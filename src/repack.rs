//! Component-plane repacking and per-decode session state.
//!
//! A JPEG 2000 decoder hands back one plane of 32-bit samples per color
//! component. Rendering surfaces want a single interleaved byte buffer, so
//! the session repacks 1, 3, or 4 planes into gray, RGB, or RGBA bytes and
//! keeps the result until the host takes it or the next decode replaces it.
//! The session also carries the decoder's diagnostic text: a last-write-wins
//! warning slot and a newline-joined error log.

use crate::error::BridgeError;

/// Receiver for decoder warnings.
///
/// Warnings are advisory; they are forwarded here as they arrive, in
/// addition to being kept in the session's last-warning slot.
pub trait DiagnosticSink {
    fn warning(&mut self, message: &str);
}

/// Default sink, routes warnings into the `tracing` subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn warning(&mut self, message: &str) {
        tracing::warn!(target: "jp2bridge", "{message}");
    }
}

/// Narrow a decoded sample to one byte.
///
/// Wrapping semantics (`sample mod 256`), applied uniformly to every output
/// channel; out-of-range samples are not clamped to 255.
#[inline]
fn narrow_u8(sample: i32) -> u8 {
    sample as u8
}

/// State for one decode: the current interleaved image buffer plus the
/// diagnostic registers the decoder writes into.
pub struct DecodeSession {
    image_data: Option<Vec<u8>>,
    error_messages: Option<String>,
    last_warning: Option<String>,
    sink: Box<dyn DiagnosticSink>,
}

impl Default for DecodeSession {
    fn default() -> Self {
        Self::new()
    }
}

impl DecodeSession {
    /// Create a session with the default warning sink.
    pub fn new() -> Self {
        Self::with_sink(Box::new(TracingSink))
    }

    /// Create a session forwarding warnings to `sink`.
    pub fn with_sink(sink: Box<dyn DiagnosticSink>) -> Self {
        Self {
            image_data: None,
            error_messages: None,
            last_warning: None,
            sink,
        }
    }

    /// Repack a single grayscale plane.
    ///
    /// `precision_bits` is the bit depth of the decoded samples and selects
    /// the output width: `ceil(precision_bits / 8)` bytes per pixel, written
    /// little-endian. Depths above 32 bits have no supported byte width and
    /// fail without touching the current image buffer.
    pub fn convert_grayscale(
        &mut self,
        plane: &[i32],
        precision_bits: u32,
    ) -> Result<&[u8], BridgeError> {
        let bytes_per_pixel = precision_bits.div_ceil(8);
        let out = match bytes_per_pixel {
            1 => plane.iter().map(|&s| narrow_u8(s)).collect(),
            2..=4 => {
                let bpp = bytes_per_pixel as usize;
                let mut out = vec![0u8; plane.len() * bpp];
                for (i, &sample) in plane.iter().enumerate() {
                    for k in 0..bpp {
                        out[bpp * i + k] = narrow_u8(sample >> (8 * k));
                    }
                }
                out
            }
            _ => return Err(BridgeError::UnsupportedBytesPerPixel(bytes_per_pixel)),
        };
        Ok(self.image_data.insert(out).as_slice())
    }

    /// Interleave three planes into RGB bytes, 3 bytes per pixel.
    ///
    /// All planes must have the same length; samples are assumed 8-bit.
    pub fn convert_rgb(&mut self, red: &[i32], green: &[i32], blue: &[i32]) -> &[u8] {
        debug_assert_eq!(red.len(), green.len());
        debug_assert_eq!(red.len(), blue.len());
        let mut out = Vec::with_capacity(red.len() * 3);
        for i in 0..red.len() {
            out.push(narrow_u8(red[i]));
            out.push(narrow_u8(green[i]));
            out.push(narrow_u8(blue[i]));
        }
        self.image_data.insert(out).as_slice()
    }

    /// Interleave four planes into RGBA bytes, 4 bytes per pixel.
    pub fn convert_rgba(
        &mut self,
        red: &[i32],
        green: &[i32],
        blue: &[i32],
        alpha: &[i32],
    ) -> &[u8] {
        debug_assert_eq!(red.len(), green.len());
        debug_assert_eq!(red.len(), blue.len());
        debug_assert_eq!(red.len(), alpha.len());
        let mut out = Vec::with_capacity(red.len() * 4);
        for i in 0..red.len() {
            out.push(narrow_u8(red[i]));
            out.push(narrow_u8(green[i]));
            out.push(narrow_u8(blue[i]));
            out.push(narrow_u8(alpha[i]));
        }
        self.image_data.insert(out).as_slice()
    }

    /// Record a decoder warning: overwrites the last-warning slot and
    /// forwards the text to the sink.
    pub fn report_warning(&mut self, message: &str) {
        self.sink.warning(message);
        self.last_warning = Some(message.to_owned());
    }

    /// Append a decoder error to the accumulated error text. Messages are
    /// joined with `\n` and never truncated.
    pub fn report_error(&mut self, message: &str) {
        match &mut self.error_messages {
            Some(log) => {
                log.push('\n');
                log.push_str(message);
            }
            None => self.error_messages = Some(message.to_owned()),
        }
    }

    /// The current interleaved image buffer, if a conversion has run.
    pub fn image_data(&self) -> Option<&[u8]> {
        self.image_data.as_deref()
    }

    /// Hand the current image buffer to the host, leaving the session empty.
    pub fn take_image_data(&mut self) -> Option<Vec<u8>> {
        self.image_data.take()
    }

    /// Accumulated error text, newline-joined in arrival order.
    pub fn error_messages(&self) -> Option<&str> {
        self.error_messages.as_deref()
    }

    /// Most recent warning, if any.
    pub fn last_warning(&self) -> Option<&str> {
        self.last_warning.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn grayscale_one_byte_wraps_mod_256() {
        let mut session = DecodeSession::new();
        let plane = [0, 1, 127, 255, 256, 300, -1];
        let out = session.convert_grayscale(&plane, 8).unwrap();
        assert_eq!(out, [0, 1, 127, 255, 0, 44, 255]);
    }

    #[test]
    fn grayscale_two_bytes_little_endian() {
        let mut session = DecodeSession::new();
        let plane = [0x1234, 0x00FF, 0xABCD];
        let out = session.convert_grayscale(&plane, 16).unwrap();
        assert_eq!(out, [0x34, 0x12, 0xFF, 0x00, 0xCD, 0xAB]);
    }

    #[test]
    fn grayscale_byte_width_follows_precision() {
        let mut session = DecodeSession::new();
        // 12-bit samples still need two bytes.
        let out = session.convert_grayscale(&[0xFFF], 12).unwrap();
        assert_eq!(out, [0xFF, 0x0F]);

        let out = session.convert_grayscale(&[0x123456], 24).unwrap();
        assert_eq!(out, [0x56, 0x34, 0x12]);

        let out = session.convert_grayscale(&[0x12345678], 32).unwrap();
        assert_eq!(out, [0x78, 0x56, 0x34, 0x12]);
    }

    #[test]
    fn grayscale_single_bit_packs_one_byte() {
        let mut session = DecodeSession::new();
        let out = session.convert_grayscale(&[0, 1, 1, 0], 1).unwrap();
        assert_eq!(out, [0, 1, 1, 0]);
    }

    #[test]
    fn grayscale_unsupported_precision_is_an_error() {
        let mut session = DecodeSession::new();
        assert_eq!(
            session.convert_grayscale(&[0; 4], 33),
            Err(BridgeError::UnsupportedBytesPerPixel(5))
        );
        assert_eq!(
            session.convert_grayscale(&[0; 4], 0),
            Err(BridgeError::UnsupportedBytesPerPixel(0))
        );
        assert!(session.image_data().is_none());
    }

    #[test]
    fn failed_conversion_keeps_previous_buffer() {
        let mut session = DecodeSession::new();
        session.convert_grayscale(&[7, 8], 8).unwrap();
        assert!(session.convert_grayscale(&[0; 2], 40).is_err());
        assert_eq!(session.image_data(), Some(&[7u8, 8u8][..]));
    }

    #[test]
    fn rgb_interleaves_and_wraps() {
        let mut session = DecodeSession::new();
        let out = session.convert_rgb(&[10, 300], &[20, 0], &[30, 255]);
        assert_eq!(out, [10, 20, 30, 44, 0, 255]);
    }

    #[test]
    fn rgba_interleaves_four_planes() {
        let mut session = DecodeSession::new();
        let out = session.convert_rgba(&[5], &[6], &[7], &[8]);
        assert_eq!(out, [5, 6, 7, 8]);
    }

    #[test]
    fn conversion_replaces_current_buffer() {
        let mut session = DecodeSession::new();
        session.convert_rgb(&[1], &[2], &[3]);
        session.convert_grayscale(&[9], 8).unwrap();
        assert_eq!(session.image_data(), Some(&[9u8][..]));
        assert_eq!(session.take_image_data(), Some(vec![9]));
        assert!(session.image_data().is_none());
    }

    #[test]
    fn errors_accumulate_with_newlines() {
        let mut session = DecodeSession::new();
        assert!(session.error_messages().is_none());
        session.report_error("a");
        session.report_error("b");
        assert_eq!(session.error_messages(), Some("a\nb"));
    }

    #[test]
    fn warning_slot_is_last_write_wins() {
        let mut session = DecodeSession::new();
        session.report_warning("x");
        session.report_warning("y");
        assert_eq!(session.last_warning(), Some("y"));
    }

    struct CaptureSink(Rc<RefCell<Vec<String>>>);

    impl DiagnosticSink for CaptureSink {
        fn warning(&mut self, message: &str) {
            self.0.borrow_mut().push(message.to_owned());
        }
    }

    #[test]
    fn warnings_forward_to_injected_sink() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut session = DecodeSession::with_sink(Box::new(CaptureSink(seen.clone())));
        session.report_warning("x");
        session.report_warning("y");
        assert_eq!(*seen.borrow(), ["x", "y"]);
    }
}
