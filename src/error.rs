use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeError {
    #[error("Unsupported number of bytes per pixel: {0}")]
    UnsupportedBytesPerPixel(u32),
    #[error("Unknown format")]
    UnknownFormat,
    #[error("Unsupported number of components: {0}")]
    UnsupportedComponentCount(u32),
    #[error("Failed to decode the image")]
    DecodeFailed,
}
