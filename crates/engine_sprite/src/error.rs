//! Image decoding errors.

use std::path::PathBuf;

/// Errors produced while turning an image file into a pixel buffer.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The file does not exist.
    #[error("image not found: {0}")]
    NotFound(PathBuf),

    /// The file exists but could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not an image format the decoder understands.
    #[error("unsupported image {path}: {reason}")]
    Unsupported { path: PathBuf, reason: String },

    /// The decoded buffer has fewer than three channels per pixel.
    #[error("expected at least 3 channels per pixel, got {channels}")]
    TooFewChannels { channels: u8 },

    /// The buffer length does not match `width * height * channels`.
    #[error("pixel buffer holds {actual} bytes, expected {expected}")]
    BufferSize { expected: usize, actual: usize },
}
