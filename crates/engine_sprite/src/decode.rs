//! Decoded pixel buffers and the image decoding seam.
//!
//! [`DecodedImage`] is the only input the rasterizer accepts; its constructor
//! rejects buffers that do not match their declared shape, so an invalid
//! buffer never reaches [`crate::rasterize`].

use std::io::ErrorKind;
use std::path::Path;

use tracing::debug;

use crate::error::DecodeError;

/// A row-major, top-to-bottom, 8-bit-per-channel pixel buffer with red, green
/// and blue in the first three channels of every pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    width: u32,
    height: u32,
    channels: u8,
    pixels: Vec<u8>,
}

impl DecodedImage {
    /// Wrap a raw buffer after checking its shape.
    ///
    /// # Errors
    ///
    /// [`DecodeError::TooFewChannels`] if `channels < 3`,
    /// [`DecodeError::BufferSize`] if `pixels.len()` is not
    /// `width * height * channels`.
    pub fn new(width: u32, height: u32, channels: u8, pixels: Vec<u8>) -> Result<Self, DecodeError> {
        if channels < 3 {
            return Err(DecodeError::TooFewChannels { channels });
        }
        let expected = width as usize * height as usize * channels as usize;
        if pixels.len() != expected {
            return Err(DecodeError::BufferSize {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            channels,
            pixels,
        })
    }

    /// Build a 3-channel image from RGB triples, row-major.
    ///
    /// # Errors
    ///
    /// [`DecodeError::BufferSize`] if `rgb.len() != width * height`.
    pub fn from_rgb(width: u32, height: u32, rgb: &[[u8; 3]]) -> Result<Self, DecodeError> {
        Self::new(width, height, 3, rgb.iter().flatten().copied().collect())
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[must_use]
    pub fn channels(&self) -> u8 {
        self.channels
    }

    /// The RGB triple of every pixel, row-major.
    pub fn rgb_pixels(&self) -> impl Iterator<Item = [u8; 3]> + '_ {
        self.pixels
            .chunks_exact(self.channels as usize)
            .map(|px| [px[0], px[1], px[2]])
    }
}

/// Resolves a file path into a [`DecodedImage`].
pub trait ImageDecoder {
    /// # Errors
    ///
    /// Returns a [`DecodeError`] if the file is missing, unreadable or not an
    /// image.
    fn decode(&self, path: &Path) -> Result<DecodedImage, DecodeError>;
}

/// Decodes PNG, JPEG, GIF and BMP files with the `image` crate.
///
/// Images with an alpha channel keep it as a fourth channel; grayscale
/// images are expanded to RGB.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileImageDecoder;

impl ImageDecoder for FileImageDecoder {
    fn decode(&self, path: &Path) -> Result<DecodedImage, DecodeError> {
        let img = image::open(path).map_err(|err| match err {
            image::ImageError::IoError(io) if io.kind() == ErrorKind::NotFound => {
                DecodeError::NotFound(path.to_path_buf())
            }
            image::ImageError::IoError(io) => DecodeError::Io {
                path: path.to_path_buf(),
                source: io,
            },
            other => DecodeError::Unsupported {
                path: path.to_path_buf(),
                reason: other.to_string(),
            },
        })?;

        let (width, height) = (img.width(), img.height());
        let (channels, pixels) = if img.color().has_alpha() {
            (4, img.into_rgba8().into_raw())
        } else {
            (3, img.into_rgb8().into_raw())
        };
        debug!(path = %path.display(), width, height, channels, "decoded image");

        DecodedImage::new(width, height, channels, pixels)
    }
}
