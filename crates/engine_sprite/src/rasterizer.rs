//! Pixel buffer → colored character grid.
//!
//! Each pixel's luminance is the integer mean of its red, green and blue
//! channels. The luminance is bucketed into eight levels that index
//! [`DENSITY_RAMP`], densest glyph first. The cell keeps the pixel's original
//! color, so density and tint are independent.

use std::path::Path;

use tracing::{debug, info};

use crate::asset::{Cell, Rgb, SpriteAsset};
use crate::decode::{DecodedImage, ImageDecoder};
use crate::error::DecodeError;

/// Density glyphs, index 0 densest, index 7 blank.
pub const DENSITY_RAMP: [char; 8] = ['@', '3', '|', '+', '=', '-', '.', ' '];

/// Integer mean of the three channels.
#[must_use]
pub fn luminance([r, g, b]: [u8; 3]) -> u8 {
    ((u16::from(r) + u16::from(g) + u16::from(b)) / 3) as u8
}

/// `(luminance * 7) / 255`, always in `0..=7`.
#[must_use]
pub fn bucket(luminance: u8) -> usize {
    ((usize::from(luminance) * 7) / 255).min(DENSITY_RAMP.len() - 1)
}

/// The density glyph for a luminance value.
#[must_use]
pub fn glyph_for(luminance: u8) -> char {
    DENSITY_RAMP[bucket(luminance)]
}

/// Convert a decoded image into a sprite of the same width and height.
///
/// The image buffer is consumed and released here.
#[must_use]
pub fn rasterize(image: DecodedImage) -> SpriteAsset {
    let cells: Vec<Cell> = image
        .rgb_pixels()
        .map(|rgb| Cell::new(glyph_for(luminance(rgb)), Rgb::from(rgb)))
        .collect();
    debug!(width = image.width(), height = image.height(), "rasterized image");
    SpriteAsset::from_cells(image.width(), image.height(), Rgb::WHITE, cells)
}

/// Luminance-only rendition of an image, for callers that need grayscale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LuminanceGrid {
    width: u32,
    height: u32,
    values: Vec<u8>,
}

impl LuminanceGrid {
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Luminance values, row-major.
    #[must_use]
    pub fn values(&self) -> &[u8] {
        &self.values
    }

    #[must_use]
    pub fn luminance_at(&self, row: u32, col: u32) -> Option<u8> {
        if row >= self.height || col >= self.width {
            return None;
        }
        self.values
            .get(row as usize * self.width as usize + col as usize)
            .copied()
    }

    /// Same bucket math as [`rasterize`].
    #[must_use]
    pub fn bucket_at(&self, row: u32, col: u32) -> Option<usize> {
        self.luminance_at(row, col).map(bucket)
    }
}

/// The reduced rasterizer: luminance only, no color.
#[must_use]
pub fn luminance_grid(image: DecodedImage) -> LuminanceGrid {
    let values = image.rgb_pixels().map(luminance).collect();
    LuminanceGrid {
        width: image.width(),
        height: image.height(),
        values,
    }
}

/// Decode `path` and rasterize it.
///
/// # Errors
///
/// Propagates the decoder's [`DecodeError`].
pub fn load_sprite(decoder: &impl ImageDecoder, path: &Path) -> Result<SpriteAsset, DecodeError> {
    let sprite = rasterize(decoder.decode(path)?);
    info!(
        path = %path.display(),
        width = sprite.width(),
        height = sprite.height(),
        "loaded sprite"
    );
    Ok(sprite)
}
