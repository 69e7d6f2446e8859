//! # engine_sprite
//!
//! Character-art sprite assets and the rasterizer that produces them.
//!
//! - [`SpriteAsset`]: a `height × width` grid of [`Cell`]s, one contiguous
//!   row-major buffer.
//! - [`rasterize`] / [`luminance_grid`]: decoded pixels → glyph grid, using
//!   the eight-level [`DENSITY_RAMP`].
//! - [`ImageDecoder`] / [`FileImageDecoder`]: file path → [`DecodedImage`].

pub mod asset;
pub mod decode;
pub mod error;
pub mod rasterizer;

pub use asset::{Cell, Rgb, SpriteAsset};
pub use decode::{DecodedImage, FileImageDecoder, ImageDecoder};
pub use error::DecodeError;
pub use rasterizer::{
    DENSITY_RAMP, LuminanceGrid, bucket, glyph_for, load_sprite, luminance, luminance_grid,
    rasterize,
};
