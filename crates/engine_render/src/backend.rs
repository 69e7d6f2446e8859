//! The glyph backend seam and a headless recording backend.

use engine_sprite::Rgb;
use glam::Vec2;

use crate::error::RenderError;

/// Pixel advance metrics of the fixed font used for character output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphMetrics {
    pub width: f32,
    pub height: f32,
}

impl GlyphMetrics {
    /// A 9×15 bitmap font.
    pub const BITMAP_9_BY_15: Self = Self {
        width: 9.0,
        height: 15.0,
    };

    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

impl Default for GlyphMetrics {
    fn default() -> Self {
        Self::BITMAP_9_BY_15
    }
}

/// Drawable area size in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Width over height.
    #[must_use]
    pub fn aspect(&self) -> f32 {
        self.width / self.height
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(800.0, 600.0)
    }
}

/// One glyph to draw: normalized position (`[-1, 1]`, y up), color, glyph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCall {
    pub position: Vec2,
    pub color: Rgb,
    pub glyph: char,
}

/// A graphics backend that can place single glyphs.
///
/// Calls within a frame are applied in order; a later glyph at the same
/// position replaces an earlier one.
pub trait GlyphBackend {
    /// Metrics of the font glyphs are drawn with.
    fn metrics(&self) -> GlyphMetrics;

    /// Clear the frame.
    fn begin_frame(&mut self) -> Result<(), RenderError>;

    fn draw_glyph(&mut self, call: &DrawCall) -> Result<(), RenderError>;

    /// Present the frame.
    fn end_frame(&mut self) -> Result<(), RenderError>;

    /// The drawable area changed size, in pixels.
    fn resize(&mut self, _width: u32, _height: u32) {}
}

/// Keeps every draw call in memory. Used headless and in tests.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    metrics: GlyphMetrics,
    current: Vec<DrawCall>,
    frames: Vec<Vec<DrawCall>>,
}

impl RecordingBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls drawn since the last `begin_frame`.
    #[must_use]
    pub fn calls(&self) -> &[DrawCall] {
        &self.current
    }

    /// Every presented frame, oldest first.
    #[must_use]
    pub fn frames(&self) -> &[Vec<DrawCall>] {
        &self.frames
    }

    /// Glyphs of the current frame as a string, in draw order.
    #[must_use]
    pub fn glyphs(&self) -> String {
        self.current.iter().map(|call| call.glyph).collect()
    }
}

impl GlyphBackend for RecordingBackend {
    fn metrics(&self) -> GlyphMetrics {
        self.metrics
    }

    fn begin_frame(&mut self) -> Result<(), RenderError> {
        self.current.clear();
        Ok(())
    }

    fn draw_glyph(&mut self, call: &DrawCall) -> Result<(), RenderError> {
        self.current.push(*call);
        Ok(())
    }

    fn end_frame(&mut self) -> Result<(), RenderError> {
        self.frames.push(self.current.clone());
        Ok(())
    }
}
