//! Character grid + placement → backend draw calls.
//!
//! Cell `(i, j)` of a sprite lands at
//!
//! ```text
//! aspect = viewport.width / viewport.height
//! fix_x  = aspect * 1.5 * scale.x
//! fix_y  = aspect * scale.y * glyph.width
//! x = (-1 + (pos.x + j / fix_x) * 0.03) * zoom
//! y = ( 1 - (pos.y + (i + 1) * fix_y / glyph.height) * 0.04) * zoom
//! ```
//!
//! in normalized device coordinates. Calls are emitted row-major (row 0
//! first, columns ascending) so overlapping glyphs resolve in painter's
//! order the same way on every frame.

use engine_math::Transform2D;
use engine_sprite::SpriteAsset;
use glam::{IVec2, Vec2};
use tracing::trace;

use crate::backend::{DrawCall, GlyphBackend, GlyphMetrics, Viewport};
use crate::error::RenderError;

/// Normalized coordinate of the top-left anchor.
pub const ORIGIN: Vec2 = Vec2::new(-1.0, 1.0);

/// Normalized distance of one logical unit along each axis.
pub const UNIT_STEP: Vec2 = Vec2::new(0.03, 0.04);

/// Horizontal spread applied on top of the aspect ratio.
const HORIZONTAL_SPREAD: f32 = 1.5;

/// Where and how large to draw a sprite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub position: IVec2,
    pub scale: Vec2,
    pub viewport: Viewport,
    pub zoom: f32,
}

impl Placement {
    #[must_use]
    pub fn new(transform: &Transform2D, viewport: Viewport, zoom: f32) -> Self {
        Self {
            position: transform.position,
            scale: transform.scale,
            viewport,
            zoom,
        }
    }

    /// Screen position of cell `(row, col)`.
    #[must_use]
    pub fn cell_position(&self, metrics: GlyphMetrics, row: u32, col: u32) -> Vec2 {
        let aspect = self.viewport.aspect();
        let fix_x = aspect * HORIZONTAL_SPREAD * self.scale.x;
        let fix_y = aspect * self.scale.y * metrics.width;

        let offset = Vec2::new(
            self.position.x as f32 + col as f32 / fix_x,
            self.position.y as f32 + (row + 1) as f32 * fix_y / metrics.height,
        );
        Vec2::new(ORIGIN.x + offset.x * UNIT_STEP.x, ORIGIN.y - offset.y * UNIT_STEP.y) * self.zoom
    }
}

/// One draw call per cell of `sprite`, row-major.
pub fn compose(
    sprite: &SpriteAsset,
    placement: Placement,
    metrics: GlyphMetrics,
) -> impl Iterator<Item = DrawCall> + '_ {
    let width = sprite.width().max(1);
    sprite.cells().iter().enumerate().map(move |(index, cell)| {
        let row = index as u32 / width;
        let col = index as u32 % width;
        DrawCall {
            position: placement.cell_position(metrics, row, col),
            color: cell.color,
            glyph: cell.glyph,
        }
    })
}

/// Composite `sprite` into `backend`. Returns the number of glyphs drawn.
///
/// # Errors
///
/// Propagates backend failures.
pub fn draw_sprite<B: GlyphBackend + ?Sized>(
    sprite: &SpriteAsset,
    placement: Placement,
    backend: &mut B,
) -> Result<usize, RenderError> {
    let metrics = backend.metrics();
    let mut drawn = 0;
    for call in compose(sprite, placement, metrics) {
        backend.draw_glyph(&call)?;
        drawn += 1;
    }
    trace!(drawn, x = placement.position.x, y = placement.position.y, "composited sprite");
    Ok(drawn)
}
