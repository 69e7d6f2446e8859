//! Colored character grids.

use serde::{Deserialize, Serialize};

/// An 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);

    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl From<[u8; 3]> for Rgb {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self::new(r, g, b)
    }
}

/// One character of a sprite and the color it is drawn in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub glyph: char,
    pub color: Rgb,
}

impl Cell {
    /// A blank cell.
    pub const BLANK: Self = Self {
        glyph: ' ',
        color: Rgb::WHITE,
    };

    #[must_use]
    pub const fn new(glyph: char, color: Rgb) -> Self {
        Self { glyph, color }
    }
}

/// A `height × width` grid of [`Cell`]s stored row-major in one buffer.
///
/// The cell count always equals `width * height`. Serializable for dumps,
/// but only constructible through the checked constructors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpriteAsset {
    width: u32,
    height: u32,
    base_color: Rgb,
    cells: Vec<Cell>,
}

impl SpriteAsset {
    /// A 0×0 sprite. Drawing it produces nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            width: 0,
            height: 0,
            base_color: Rgb::WHITE,
            cells: Vec::new(),
        }
    }

    /// A `width × height` sprite of blank cells in `base_color`.
    #[must_use]
    pub fn blank(width: u32, height: u32, base_color: Rgb) -> Self {
        let cells = vec![Cell::new(' ', base_color); width as usize * height as usize];
        Self {
            width,
            height,
            base_color,
            cells,
        }
    }

    /// Build a sprite from a complete row-major cell buffer.
    ///
    /// # Panics
    ///
    /// Panics if `cells.len() != width * height`.
    #[must_use]
    pub fn from_cells(width: u32, height: u32, base_color: Rgb, cells: Vec<Cell>) -> Self {
        assert_eq!(
            cells.len(),
            width as usize * height as usize,
            "sprite grid must hold exactly width * height cells"
        );
        Self {
            width,
            height,
            base_color,
            cells,
        }
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Informational tint; drawing uses per-cell colors.
    #[must_use]
    pub fn base_color(&self) -> Rgb {
        self.base_color
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// The cell at `(row, col)`, or `None` outside the grid.
    #[must_use]
    pub fn cell(&self, row: u32, col: u32) -> Option<&Cell> {
        if row >= self.height || col >= self.width {
            return None;
        }
        self.cells.get(row as usize * self.width as usize + col as usize)
    }

    /// All cells, row-major.
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Iterate rows top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        // chunks_exact(0) panics; a zero-width grid has no cells anyway.
        self.cells.chunks_exact(self.width.max(1) as usize)
    }

    /// The glyphs as text, one line per row.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut out = String::with_capacity(self.cells.len() + self.height as usize);
        for row in self.rows() {
            out.extend(row.iter().map(|cell| cell.glyph));
            out.push('\n');
        }
        out
    }
}

impl Default for SpriteAsset {
    fn default() -> Self {
        Self::empty()
    }
}
