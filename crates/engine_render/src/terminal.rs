//! Terminal glyph backend built on crossterm.
//!
//! Normalized coordinates (`[-1, 1]` on both axes, y up) are mapped onto the
//! terminal's cell grid. Draw calls land in an in-memory frame buffer, so a
//! later glyph in the same cell replaces an earlier one; `end_frame` writes
//! the whole buffer with 24-bit foreground colors.

use std::io::{self, Stdout, Write};

use crossterm::{
    cursor::{Hide, MoveTo, Show},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen, SetTitle},
};
use engine_sprite::Rgb;
use glam::Vec2;
use tracing::{debug, warn};

use crate::backend::{DrawCall, GlyphBackend, GlyphMetrics, Viewport};
use crate::error::RenderError;

/// Renders glyphs into a terminal.
pub struct TerminalBackend<W: Write = Stdout> {
    out: W,
    metrics: GlyphMetrics,
    cols: u16,
    rows: u16,
    buffer: Vec<Option<(char, Rgb)>>,
    title: Option<String>,
    /// Whether raw mode and the alternate screen are active.
    entered: bool,
}

impl TerminalBackend<Stdout> {
    /// A backend on stdout sized to the current terminal.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal size cannot be queried.
    pub fn stdout(metrics: GlyphMetrics) -> Result<Self, RenderError> {
        let (cols, rows) = terminal::size()?;
        Ok(Self::with_writer(io::stdout(), cols, rows, metrics))
    }
}

impl<W: Write> TerminalBackend<W> {
    /// A backend writing to `out`, with a `cols × rows` grid.
    #[must_use]
    pub fn with_writer(out: W, cols: u16, rows: u16, metrics: GlyphMetrics) -> Self {
        Self {
            out,
            metrics,
            cols,
            rows,
            buffer: vec![None; usize::from(cols) * usize::from(rows)],
            title: None,
            entered: false,
        }
    }

    /// Title set on the terminal window by [`TerminalBackend::enter`].
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Switch to raw mode and the alternate screen, hide the cursor.
    ///
    /// Raw mode is switched back off if the screen cannot be set up.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal rejects the mode change.
    pub fn enter(&mut self) -> Result<(), RenderError> {
        self.enter_with(terminal::enable_raw_mode, terminal::disable_raw_mode)
    }

    fn enter_with(
        &mut self,
        enable_raw: impl FnOnce() -> io::Result<()>,
        disable_raw: impl FnOnce() -> io::Result<()>,
    ) -> Result<(), RenderError> {
        enable_raw()?;
        if let Err(err) = self.enter_screen() {
            if let Err(raw) = disable_raw() {
                warn!(%raw, "failed to leave raw mode");
            }
            return Err(err.into());
        }
        self.entered = true;
        debug!(cols = self.cols, rows = self.rows, "entered terminal");
        Ok(())
    }

    fn enter_screen(&mut self) -> io::Result<()> {
        queue!(self.out, EnterAlternateScreen, Hide, Clear(ClearType::All))?;
        if let Some(title) = &self.title {
            queue!(self.out, SetTitle(title))?;
        }
        self.out.flush()
    }

    /// Restore the terminal. Safe to call more than once.
    ///
    /// # Errors
    ///
    /// Returns an error if the screen or the terminal mode cannot be
    /// restored. Both are attempted either way.
    pub fn exit(&mut self) -> Result<(), RenderError> {
        self.exit_with(terminal::disable_raw_mode)
    }

    fn exit_with(
        &mut self,
        disable_raw: impl FnOnce() -> io::Result<()>,
    ) -> Result<(), RenderError> {
        if !self.entered {
            return Ok(());
        }
        self.entered = false;
        let screen = execute!(self.out, ResetColor, Show, LeaveAlternateScreen);
        let raw = disable_raw();
        screen?;
        raw?;
        debug!("left terminal");
        Ok(())
    }

    /// Change the cell grid size. Clears the frame buffer.
    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.cols = cols;
        self.rows = rows;
        self.buffer = vec![None; usize::from(cols) * usize::from(rows)];
    }

    #[must_use]
    pub fn size(&self) -> (u16, u16) {
        (self.cols, self.rows)
    }

    /// The grid's extent in pixels under the backend's glyph metrics.
    #[must_use]
    pub fn viewport(&self) -> Viewport {
        Viewport::new(
            f32::from(self.cols) * self.metrics.width,
            f32::from(self.rows) * self.metrics.height,
        )
    }

    /// The terminal cell `(col, row)` a normalized position falls in.
    #[must_use]
    pub fn cell_for(&self, position: Vec2) -> Option<(u16, u16)> {
        let col = ((position.x + 1.0) / 2.0 * f32::from(self.cols)).floor();
        let row = ((1.0 - position.y) / 2.0 * f32::from(self.rows)).floor();
        let in_range = |v: f32, max: u16| v.is_finite() && v >= 0.0 && v < f32::from(max);
        if in_range(col, self.cols) && in_range(row, self.rows) {
            Some((col as u16, row as u16))
        } else {
            None
        }
    }

    /// What the frame buffer holds at `(col, row)`.
    #[must_use]
    pub fn cell_at(&self, col: u16, row: u16) -> Option<(char, Rgb)> {
        if col >= self.cols || row >= self.rows {
            return None;
        }
        self.buffer[usize::from(row) * usize::from(self.cols) + usize::from(col)]
    }

    /// Borrow the underlying writer.
    #[must_use]
    pub fn writer(&self) -> &W {
        &self.out
    }
}

impl<W: Write> GlyphBackend for TerminalBackend<W> {
    fn metrics(&self) -> GlyphMetrics {
        self.metrics
    }

    fn begin_frame(&mut self) -> Result<(), RenderError> {
        self.buffer.fill(None);
        Ok(())
    }

    fn draw_glyph(&mut self, call: &DrawCall) -> Result<(), RenderError> {
        if let Some((col, row)) = self.cell_for(call.position) {
            let index = usize::from(row) * usize::from(self.cols) + usize::from(col);
            self.buffer[index] = Some((call.glyph, call.color));
        }
        Ok(())
    }

    fn end_frame(&mut self) -> Result<(), RenderError> {
        let mut last_color: Option<Rgb> = None;
        for row in 0..self.rows {
            queue!(self.out, MoveTo(0, row))?;
            let start = usize::from(row) * usize::from(self.cols);
            for cell in &self.buffer[start..start + usize::from(self.cols)] {
                match cell {
                    Some((glyph, color)) => {
                        if last_color != Some(*color) {
                            queue!(
                                self.out,
                                SetForegroundColor(Color::Rgb {
                                    r: color.r,
                                    g: color.g,
                                    b: color.b,
                                })
                            )?;
                            last_color = Some(*color);
                        }
                        queue!(self.out, Print(*glyph))?;
                    }
                    None => queue!(self.out, Print(' '))?,
                }
            }
        }
        queue!(self.out, ResetColor)?;
        self.out.flush()?;
        Ok(())
    }

    /// Pixels are converted to cells with the backend's glyph metrics.
    fn resize(&mut self, width: u32, height: u32) {
        let cells = |pixels: u32, extent: f32| {
            (pixels as f32 / extent).round().clamp(0.0, f32::from(u16::MAX)) as u16
        };
        let cols = cells(width, self.metrics.width);
        let rows = cells(height, self.metrics.height);
        TerminalBackend::resize(self, cols, rows);
    }
}

impl<W: Write> Drop for TerminalBackend<W> {
    fn drop(&mut self) {
        if let Err(err) = self.exit() {
            warn!(%err, "failed to restore terminal");
        }
    }
}

impl<W: Write> std::fmt::Debug for TerminalBackend<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerminalBackend")
            .field("cols", &self.cols)
            .field("rows", &self.rows)
            .field("metrics", &self.metrics)
            .field("entered", &self.entered)
            .finish_non_exhaustive()
    }
}
