//! Per-run mutable engine state handed to listeners, update and draw.

use engine_render::Viewport;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;

/// The engine's global state: tick counter, viewport, zoom and exit flag.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineContext {
    tick: u64,
    viewport: Viewport,
    zoom: f32,
    exit_requested: bool,
}

impl Default for EngineContext {
    fn default() -> Self {
        Self::new(Viewport::default(), 1.0)
    }
}

impl EngineContext {
    #[must_use]
    pub fn new(viewport: Viewport, zoom: f32) -> Self {
        Self {
            tick: 0,
            viewport,
            zoom,
            exit_requested: false,
        }
    }

    #[must_use]
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.viewport(), config.zoom)
    }

    /// Ticks elapsed since the run started.
    #[must_use]
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Increment the tick counter, saturating at `u64::MAX`. Returns the new
    /// value.
    pub fn advance_tick(&mut self) -> u64 {
        self.tick = self.tick.saturating_add(1);
        self.tick
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Replace the viewport. A zero-sized area has no aspect ratio, so it is
    /// ignored and `false` is returned.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            warn!(width, height, "ignoring zero-sized viewport");
            return false;
        }
        self.viewport = Viewport::new(width as f32, height as f32);
        debug!(width, height, "viewport resized");
        true
    }

    #[must_use]
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Add `delta` to the zoom factor and return the new value.
    pub fn adjust_zoom(&mut self, delta: f32) -> f32 {
        self.zoom += delta;
        debug!(zoom = self.zoom, "zoom changed");
        self.zoom
    }

    /// Ask the runner to stop before the next update.
    pub fn request_exit(&mut self) {
        if !self.exit_requested {
            info!(tick = self.tick, "exit requested");
        }
        self.exit_requested = true;
    }

    #[must_use]
    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_is_monotonic_and_saturates() {
        let mut ctx = EngineContext::default();
        assert_eq!(ctx.tick(), 0);
        assert_eq!(ctx.advance_tick(), 1);
        assert_eq!(ctx.advance_tick(), 2);

        ctx.tick = u64::MAX;
        assert_eq!(ctx.advance_tick(), u64::MAX);
    }

    #[test]
    fn test_zoom_adjusts_by_delta() {
        let mut ctx = EngineContext::default();
        ctx.adjust_zoom(0.5);
        ctx.adjust_zoom(-0.25);
        assert!((ctx.zoom() - 1.25).abs() < f32::EPSILON);
    }

    #[test]
    fn test_resize_replaces_viewport() {
        let mut ctx = EngineContext::default();
        assert!(ctx.resize(320, 200));
        assert_eq!(ctx.viewport(), Viewport::new(320.0, 200.0));
    }

    #[test]
    fn test_zero_sized_resize_keeps_viewport() {
        let mut ctx = EngineContext::default();
        ctx.resize(320, 200);
        assert!(!ctx.resize(720, 0));
        assert!(!ctx.resize(0, 360));
        assert_eq!(ctx.viewport(), Viewport::new(320.0, 200.0));
        assert!(ctx.viewport().aspect().is_finite());
    }

    #[test]
    fn test_from_config() {
        let config = EngineConfig::default().with_viewport(100, 50);
        let ctx = EngineContext::from_config(&config);
        assert_eq!(ctx.viewport(), Viewport::new(100.0, 50.0));
        assert_eq!(ctx.zoom(), 1.0);
        assert!(!ctx.exit_requested());
    }
}
