//! # engine_render
//!
//! Everything between an entity's components and the screen:
//!
//! - [`SpriteRenderComponent`] and [`AnimationComponent`]: what to draw.
//! - [`compositor`]: projects a sprite and its placement into [`DrawCall`]s.
//! - [`draw_static`] / [`draw_animated`]: the two entity-level call sites.
//! - [`GlyphBackend`]: the output seam, with [`RecordingBackend`] (headless)
//!   and [`TerminalBackend`] (crossterm) implementations.

pub mod animation;
pub mod backend;
pub mod compositor;
pub mod draw;
pub mod error;
pub mod sprite_render;
pub mod terminal;

pub use animation::{AnimationComponent, DEFAULT_DELAY};
pub use backend::{DrawCall, GlyphBackend, GlyphMetrics, RecordingBackend, Viewport};
pub use compositor::{Placement, compose, draw_sprite};
pub use draw::{draw_animated, draw_static};
pub use error::{AnimationError, RenderError};
pub use sprite_render::{SpriteBundle, SpriteRenderComponent};
pub use terminal::TerminalBackend;
