//! # engine_math
//!
//! Math types for the character-art engine. Re-exports [`glam`] for vector
//! types and defines the [`Transform2D`] component that places an entity's
//! sprite on screen.

pub mod transform;

// Re-export glam types for convenience.
pub use glam::{IVec2, Vec2};

pub use transform::Transform2D;
