//! Render-layer error types.

/// Errors from the animation state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AnimationError {
    /// The animation has no frames.
    #[error("animation has no frames")]
    Empty,

    /// A frame delay of zero ticks was requested.
    #[error("animation delay must be at least one tick")]
    ZeroDelay,
}

/// Errors that can occur while drawing.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// Writing to the output device failed.
    #[error("render output error: {0}")]
    Io(#[from] std::io::Error),

    /// The animated draw could not resolve a frame.
    #[error(transparent)]
    Animation(#[from] AnimationError),

    /// The entity lacks a component the draw routine reads.
    #[error("entity is missing component {0}")]
    MissingComponent(&'static str),
}
