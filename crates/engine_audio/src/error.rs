//! Audio error types.

use std::path::PathBuf;

/// Errors raised by decoding, output and playback management.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AudioError {
    /// The output device or stream could not be initialized.
    #[error("audio output unavailable: {0}")]
    Init(String),

    #[error("failed to decode {path}: {reason}")]
    Decode { path: PathBuf, reason: String },

    /// Reading samples or writing them to the device failed mid-playback.
    #[error("audio stream failed: {0}")]
    Stream(String),

    #[error("playback limit of {limit} concurrent sounds reached")]
    Saturated { limit: usize },

    #[error("playback worker panicked")]
    WorkerPanicked,
}
