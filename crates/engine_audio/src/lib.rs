//! # engine_audio
//!
//! Sound playback off the frame loop. Files are opened through an
//! [`AudioDecoder`] ([`WavDecoder`] for RIFF WAVE, [`MediaDecoder`] for MP3,
//! [`FileAudioDecoder`] to choose by extension), streamed as interleaved
//! `f32` samples and written to an [`AudioOutput`]: [`NullOutput`] for
//! headless runs, or `CpalOutput` with the `cpal` feature enabled.
//!
//! [`AudioSystem`] runs each playback on its own worker thread, either
//! detached or managed with a concurrency limit.

pub mod error;
pub mod media;
pub mod output;
pub mod pcm;
pub mod system;

pub use error::AudioError;
pub use media::{FileAudioDecoder, MediaDecoder};
#[cfg(feature = "cpal")]
pub use output::CpalOutput;
pub use output::{AudioOutput, AudioSink, NullOutput};
pub use pcm::{AudioDecoder, PcmBuffer, PcmFormat, PcmStream, WavDecoder};
pub use system::{AudioSystem, PlaybackHandle, PlaybackMode};
