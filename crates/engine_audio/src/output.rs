//! Audio output seam: a device opens sinks, sinks accept samples.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::error::AudioError;
use crate::pcm::PcmFormat;

/// An output device. Shared between playback workers.
pub trait AudioOutput: Send + Sync {
    /// Open a sink for one playback. Called on the worker thread.
    ///
    /// # Errors
    ///
    /// Returns [`AudioError::Init`] if the device cannot play `format`.
    fn open(&self, format: PcmFormat) -> Result<Box<dyn AudioSink>, AudioError>;
}

/// One open playback on a device.
pub trait AudioSink {
    /// Queue interleaved samples. May block while the device catches up.
    ///
    /// # Errors
    ///
    /// Returns [`AudioError::Stream`] if the device fails.
    fn write(&mut self, samples: &[f32]) -> Result<(), AudioError>;

    /// Block until everything written has been played.
    ///
    /// # Errors
    ///
    /// Returns [`AudioError::Stream`] if the device fails.
    fn finish(&mut self) -> Result<(), AudioError> {
        Ok(())
    }
}

/// Discards samples, counting them. With [`NullOutput::realtime`] each write
/// takes as long as the samples would take to play.
#[derive(Debug, Clone, Default)]
pub struct NullOutput {
    realtime: bool,
    written: Arc<AtomicUsize>,
}

impl NullOutput {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn realtime() -> Self {
        Self {
            realtime: true,
            ..Self::default()
        }
    }

    /// Samples written across every sink opened from this output or its
    /// clones.
    #[must_use]
    pub fn samples_written(&self) -> usize {
        self.written.load(Ordering::Relaxed)
    }
}

impl AudioOutput for NullOutput {
    fn open(&self, format: PcmFormat) -> Result<Box<dyn AudioSink>, AudioError> {
        let samples_per_second = u64::from(format.sample_rate) * u64::from(format.channels);
        Ok(Box::new(NullSink {
            pace: self.realtime.then_some(samples_per_second).filter(|&rate| rate > 0),
            written: Arc::clone(&self.written),
        }))
    }
}

struct NullSink {
    pace: Option<u64>,
    written: Arc<AtomicUsize>,
}

impl AudioSink for NullSink {
    fn write(&mut self, samples: &[f32]) -> Result<(), AudioError> {
        self.written.fetch_add(samples.len(), Ordering::Relaxed);
        if let Some(rate) = self.pace {
            let nanos = samples.len() as u64 * 1_000_000_000 / rate;
            std::thread::sleep(Duration::from_nanos(nanos));
        }
        Ok(())
    }
}

#[cfg(feature = "cpal")]
pub use device::CpalOutput;

#[cfg(feature = "cpal")]
mod device {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex, PoisonError};
    use std::time::Duration;

    use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
    use tracing::{info, warn};

    use super::{AudioOutput, AudioSink};
    use crate::error::AudioError;
    use crate::pcm::PcmFormat;

    const POLL: Duration = Duration::from_millis(5);

    type Queue = Arc<Mutex<VecDeque<f32>>>;

    /// The host's default output device.
    #[derive(Debug, Default, Clone, Copy)]
    pub struct CpalOutput;

    impl CpalOutput {
        #[must_use]
        pub fn new() -> Self {
            Self
        }
    }

    impl AudioOutput for CpalOutput {
        fn open(&self, format: PcmFormat) -> Result<Box<dyn AudioSink>, AudioError> {
            let host = cpal::default_host();
            let device = host
                .default_output_device()
                .ok_or_else(|| AudioError::Init("no default output device".to_string()))?;
            let config = cpal::StreamConfig {
                channels: format.channels,
                sample_rate: cpal::SampleRate(format.sample_rate),
                buffer_size: cpal::BufferSize::Default,
            };

            let queue: Queue = Arc::default();
            let feed = Arc::clone(&queue);
            let stream = device
                .build_output_stream(
                    &config,
                    move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                        let mut queue = feed.lock().unwrap_or_else(PoisonError::into_inner);
                        for slot in data.iter_mut() {
                            *slot = queue.pop_front().unwrap_or(0.0);
                        }
                    },
                    |err| warn!(%err, "audio stream error"),
                    None,
                )
                .map_err(|err| AudioError::Init(err.to_string()))?;
            stream.play().map_err(|err| AudioError::Init(err.to_string()))?;

            info!(
                device = device.name().unwrap_or_else(|_| "unknown".to_string()),
                sample_rate = format.sample_rate,
                channels = format.channels,
                "opened audio device"
            );

            // About a quarter second of buffered audio.
            let capacity = (format.sample_rate as usize * usize::from(format.channels) / 4).max(1);
            Ok(Box::new(CpalSink {
                _stream: stream,
                queue,
                capacity,
            }))
        }
    }

    struct CpalSink {
        _stream: cpal::Stream,
        queue: Queue,
        capacity: usize,
    }

    impl CpalSink {
        fn queued(&self) -> usize {
            self.queue.lock().unwrap_or_else(PoisonError::into_inner).len()
        }
    }

    impl AudioSink for CpalSink {
        fn write(&mut self, samples: &[f32]) -> Result<(), AudioError> {
            while self.queued() >= self.capacity {
                std::thread::sleep(POLL);
            }
            self.queue
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .extend(samples.iter().copied());
            Ok(())
        }

        fn finish(&mut self) -> Result<(), AudioError> {
            while self.queued() > 0 {
                std::thread::sleep(POLL);
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;

    #[test]
    fn test_null_output_counts_across_clones() {
        let output = NullOutput::new();
        let shared = output.clone();
        let mut sink = shared.open(PcmFormat::new(8000, 1, 16)).unwrap();
        sink.write(&[0.0; 10]).unwrap();
        sink.write(&[0.0; 5]).unwrap();
        sink.finish().unwrap();
        assert_eq!(output.samples_written(), 15);
    }

    #[test]
    fn test_realtime_null_output_paces_writes() {
        let output = NullOutput::realtime();
        let mut sink = output.open(PcmFormat::new(1000, 2, 16)).unwrap();
        let start = Instant::now();
        // 40 stereo samples at 1 kHz is 20 ms.
        sink.write(&[0.0; 40]).unwrap();
        assert!(start.elapsed() >= Duration::from_millis(20));
    }
}
