//! PCM streams and the decoders that open them.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use hound::{SampleFormat, WavReader};
use tracing::debug;

use crate::error::AudioError;

/// Shape of a PCM stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcmFormat {
    pub sample_rate: u32,
    pub channels: u16,
    /// Bit depth of the source encoding; decoded samples are always `f32`.
    pub bits_per_sample: u16,
}

impl PcmFormat {
    #[must_use]
    pub const fn new(sample_rate: u32, channels: u16, bits_per_sample: u16) -> Self {
        Self {
            sample_rate,
            channels,
            bits_per_sample,
        }
    }
}

/// A source of interleaved `f32` samples in `[-1, 1]`.
pub trait PcmStream: Send {
    fn format(&self) -> PcmFormat;

    /// Fill `out` from the front. Returns how many samples were written;
    /// `0` means the stream is exhausted.
    ///
    /// # Errors
    ///
    /// Returns [`AudioError::Stream`] if the source cannot be read.
    fn read(&mut self, out: &mut [f32]) -> Result<usize, AudioError>;
}

/// Opens an audio file as a [`PcmStream`].
pub trait AudioDecoder: Send + Sync {
    /// # Errors
    ///
    /// Returns [`AudioError::Decode`] if the file is missing or not in a
    /// supported format.
    fn open(&self, path: &Path) -> Result<Box<dyn PcmStream>, AudioError>;
}

/// Samples already in memory.
#[derive(Debug, Clone)]
pub struct PcmBuffer {
    format: PcmFormat,
    samples: Vec<f32>,
    position: usize,
}

impl PcmBuffer {
    #[must_use]
    pub fn new(format: PcmFormat, samples: Vec<f32>) -> Self {
        Self {
            format,
            samples,
            position: 0,
        }
    }

    /// `seconds` of silence in `format`.
    #[must_use]
    pub fn silence(format: PcmFormat, seconds: f32) -> Self {
        let frames = (format.sample_rate as f32 * seconds).round() as usize;
        Self::new(format, vec![0.0; frames * usize::from(format.channels)])
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.samples.len() - self.position
    }
}

impl PcmStream for PcmBuffer {
    fn format(&self) -> PcmFormat {
        self.format
    }

    fn read(&mut self, out: &mut [f32]) -> Result<usize, AudioError> {
        let n = out.len().min(self.remaining());
        out[..n].copy_from_slice(&self.samples[self.position..self.position + n]);
        self.position += n;
        Ok(n)
    }
}

/// Decodes RIFF WAVE files (integer PCM up to 32 bits, or 32-bit float).
#[derive(Debug, Default, Clone, Copy)]
pub struct WavDecoder;

impl WavDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl AudioDecoder for WavDecoder {
    fn open(&self, path: &Path) -> Result<Box<dyn PcmStream>, AudioError> {
        let reader = WavReader::open(path).map_err(|err| AudioError::Decode {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;
        let spec = reader.spec();
        if spec.channels == 0 {
            return Err(AudioError::Decode {
                path: path.to_path_buf(),
                reason: "no channels".to_string(),
            });
        }
        let format = PcmFormat::new(spec.sample_rate, spec.channels, spec.bits_per_sample);
        debug!(
            path = %path.display(),
            sample_rate = format.sample_rate,
            channels = format.channels,
            bits = format.bits_per_sample,
            "opened wav"
        );
        Ok(Box::new(WavStream {
            reader,
            format,
            sample_format: spec.sample_format,
            scale: 1.0 / (1_u64 << (spec.bits_per_sample.clamp(1, 32) - 1)) as f32,
        }))
    }
}

struct WavStream {
    reader: WavReader<BufReader<File>>,
    format: PcmFormat,
    sample_format: SampleFormat,
    /// Maps integer samples into `[-1, 1]`.
    scale: f32,
}

impl PcmStream for WavStream {
    fn format(&self) -> PcmFormat {
        self.format
    }

    fn read(&mut self, out: &mut [f32]) -> Result<usize, AudioError> {
        let stream_err = |err: hound::Error| AudioError::Stream(err.to_string());
        let mut n = 0;
        match self.sample_format {
            SampleFormat::Float => {
                for (slot, sample) in out.iter_mut().zip(self.reader.samples::<f32>()) {
                    *slot = sample.map_err(stream_err)?;
                    n += 1;
                }
            }
            SampleFormat::Int => {
                for (slot, sample) in out.iter_mut().zip(self.reader.samples::<i32>()) {
                    *slot = sample.map_err(stream_err)? as f32 * self.scale;
                    n += 1;
                }
            }
        }
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use hound::{WavSpec, WavWriter};

    use super::*;

    fn temp_wav(name: &str, spec: WavSpec, samples: &[i16]) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("{name}_{}.wav", std::process::id()));
        let mut writer = WavWriter::create(&path, spec).unwrap();
        for &s in samples {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
        path
    }

    #[test]
    fn test_buffer_reads_in_chunks() {
        let mut buffer = PcmBuffer::new(PcmFormat::new(8000, 1, 16), vec![0.1, 0.2, 0.3]);
        let mut out = [0.0; 2];
        assert_eq!(buffer.read(&mut out).unwrap(), 2);
        assert_eq!(out, [0.1, 0.2]);
        assert_eq!(buffer.read(&mut out).unwrap(), 1);
        assert_eq!(out[0], 0.3);
        assert_eq!(buffer.read(&mut out).unwrap(), 0);
    }

    #[test]
    fn test_silence_length() {
        let buffer = PcmBuffer::silence(PcmFormat::new(100, 2, 16), 0.5);
        assert_eq!(buffer.remaining(), 100);
    }

    #[test]
    fn test_wav_decodes_format_and_samples() {
        let spec = WavSpec {
            channels: 2,
            sample_rate: 22_050,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let path = temp_wav("engine_audio_decode", spec, &[0, 16_384, -32_768, 32_767]);

        let mut stream = WavDecoder::new().open(&path).unwrap();
        assert_eq!(stream.format(), PcmFormat::new(22_050, 2, 16));

        let mut out = [9.0; 8];
        let n = stream.read(&mut out).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(n, 4);
        assert_eq!(out[0], 0.0);
        assert!((out[1] - 0.5).abs() < 1e-6);
        assert_eq!(out[2], -1.0);
        assert!(out[3] > 0.999);
        assert_eq!(stream.read(&mut out).unwrap(), 0);
    }

    #[test]
    fn test_wav_missing_file_is_decode_error() {
        let err = WavDecoder::new()
            .open(Path::new("/definitely/not/here.wav"))
            .err()
            .unwrap();
        assert!(matches!(err, AudioError::Decode { .. }));
    }

    #[test]
    fn test_wav_garbage_is_decode_error() {
        let path = std::env::temp_dir().join(format!("engine_audio_garbage_{}.wav", std::process::id()));
        std::fs::write(&path, b"not a wave file").unwrap();
        let err = WavDecoder::new().open(&path).err().unwrap();
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(err, AudioError::Decode { .. }));
    }
}
