//! Compressed audio through symphonia, and the extension-based decoder the
//! binary uses.

use std::ffi::OsStr;
use std::fs::File;
use std::io;
use std::path::Path;

use symphonia::core::audio::{SampleBuffer, SignalSpec};
use symphonia::core::codecs::{Decoder, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, warn};

use crate::error::AudioError;
use crate::pcm::{AudioDecoder, PcmFormat, PcmStream, WavDecoder};

/// Decodes MP3 and the other formats symphonia is built with, probing the
/// container from the file contents and its extension.
#[derive(Debug, Default, Clone, Copy)]
pub struct MediaDecoder;

impl MediaDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl AudioDecoder for MediaDecoder {
    fn open(&self, path: &Path) -> Result<Box<dyn PcmStream>, AudioError> {
        let decode_err = |reason: String| AudioError::Decode {
            path: path.to_path_buf(),
            reason,
        };

        let file = File::open(path).map_err(|err| decode_err(err.to_string()))?;
        let source = MediaSourceStream::new(Box::new(file), Default::default());
        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(OsStr::to_str) {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                source,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|err| decode_err(err.to_string()))?;
        let reader = probed.format;
        let track = reader
            .default_track()
            .ok_or_else(|| decode_err("no audio track".to_string()))?;
        let track_id = track.id;
        let params = track.codec_params.clone();
        let decoder = symphonia::default::get_codecs()
            .make(&params, &DecoderOptions::default())
            .map_err(|err| decode_err(err.to_string()))?;

        let mut stream = MediaStream {
            reader,
            decoder,
            track_id,
            format: PcmFormat::new(0, 0, 0),
            pending: Vec::new(),
            position: 0,
            spec: None,
            finished: false,
        };

        // MP3 streams may only announce their layout in the first frame.
        let (sample_rate, channels) = match (params.sample_rate, params.channels) {
            (Some(rate), Some(channels)) => (rate, channels.count()),
            _ => {
                stream.fill().map_err(|err| decode_err(err.to_string()))?;
                let spec = stream
                    .spec
                    .ok_or_else(|| decode_err("no decodable audio".to_string()))?;
                (spec.rate, spec.channels.count())
            }
        };
        let channels = u16::try_from(channels)
            .ok()
            .filter(|&n| n > 0)
            .ok_or_else(|| decode_err(format!("unsupported channel count {channels}")))?;
        let bits = params
            .bits_per_sample
            .and_then(|bits| u16::try_from(bits).ok())
            .unwrap_or(16);

        stream.format = PcmFormat::new(sample_rate, channels, bits);
        debug!(
            path = %path.display(),
            sample_rate,
            channels,
            "opened compressed audio"
        );
        Ok(Box::new(stream))
    }
}

struct MediaStream {
    reader: Box<dyn FormatReader>,
    decoder: Box<dyn Decoder>,
    track_id: u32,
    format: PcmFormat,
    /// Interleaved samples of the last decoded packet.
    pending: Vec<f32>,
    position: usize,
    spec: Option<SignalSpec>,
    finished: bool,
}

impl MediaStream {
    /// Decode the next packet of our track into `pending`. Returns `false`
    /// at the end of the stream.
    fn fill(&mut self) -> Result<bool, SymphoniaError> {
        loop {
            let packet = match self.reader.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(err)) if err.kind() == io::ErrorKind::UnexpectedEof => {
                    self.finished = true;
                    return Ok(false);
                }
                Err(SymphoniaError::ResetRequired) => {
                    self.finished = true;
                    return Ok(false);
                }
                Err(err) => return Err(err),
            };
            if packet.track_id() != self.track_id {
                continue;
            }

            match self.decoder.decode(&packet) {
                Ok(decoded) => {
                    let spec = *decoded.spec();
                    let mut samples = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
                    samples.copy_interleaved_ref(decoded);
                    self.pending.clear();
                    self.pending.extend_from_slice(samples.samples());
                    self.position = 0;
                    self.spec.get_or_insert(spec);
                    return Ok(true);
                }
                Err(SymphoniaError::DecodeError(reason)) => {
                    warn!(reason, "skipping undecodable packet");
                }
                Err(err) => return Err(err),
            }
        }
    }
}

impl PcmStream for MediaStream {
    fn format(&self) -> PcmFormat {
        self.format
    }

    fn read(&mut self, out: &mut [f32]) -> Result<usize, AudioError> {
        let mut n = 0;
        while n < out.len() {
            if self.position == self.pending.len() {
                if self.finished {
                    break;
                }
                if !self.fill().map_err(|err| AudioError::Stream(err.to_string()))? {
                    break;
                }
                continue;
            }
            let take = (out.len() - n).min(self.pending.len() - self.position);
            out[n..n + take].copy_from_slice(&self.pending[self.position..self.position + take]);
            n += take;
            self.position += take;
        }
        Ok(n)
    }
}

/// Picks a decoder by file extension: `.wav` goes to [`WavDecoder`],
/// everything else (`.mp3` included) to [`MediaDecoder`].
#[derive(Debug, Default, Clone, Copy)]
pub struct FileAudioDecoder {
    wav: WavDecoder,
    media: MediaDecoder,
}

impl FileAudioDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl AudioDecoder for FileAudioDecoder {
    fn open(&self, path: &Path) -> Result<Box<dyn PcmStream>, AudioError> {
        let is_wav = path
            .extension()
            .and_then(OsStr::to_str)
            .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"));
        if is_wav {
            self.wav.open(path)
        } else {
            self.media.open(path)
        }
    }
}
