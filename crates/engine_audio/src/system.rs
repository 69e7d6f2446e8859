//! Background playback.
//!
//! Each [`AudioSystem::play`] spawns one worker thread that decodes the file
//! and streams it into a sink opened on the output device. Opening the file
//! and the sink happens before `play` returns, so setup failures surface to
//! the caller; failures after that are logged by the worker and reported by
//! [`PlaybackHandle::join`].

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use tracing::{debug, info, warn};

use crate::error::AudioError;
use crate::output::{AudioOutput, AudioSink};
use crate::pcm::{AudioDecoder, PcmStream};

/// Frames moved per worker iteration. Stop requests are checked between
/// chunks.
const CHUNK_FRAMES: usize = 1024;

/// How the system treats spawned playbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackMode {
    /// Fire and forget: workers are not tracked and may overlap freely.
    #[default]
    Detached,
    /// Workers are tracked, at most `max_concurrent` run at once, and
    /// dropping the system stops and joins them.
    Managed { max_concurrent: usize },
}

struct Playback {
    id: u64,
    path: PathBuf,
    stop: AtomicBool,
    finished: AtomicBool,
    worker: Mutex<Option<JoinHandle<Result<(), AudioError>>>>,
    outcome: Mutex<Option<Result<(), AudioError>>>,
}

/// A running or finished playback. Clones refer to the same playback.
#[derive(Clone)]
pub struct PlaybackHandle {
    inner: Arc<Playback>,
}

impl std::fmt::Debug for PlaybackHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackHandle")
            .field("id", &self.inner.id)
            .field("path", &self.inner.path)
            .field("finished", &self.is_finished())
            .finish()
    }
}

impl PlaybackHandle {
    #[must_use]
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// Ask the worker to stop after its current chunk.
    pub fn stop(&self) {
        self.inner.stop.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.inner.finished.load(Ordering::Acquire)
    }

    /// Wait for the worker and return how the playback ended. Later calls,
    /// from this handle or a clone, return the recorded outcome.
    ///
    /// # Errors
    ///
    /// The worker's stream error, or [`AudioError::WorkerPanicked`].
    pub fn join(&self) -> Result<(), AudioError> {
        let worker = self
            .inner
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(worker) = worker {
            let outcome = worker.join().unwrap_or(Err(AudioError::WorkerPanicked));
            *self.inner.outcome.lock().unwrap_or_else(PoisonError::into_inner) =
                Some(outcome.clone());
            return outcome;
        }
        self.inner
            .outcome
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .unwrap_or(Ok(()))
    }
}

/// Plays audio files on background workers.
pub struct AudioSystem {
    decoder: Arc<dyn AudioDecoder>,
    output: Arc<dyn AudioOutput>,
    mode: PlaybackMode,
    active: Vec<PlaybackHandle>,
    next_id: u64,
}

impl std::fmt::Debug for AudioSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioSystem")
            .field("mode", &self.mode)
            .field("active", &self.active)
            .field("next_id", &self.next_id)
            .finish_non_exhaustive()
    }
}

impl AudioSystem {
    pub fn new(
        decoder: impl AudioDecoder + 'static,
        output: impl AudioOutput + 'static,
        mode: PlaybackMode,
    ) -> Self {
        Self {
            decoder: Arc::new(decoder),
            output: Arc::new(output),
            mode,
            active: Vec::new(),
            next_id: 1,
        }
    }

    #[must_use]
    pub fn mode(&self) -> PlaybackMode {
        self.mode
    }

    /// Playbacks still running. Always 0 in detached mode.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.active.iter().filter(|handle| !handle.is_finished()).count()
    }

    /// Start playing `path` on a new worker.
    ///
    /// # Errors
    ///
    /// - [`AudioError::Saturated`] if managed and at the concurrency limit.
    /// - [`AudioError::Decode`] if the file cannot be opened.
    /// - [`AudioError::Init`] if the output device cannot be opened.
    /// - [`AudioError::WorkerPanicked`] if the worker died during setup.
    pub fn play(&mut self, path: impl AsRef<Path>) -> Result<PlaybackHandle, AudioError> {
        let path = path.as_ref().to_path_buf();

        if let PlaybackMode::Managed { max_concurrent } = self.mode {
            self.reap();
            if self.active.len() >= max_concurrent {
                warn!(path = %path.display(), limit = max_concurrent, "playback rejected");
                return Err(AudioError::Saturated {
                    limit: max_concurrent,
                });
            }
        }

        let id = self.next_id;
        self.next_id += 1;

        let playback = Arc::new(Playback {
            id,
            path: path.clone(),
            stop: AtomicBool::new(false),
            finished: AtomicBool::new(false),
            worker: Mutex::new(None),
            outcome: Mutex::new(None),
        });

        let (ready_tx, ready_rx) = mpsc::sync_channel(1);
        let decoder = Arc::clone(&self.decoder);
        let output = Arc::clone(&self.output);
        let state = Arc::clone(&playback);
        let worker = thread::Builder::new()
            .name(format!("audio-{id}"))
            .spawn(move || {
                let outcome = stream(&state, decoder.as_ref(), output.as_ref(), &ready_tx);
                state.finished.store(true, Ordering::Release);
                outcome
            })
            .map_err(|err| AudioError::Init(format!("failed to spawn worker: {err}")))?;

        match ready_rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                let _ = worker.join();
                return Err(err);
            }
            Err(_) => {
                let _ = worker.join();
                return Err(AudioError::WorkerPanicked);
            }
        }

        *playback.worker.lock().unwrap_or_else(PoisonError::into_inner) = Some(worker);
        let handle = PlaybackHandle { inner: playback };
        info!(id, path = %path.display(), mode = ?self.mode, "playback started");

        if matches!(self.mode, PlaybackMode::Managed { .. }) {
            self.active.push(handle.clone());
        }
        Ok(handle)
    }

    /// Stop every tracked playback and wait for its worker.
    pub fn stop_all(&mut self) {
        for handle in &self.active {
            handle.stop();
        }
        for handle in self.active.drain(..) {
            if let Err(err) = handle.join() {
                warn!(id = handle.id(), %err, "playback ended with error");
            }
        }
    }

    /// Join tracked playbacks that have finished.
    fn reap(&mut self) {
        let (done, running): (Vec<_>, Vec<_>) =
            self.active.drain(..).partition(PlaybackHandle::is_finished);
        self.active = running;
        for handle in done {
            if let Err(err) = handle.join() {
                warn!(id = handle.id(), %err, "playback ended with error");
            }
        }
    }
}

impl Drop for AudioSystem {
    fn drop(&mut self) {
        if !self.active.is_empty() {
            debug!(count = self.active.len(), "stopping playbacks");
            self.stop_all();
        }
    }
}

/// Worker body: open, signal readiness, then pump chunks until the stream
/// ends or a stop is requested.
fn stream(
    playback: &Playback,
    decoder: &dyn AudioDecoder,
    output: &dyn AudioOutput,
    ready: &mpsc::SyncSender<Result<(), AudioError>>,
) -> Result<(), AudioError> {
    let opened = decoder.open(&playback.path).and_then(|pcm| {
        let sink = output.open(pcm.format())?;
        Ok((pcm, sink))
    });
    let (mut pcm, mut sink) = match opened {
        Ok(parts) => {
            let _ = ready.send(Ok(()));
            parts
        }
        Err(err) => {
            let _ = ready.send(Err(err.clone()));
            return Err(err);
        }
    };

    let result = pump(playback, pcm.as_mut(), sink.as_mut());
    match &result {
        Ok(()) => info!(id = playback.id, path = %playback.path.display(), "playback finished"),
        Err(err) => warn!(id = playback.id, path = %playback.path.display(), %err, "playback failed"),
    }
    result
}

fn pump(
    playback: &Playback,
    pcm: &mut dyn PcmStream,
    sink: &mut dyn AudioSink,
) -> Result<(), AudioError> {
    let mut buffer = vec![0.0; CHUNK_FRAMES * usize::from(pcm.format().channels.max(1))];
    loop {
        if playback.stop.load(Ordering::Acquire) {
            debug!(id = playback.id, "playback stopped");
            return Ok(());
        }
        let n = pcm.read(&mut buffer)?;
        if n == 0 {
            return sink.finish();
        }
        sink.write(&buffer[..n])?;
    }
}
