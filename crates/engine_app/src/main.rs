//! # ascii-engine
//!
//! Loads image files as the frames of a character-art animation and plays it
//! in the terminal.
//!
//! Keys: `w`/`a`/`s`/`d` move the sprite, `[`/`]` zoom in and out, `x` plays
//! the `--audio` file, `Esc` quits. Logs go to stderr; redirect it
//! (`2>engine.log`) to keep them off the frame.

mod controls;
mod scene;

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use engine_audio::{AudioSystem, FileAudioDecoder, PlaybackMode};
use engine_component::EntityAllocator;
use engine_math::{Transform2D, Vec2};
use engine_render::TerminalBackend;
use engine_runtime::{EngineConfig, EngineRunner, TerminalEvents};
use tracing::info;
use tracing_subscriber::EnvFilter;

use scene::DemoScene;

#[derive(Parser, Debug)]
#[command(name = "ascii-engine", about = "Character-art sprite animation in the terminal")]
struct Args {
    /// Image files, one per animation frame, in play order
    #[arg(required = true)]
    frames: Vec<PathBuf>,

    /// JSON engine config; flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Ticks between animation frames
    #[arg(short, long)]
    delay: Option<u64>,

    /// Target ticks per second
    #[arg(long)]
    tick_rate: Option<f64>,

    /// Stop after this many ticks (0 = run until Esc)
    #[arg(long)]
    max_ticks: Option<u64>,

    /// WAV or MP3 file played when `x` is pressed
    #[arg(short, long)]
    audio: Option<PathBuf>,

    /// Track playbacks and allow at most N at once (default: fire and forget)
    #[arg(long, value_name = "N")]
    managed_audio: Option<usize>,

    /// Sprite scale; smaller values spread glyphs further apart
    #[arg(long, num_args = 2, value_names = ["SX", "SY"])]
    scale: Option<Vec<f32>>,
}

impl Args {
    /// Defaults, then the config file, then the environment, then flags.
    fn engine_config(&self) -> Result<EngineConfig> {
        let mut config = match &self.config {
            Some(path) => EngineConfig::from_json_file(path)?,
            None => EngineConfig::default(),
        }
        .with_env_overrides()?;

        if let Some(delay) = self.delay {
            config = config.with_animation_delay(delay);
        }
        if let Some(tick_rate) = self.tick_rate {
            config = config.with_tick_rate(tick_rate);
        }
        if let Some(max_ticks) = self.max_ticks {
            config = config.with_max_ticks(max_ticks);
        }
        config.validate()?;
        Ok(config)
    }

    fn scale(&self) -> Result<Vec2> {
        let scale = match self.scale.as_deref() {
            Some(&[sx, sy]) => Vec2::new(sx, sy),
            _ => Vec2::ONE,
        };
        if !Transform2D::is_valid_scale(scale) {
            bail!("--scale must be two positive finite numbers, got {scale}");
        }
        Ok(scale)
    }

    fn playback_mode(&self) -> PlaybackMode {
        self.managed_audio
            .map_or(PlaybackMode::Detached, |max_concurrent| PlaybackMode::Managed {
                max_concurrent,
            })
    }
}

#[cfg(feature = "cpal")]
fn audio_system(mode: PlaybackMode) -> AudioSystem {
    AudioSystem::new(FileAudioDecoder::new(), engine_audio::CpalOutput::new(), mode)
}

#[cfg(not(feature = "cpal"))]
fn audio_system(mode: PlaybackMode) -> AudioSystem {
    info!("built without the `cpal` feature; sound is simulated");
    AudioSystem::new(FileAudioDecoder::new(), engine_audio::NullOutput::realtime(), mode)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = args.engine_config()?;
    let scale = args.scale()?;
    info!(title = %config.title, frames = args.frames.len(), "ascii-engine starting");

    let frames = scene::load_frames(&args.frames)?;
    let mut allocator = EntityAllocator::new();
    let entity = scene::spawn_sprite(&mut allocator, frames, config.animation_delay, scale)?;
    let mut demo = DemoScene::new(entity);
    if let Some(path) = &args.audio {
        demo = demo.with_sound(audio_system(args.playback_mode()), path);
    }

    let mut backend = TerminalBackend::stdout(config.glyph_metrics())
        .context("failed to query terminal size")?
        .with_title(config.title.as_str());
    let viewport = backend.viewport();
    let config = if viewport.width > 0.0 && viewport.height > 0.0 {
        config.with_viewport(viewport.width as u32, viewport.height as u32)
    } else {
        config
    };
    backend.enter().context("failed to enter the terminal")?;

    let mut runner =
        EngineRunner::new(&config, demo, backend, TerminalEvents::new(config.glyph_metrics()));
    runner.on_event(controls::movement);
    runner.on_event(controls::zoom(config.zoom_step));
    runner.on_event(controls::sound);

    let outcome = runner.run();
    let (demo, mut backend, _) = runner.into_parts();
    backend.exit().context("failed to restore the terminal")?;
    drop(demo);

    let ticks = outcome?;
    info!(ticks, "ascii-engine shut down");
    Ok(())
}
