//! The demo scene: one animated sprite entity and an optional sound.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, ensure};
use engine_audio::AudioSystem;
use engine_component::{Entity, EntityAllocator};
use engine_math::{IVec2, Transform2D, Vec2};
use engine_render::{
    AnimationComponent, GlyphBackend, RenderError, SpriteBundle, draw_animated,
    draw_static,
};
use engine_runtime::{EngineContext, Scene};
use engine_sprite::{FileImageDecoder, SpriteAsset, load_sprite};
use tracing::{info, warn};

/// Decode every frame file into a sprite.
pub fn load_frames(paths: &[PathBuf]) -> Result<Vec<SpriteAsset>> {
    paths
        .iter()
        .map(|path| {
            load_sprite(&FileImageDecoder, path)
                .with_context(|| format!("failed to load frame {}", path.display()))
        })
        .collect()
}

/// A drawable entity carrying `frames` as its animation.
///
/// Fails on a zero delay or a scale that is not positive and finite.
pub fn spawn_sprite(
    allocator: &mut EntityAllocator,
    frames: Vec<SpriteAsset>,
    delay: u64,
    scale: Vec2,
) -> Result<Entity> {
    let mut entity = Entity::spawn::<SpriteBundle>(allocator);
    if let Some(transform) = entity.get_mut::<Transform2D>() {
        ensure!(
            transform.try_set_scale(scale),
            "sprite scale must be positive and finite, got {scale}"
        );
    }
    let id = entity.id();
    let animation = entity.insert(AnimationComponent::with_frames(frames, delay)?);
    info!(entity = %id, frames = animation.len(), delay, "spawned sprite");
    Ok(entity)
}

struct Sound {
    system: AudioSystem,
    path: PathBuf,
}

pub struct DemoScene {
    entity: Entity,
    sound: Option<Sound>,
}

impl DemoScene {
    #[must_use]
    pub fn new(entity: Entity) -> Self {
        Self {
            entity,
            sound: None,
        }
    }

    /// Play `path` through `system` on [`DemoScene::play_sound`].
    #[must_use]
    pub fn with_sound(mut self, system: AudioSystem, path: impl AsRef<Path>) -> Self {
        self.sound = Some(Sound {
            system,
            path: path.as_ref().to_path_buf(),
        });
        self
    }

    #[must_use]
    pub fn entity(&self) -> &Entity {
        &self.entity
    }

    /// Move the sprite by `offset` grid units.
    pub fn move_by(&mut self, offset: IVec2) {
        if let Some(transform) = self.entity.get_mut::<Transform2D>() {
            transform.translate(offset);
        }
    }

    /// Start the configured sound. Failures are logged, never fatal.
    pub fn play_sound(&mut self) {
        let Some(sound) = self.sound.as_mut() else {
            warn!("no audio file configured");
            return;
        };
        if let Err(err) = sound.system.play(&sound.path) {
            warn!(path = %sound.path.display(), %err, "could not play sound");
        }
    }
}

impl Scene for DemoScene {
    fn draw(
        &mut self,
        ctx: &EngineContext,
        backend: &mut dyn GlyphBackend,
    ) -> Result<(), RenderError> {
        draw_static(&self.entity, ctx.viewport(), ctx.zoom(), backend)?;
        draw_animated(&mut self.entity, ctx.tick(), ctx.viewport(), ctx.zoom(), backend)?;
        Ok(())
    }
}
