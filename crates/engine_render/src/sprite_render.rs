//! Static single-sprite rendering and the default sprite bundle.

use engine_component::{Bundle, Component, Entity, EntityId};
use engine_math::Transform2D;
use engine_sprite::SpriteAsset;

/// Holds one sprite, drawn every frame.
#[derive(Debug, Clone, Default)]
pub struct SpriteRenderComponent {
    sprite: SpriteAsset,
    owner: Option<EntityId>,
}

impl SpriteRenderComponent {
    #[must_use]
    pub fn new(sprite: SpriteAsset) -> Self {
        Self {
            sprite,
            owner: None,
        }
    }

    #[must_use]
    pub fn sprite(&self) -> &SpriteAsset {
        &self.sprite
    }

    pub fn set_sprite(&mut self, sprite: SpriteAsset) {
        self.sprite = sprite;
    }

    #[must_use]
    pub fn owner(&self) -> Option<EntityId> {
        self.owner
    }
}

impl Component for SpriteRenderComponent {
    fn type_name() -> &'static str {
        "SpriteRenderComponent"
    }

    fn attach(&mut self, owner: EntityId) {
        self.owner = Some(owner);
    }
}

/// A default [`Transform2D`] plus an empty [`SpriteRenderComponent`]: what
/// every drawable entity starts with.
#[derive(Debug)]
pub struct SpriteBundle;

impl Bundle for SpriteBundle {
    fn attach_to(entity: &mut Entity) {
        entity.add::<Transform2D>();
        entity.add::<SpriteRenderComponent>();
    }
}

#[cfg(test)]
mod tests {
    use engine_component::EntityAllocator;
    use engine_sprite::Rgb;

    use super::*;

    #[test]
    fn test_bundle_attaches_transform_and_sprite() {
        let mut alloc = EntityAllocator::new();
        let entity = Entity::spawn::<SpriteBundle>(&mut alloc);

        let transform = entity.get::<Transform2D>().unwrap();
        assert_eq!(*transform, {
            let mut t = Transform2D::default();
            t.attach(entity.id());
            t
        });

        let render = entity.get::<SpriteRenderComponent>().unwrap();
        assert!(render.sprite().is_empty());
        assert_eq!(render.owner(), Some(entity.id()));
        assert_eq!(entity.components().len(), 2);
    }

    #[test]
    fn test_set_sprite_replaces() {
        let mut render = SpriteRenderComponent::default();
        render.set_sprite(SpriteAsset::blank(2, 2, Rgb::BLACK));
        assert_eq!(render.sprite().width(), 2);
        assert_eq!(render.sprite().base_color(), Rgb::BLACK);
    }
}
