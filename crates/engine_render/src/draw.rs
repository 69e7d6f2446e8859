//! Entity-level draw routines: the static and the animated call sites of the
//! compositor.

use engine_component::{Component, Entity};
use engine_math::Transform2D;

use crate::animation::AnimationComponent;
use crate::backend::{GlyphBackend, Viewport};
use crate::compositor::{Placement, draw_sprite};
use crate::error::RenderError;
use crate::sprite_render::SpriteRenderComponent;

fn placement(entity: &Entity, viewport: Viewport, zoom: f32) -> Result<Placement, RenderError> {
    let transform = entity
        .get::<Transform2D>()
        .ok_or(RenderError::MissingComponent(Transform2D::type_name()))?;
    Ok(Placement::new(transform, viewport, zoom))
}

/// Draw the entity's [`SpriteRenderComponent`] at its transform.
///
/// # Errors
///
/// [`RenderError::MissingComponent`] if the entity has no transform or no
/// sprite component; backend failures otherwise.
pub fn draw_static<B: GlyphBackend + ?Sized>(
    entity: &Entity,
    viewport: Viewport,
    zoom: f32,
    backend: &mut B,
) -> Result<usize, RenderError> {
    let placement = placement(entity, viewport, zoom)?;
    let render = entity
        .get::<SpriteRenderComponent>()
        .ok_or(RenderError::MissingComponent(SpriteRenderComponent::type_name()))?;
    draw_sprite(render.sprite(), placement, backend)
}

/// Resolve the entity's animation frame for `tick`, then draw it at the
/// entity's transform.
///
/// # Errors
///
/// [`RenderError::MissingComponent`] if the entity has no transform or no
/// animation, [`RenderError::Animation`] if the animation has no frames,
/// backend failures otherwise.
pub fn draw_animated<B: GlyphBackend + ?Sized>(
    entity: &mut Entity,
    tick: u64,
    viewport: Viewport,
    zoom: f32,
    backend: &mut B,
) -> Result<usize, RenderError> {
    let placement = placement(entity, viewport, zoom)?;
    let animation = entity
        .get_mut::<AnimationComponent>()
        .ok_or(RenderError::MissingComponent(AnimationComponent::type_name()))?;
    let sprite = animation.rendered_frame(tick)?;
    draw_sprite(sprite, placement, backend)
}
