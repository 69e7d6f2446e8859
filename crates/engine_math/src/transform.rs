//! 2D transform component.
//!
//! [`Transform2D`] holds an entity's logical position (integer grid units)
//! and its scale. The compositor reads it every frame to place the entity's
//! character grid.

use engine_component::{Component, EntityId};
use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

/// Logical position and scale of an entity.
///
/// Scale components must be positive; the compositor divides by them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Transform2D {
    /// Position in logical grid units.
    pub position: IVec2,
    /// Per-axis scale factor.
    pub scale: Vec2,
    #[serde(skip)]
    owner: Option<EntityId>,
}

impl Transform2D {
    /// Origin, unit scale.
    pub const IDENTITY: Self = Self {
        position: IVec2::ZERO,
        scale: Vec2::ONE,
        owner: None,
    };

    /// A transform at `position` with unit scale.
    #[must_use]
    pub fn from_position(position: IVec2) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    /// A transform at `position` with the given scale.
    #[must_use]
    pub fn from_position_scale(position: IVec2, scale: Vec2) -> Self {
        debug_assert!(Self::is_valid_scale(scale), "scale must be positive");
        Self {
            position,
            scale,
            owner: None,
        }
    }

    pub fn set_position(&mut self, position: IVec2) {
        self.position = position;
    }

    /// Whether `scale` is usable: both components finite and above zero.
    #[must_use]
    pub fn is_valid_scale(scale: Vec2) -> bool {
        scale.is_finite() && scale.cmpgt(Vec2::ZERO).all()
    }

    pub fn set_scale(&mut self, scale: Vec2) {
        debug_assert!(Self::is_valid_scale(scale), "scale must be positive");
        self.scale = scale;
    }

    /// Set the scale if it is valid. Returns `false` and keeps the current
    /// scale otherwise.
    #[must_use]
    pub fn try_set_scale(&mut self, scale: Vec2) -> bool {
        if !Self::is_valid_scale(scale) {
            return false;
        }
        self.scale = scale;
        true
    }

    /// Move by `offset` grid units.
    pub fn translate(&mut self, offset: IVec2) {
        self.position += offset;
    }

    #[must_use]
    pub fn translated(mut self, offset: IVec2) -> Self {
        self.translate(offset);
        self
    }

    /// The entity this transform is attached to, if any.
    #[must_use]
    pub fn owner(&self) -> Option<EntityId> {
        self.owner
    }
}

impl Default for Transform2D {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Component for Transform2D {
    fn type_name() -> &'static str {
        "Transform2D"
    }

    fn attach(&mut self, owner: EntityId) {
        self.owner = Some(owner);
    }
}

#[cfg(test)]
mod tests {
    use engine_component::Entity;

    use super::*;

    #[test]
    fn test_default_is_origin_unit_scale() {
        let t = Transform2D::default();
        assert_eq!(t.position, IVec2::ZERO);
        assert_eq!(t.scale, Vec2::ONE);
        assert_eq!(t.owner(), None);
    }

    #[test]
    fn test_translate() {
        let t = Transform2D::from_position(IVec2::new(1, 2)).translated(IVec2::new(-3, 4));
        assert_eq!(t.position, IVec2::new(-2, 6));
        assert_eq!(t.scale, Vec2::ONE);
    }

    #[test]
    fn test_set_scale() {
        let mut t = Transform2D::default();
        t.set_scale(Vec2::new(2.0, 0.5));
        assert_eq!(t.scale, Vec2::new(2.0, 0.5));
    }

    #[test]
    fn test_try_set_scale_rejects_degenerate_values() {
        let mut t = Transform2D::default();
        assert!(!t.try_set_scale(Vec2::new(0.0, 1.0)));
        assert!(!t.try_set_scale(Vec2::new(1.0, -2.0)));
        assert!(!t.try_set_scale(Vec2::new(f32::INFINITY, 1.0)));
        assert!(!t.try_set_scale(Vec2::new(1.0, f32::NAN)));
        assert_eq!(t.scale, Vec2::ONE);

        assert!(t.try_set_scale(Vec2::new(0.5, 3.0)));
        assert_eq!(t.scale, Vec2::new(0.5, 3.0));
    }

    #[test]
    fn test_attach_records_owner() {
        let mut entity = Entity::new(EntityId::from_raw(11));
        let t = entity.add::<Transform2D>();
        assert_eq!(t.owner(), Some(EntityId::from_raw(11)));
    }

    #[test]
    fn test_serde_skips_owner() {
        let mut t = Transform2D::from_position(IVec2::new(4, 5));
        t.attach(EntityId::from_raw(2));
        let json = serde_json::to_string(&t).unwrap();
        let restored: Transform2D = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.position, t.position);
        assert_eq!(restored.owner(), None);
    }
}
