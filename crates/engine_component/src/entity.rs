//! Entity identifiers, allocation, and the owning [`Entity`] type.
//!
//! An [`EntityId`] is a lightweight `u64` handle. An [`Entity`] pairs that id
//! with the [`ComponentRegistry`] it owns; components only ever see the id, so
//! the entity always outlives the components stored inside it.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::component::Component;
use crate::registry::ComponentRegistry;

/// A unique entity identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl EntityId {
    /// The null / invalid entity sentinel.
    pub const INVALID: EntityId = EntityId(0);

    /// Create an entity id from a raw `u64`.
    #[must_use]
    pub const fn from_raw(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw `u64` identifier.
    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }

    /// Returns `true` if this is a valid (non-zero) id.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

/// Allocates monotonically increasing entity ids.
#[derive(Debug)]
pub struct EntityAllocator {
    next_id: u64,
}

impl EntityAllocator {
    /// Creates a new allocator. Ids start at 1 (0 is [`EntityId::INVALID`]).
    #[must_use]
    pub fn new() -> Self {
        Self { next_id: 1 }
    }

    /// Allocates a fresh id.
    pub fn allocate(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        EntityId(id)
    }

    /// Returns the number of ids allocated so far.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.next_id - 1
    }
}

impl Default for EntityAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// A group of components attached together when an entity is spawned.
pub trait Bundle {
    /// Attach this bundle's components to `entity`.
    fn attach_to(entity: &mut Entity);
}

/// An identity owning a set of components.
#[derive(Debug)]
pub struct Entity {
    id: EntityId,
    components: ComponentRegistry,
}

impl Entity {
    /// Create an entity with no components.
    #[must_use]
    pub fn new(id: EntityId) -> Self {
        Self {
            id,
            components: ComponentRegistry::new(id),
        }
    }

    /// Allocate an id and attach the components of bundle `B`.
    #[must_use]
    pub fn spawn<B: Bundle>(allocator: &mut EntityAllocator) -> Self {
        let mut entity = Self::new(allocator.allocate());
        B::attach_to(&mut entity);
        debug!(entity = %entity.id, components = ?entity.components.type_names(), "spawned entity");
        entity
    }

    /// This entity's id.
    #[must_use]
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// See [`ComponentRegistry::add`].
    pub fn add<T: Component + Default>(&mut self) -> &mut T {
        self.components.add::<T>()
    }

    /// See [`ComponentRegistry::insert`].
    pub fn insert<T: Component>(&mut self, value: T) -> &mut T {
        self.components.insert(value)
    }

    /// See [`ComponentRegistry::get`].
    #[must_use]
    pub fn get<T: Component>(&self) -> Option<&T> {
        self.components.get::<T>()
    }

    /// See [`ComponentRegistry::get_mut`].
    pub fn get_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.components.get_mut::<T>()
    }

    /// See [`ComponentRegistry::remove`].
    pub fn remove<T: Component>(&mut self) -> bool {
        self.components.remove::<T>()
    }

    /// Read-only access to the underlying registry.
    #[must_use]
    pub fn components(&self) -> &ComponentRegistry {
        &self.components
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, PartialEq)]
    struct Marker(u8);

    impl Component for Marker {
        fn type_name() -> &'static str {
            "Marker"
        }
    }

    struct MarkerBundle;

    impl Bundle for MarkerBundle {
        fn attach_to(entity: &mut Entity) {
            entity.insert(Marker(5));
        }
    }

    #[test]
    fn test_entity_id_creation() {
        let e = EntityId::from_raw(42);
        assert_eq!(e.id(), 42);
        assert!(e.is_valid());
        assert!(!EntityId::INVALID.is_valid());
    }

    #[test]
    fn test_allocator_produces_unique_ids() {
        let mut alloc = EntityAllocator::new();
        assert_eq!(alloc.allocate().id(), 1);
        assert_eq!(alloc.allocate().id(), 2);
        assert_eq!(alloc.allocate().id(), 3);
        assert_eq!(alloc.count(), 3);
    }

    #[test]
    fn test_spawn_attaches_bundle() {
        let mut alloc = EntityAllocator::new();
        let entity = Entity::spawn::<MarkerBundle>(&mut alloc);
        assert_eq!(entity.id(), EntityId::from_raw(1));
        assert_eq!(entity.get::<Marker>(), Some(&Marker(5)));
        assert_eq!(entity.components().owner(), entity.id());
    }

    #[test]
    fn test_entity_add_get_remove() {
        let mut entity = Entity::new(EntityId::from_raw(3));
        assert!(entity.get::<Marker>().is_none());
        entity.add::<Marker>().0 = 1;
        assert_eq!(entity.get::<Marker>(), Some(&Marker(1)));
        assert!(entity.remove::<Marker>());
        assert!(!entity.remove::<Marker>());
    }
}
