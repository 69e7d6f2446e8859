//! Type-keyed, exclusive-ownership component storage for one entity.
//!
//! A [`ComponentRegistry`] holds at most one boxed component per component
//! type. Slots are keyed by the [`ComponentTypeId`] tag together with the
//! concrete [`TypeId`], so two types reporting the same name keep separate
//! slots, and lookups downcast through [`Any`].

use std::any::{Any, TypeId};
use std::collections::HashMap;

use tracing::{debug, warn};

use crate::component::{Component, ComponentTypeId};
use crate::entity::EntityId;

/// Tag plus concrete type of a stored component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct SlotKey {
    tag: ComponentTypeId,
    type_id: TypeId,
}

impl SlotKey {
    fn of<T: Component>() -> Self {
        Self {
            tag: T::component_type_id(),
            type_id: TypeId::of::<T>(),
        }
    }
}

/// One occupied slot of the registry.
struct Slot {
    name: &'static str,
    value: Box<dyn Any + Send + Sync>,
}

impl std::fmt::Debug for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Slot").field("name", &self.name).finish_non_exhaustive()
    }
}

/// Per-entity component storage.
///
/// Invariant: at most one live instance per component type. Replacing a
/// component drops the previous instance before the new one is returned.
#[derive(Debug)]
pub struct ComponentRegistry {
    owner: EntityId,
    slots: HashMap<SlotKey, Slot>,
}

impl ComponentRegistry {
    /// Create an empty registry owned by `owner`.
    #[must_use]
    pub fn new(owner: EntityId) -> Self {
        Self {
            owner,
            slots: HashMap::new(),
        }
    }

    /// The entity this registry belongs to.
    #[must_use]
    pub fn owner(&self) -> EntityId {
        self.owner
    }

    /// Construct a default `T`, attach it, and store it.
    ///
    /// Any existing `T` is dropped first. The returned reference stays valid
    /// until the component is removed or replaced.
    pub fn add<T: Component + Default>(&mut self) -> &mut T {
        self.insert(T::default())
    }

    /// Attach and store a caller-built `T`, dropping any existing `T`.
    pub fn insert<T: Component>(&mut self, mut value: T) -> &mut T {
        let key = SlotKey::of::<T>();
        value.attach(self.owner);

        if let Some(previous) = self.slots.remove(&key) {
            debug!(entity = %self.owner, component = T::type_name(), "replacing component");
            drop(previous);
        } else if self.slots.keys().any(|other| other.tag == key.tag) {
            warn!(
                entity = %self.owner,
                component = T::type_name(),
                "component tag shared with another type"
            );
        }

        let slot = self.slots.entry(key).or_insert(Slot {
            name: T::type_name(),
            value: Box::new(value),
        });
        match slot.value.downcast_mut::<T>() {
            Some(stored) => stored,
            None => unreachable!("slot was just filled with a value of this type"),
        }
    }

    /// Returns the stored `T`, or `None` if absent.
    #[must_use]
    pub fn get<T: Component>(&self) -> Option<&T> {
        self.slots
            .get(&SlotKey::of::<T>())
            .and_then(|slot| slot.value.downcast_ref::<T>())
    }

    /// Returns the stored `T` mutably, or `None` if absent.
    pub fn get_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.slots
            .get_mut(&SlotKey::of::<T>())
            .and_then(|slot| slot.value.downcast_mut::<T>())
    }

    /// Drop and forget the stored `T`.
    ///
    /// Returns `true` if a component was removed. A different type sharing
    /// the same tag is left untouched.
    pub fn remove<T: Component>(&mut self) -> bool {
        let removed = self.slots.remove(&SlotKey::of::<T>()).is_some();
        if removed {
            debug!(entity = %self.owner, component = T::type_name(), "removed component");
        }
        removed
    }

    /// Returns `true` if a `T` is stored.
    #[must_use]
    pub fn contains<T: Component>(&self) -> bool {
        self.get::<T>().is_some()
    }

    /// Number of stored components.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if no component is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Names of the stored component types, sorted.
    #[must_use]
    pub fn type_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.slots.values().map(|slot| slot.name).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[derive(Debug, Default)]
    struct Position {
        x: i32,
        owner: Option<EntityId>,
    }

    impl Component for Position {
        fn type_name() -> &'static str {
            "Position"
        }

        fn attach(&mut self, owner: EntityId) {
            self.owner = Some(owner);
        }
    }

    /// Shares the "Position" tag on purpose.
    #[derive(Debug, Default)]
    struct Impostor;

    impl Component for Impostor {
        fn type_name() -> &'static str {
            "Position"
        }
    }

    #[derive(Debug, Default)]
    struct DropCounter {
        drops: Arc<AtomicUsize>,
    }

    impl Drop for DropCounter {
        fn drop(&mut self) {
            self.drops.fetch_add(1, Ordering::SeqCst);
        }
    }

    impl Component for DropCounter {
        fn type_name() -> &'static str {
            "DropCounter"
        }
    }

    fn registry() -> ComponentRegistry {
        ComponentRegistry::new(EntityId::from_raw(1))
    }

    #[test]
    fn test_get_before_add_is_none() {
        let registry = registry();
        assert!(registry.get::<Position>().is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_add_then_get_returns_same_instance() {
        let mut registry = registry();
        let added: *const Position = registry.add::<Position>();
        let fetched = registry.get::<Position>().unwrap();
        assert!(std::ptr::eq(added, fetched));
    }

    #[test]
    fn test_add_binds_owner() {
        let mut registry = ComponentRegistry::new(EntityId::from_raw(42));
        let position = registry.add::<Position>();
        assert_eq!(position.owner, Some(EntityId::from_raw(42)));
    }

    #[test]
    fn test_second_add_drops_first_instance() {
        let drops = Arc::new(AtomicUsize::new(0));
        let mut registry = registry();

        registry.insert(DropCounter {
            drops: Arc::clone(&drops),
        });
        assert_eq!(drops.load(Ordering::SeqCst), 0);

        let second: *const DropCounter = registry.insert(DropCounter {
            drops: Arc::clone(&drops),
        });
        assert_eq!(drops.load(Ordering::SeqCst), 1);
        assert!(std::ptr::eq(second, registry.get::<DropCounter>().unwrap()));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_get_mut_mutates_stored_value() {
        let mut registry = registry();
        registry.add::<Position>();
        registry.get_mut::<Position>().unwrap().x = 9;
        assert_eq!(registry.get::<Position>().unwrap().x, 9);
    }

    #[test]
    fn test_remove_destroys_and_forgets() {
        let drops = Arc::new(AtomicUsize::new(0));
        let mut registry = registry();
        registry.insert(DropCounter {
            drops: Arc::clone(&drops),
        });

        assert!(registry.remove::<DropCounter>());
        assert_eq!(drops.load(Ordering::SeqCst), 1);
        assert!(!registry.contains::<DropCounter>());
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut registry = registry();
        registry.add::<Position>();
        assert!(!registry.remove::<DropCounter>());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_types_sharing_a_tag_keep_separate_slots() {
        let mut registry = registry();
        registry.add::<Position>().x = 7;
        assert!(registry.get::<Impostor>().is_none());
        assert!(!registry.remove::<Impostor>());

        registry.add::<Impostor>();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get::<Position>().map(|p| p.x), Some(7));
        assert!(registry.get::<Impostor>().is_some());

        assert!(registry.remove::<Impostor>());
        assert_eq!(registry.get::<Position>().map(|p| p.x), Some(7));
        assert!(!registry.contains::<Impostor>());
    }

    #[test]
    fn test_type_names_sorted() {
        let mut registry = registry();
        registry.add::<Position>();
        registry.add::<DropCounter>();
        assert_eq!(registry.type_names(), vec!["DropCounter", "Position"]);
    }
}
