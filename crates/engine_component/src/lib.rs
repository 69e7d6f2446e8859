//! # engine_component
//!
//! The "C" in ECS for the character-art engine: what a component is and how
//! an entity stores its components.
//!
//! This crate provides:
//!
//! - [`Component`] trait: the contract every attachable value satisfies.
//! - [`ComponentTypeId`]: stable FNV-1a tag of a component's name.
//! - [`ComponentRegistry`]: type-keyed, exclusive-ownership storage.
//! - [`Entity`] / [`EntityId`] / [`EntityAllocator`]: identity and ownership.
//! - [`Bundle`]: components attached together at spawn time.

pub mod component;
pub mod entity;
pub mod registry;

pub use component::{Component, ComponentTypeId};
pub use entity::{Bundle, Entity, EntityAllocator, EntityId};
pub use registry::ComponentRegistry;
