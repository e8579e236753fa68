//! Entity Component System (ECS) composition core
//!
//! This module provides:
//! - Entity identity issuance and hierarchy links
//! - Kind-tagged component storage
//! - Priority-ordered system registration
//! - Capability-based routing of entities to systems

mod capability;
mod component;
mod entity;
mod hierarchy;
mod system;
mod world;

pub use capability::{CapabilityView, Contract};
pub use component::{Component, ComponentKind, ComponentMap, ErasedComponent, Shared};
pub use entity::{Entity, EntityId, IdRegistry, RegistryConfig, RegistryStats};
pub use hierarchy::EntityArena;
pub use system::{InitContext, System, SystemId, SystemRegistry};
pub use world::World;
