// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! System registration and ordering
//!
//! Systems hold their own references to the entities and components they
//! care about and update them once per frame. The [`SystemRegistry`] keeps
//! systems sorted by descending priority; systems with equal priority keep
//! their insertion order.

use crate::ecs::capability::{CapabilityView, Contract};
use crate::ecs::{EntityId, World};
use std::any::Any;
use std::fmt;

/// Trait for behavioral modules driven by the [`World`]
///
/// `update` has no error channel and is called unconditionally every frame;
/// a system must bound its own work and never fail.
///
/// ```
/// use ecs_core::ecs::{EntityId, System};
/// use std::any::Any;
///
/// struct Ticker {
///     ticks: u32,
/// }
///
/// impl System for Ticker {
///     fn update(&mut self, _dt: f32) {
///         self.ticks += 1;
///     }
///     fn remove(&mut self, _entity: EntityId) {}
///     fn as_any(&self) -> &dyn Any { self }
///     fn as_any_mut(&mut self) -> &mut dyn Any { self }
/// }
/// ```
pub trait System: Send {
    /// Advance the system by `dt` seconds
    fn update(&mut self, dt: f32);

    /// Forget the given entity; must be a no-op if the system never held it
    fn remove(&mut self, entity: EntityId);

    /// Execution order, higher runs earlier
    ///
    /// Read once, when the system is inserted.
    fn priority(&self) -> i32 {
        0
    }

    /// Called once at registration, before the system joins the update order
    ///
    /// The context gives read access to the world and lets the system
    /// declare the contracts it wants entities routed by.
    fn initialize(&mut self, _context: &mut InitContext<'_>) {}

    /// Receive an entity the router matched against one of this system's
    /// inclusion contracts
    ///
    /// Systems registered with contracts should override this; the default
    /// ignores the entity.
    fn add_by_capability(&mut self, _view: CapabilityView<'_>) {}

    /// Get the name of this system for debugging
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Allow downcasting to concrete system types
    fn as_any(&self) -> &dyn Any;

    /// Allow mutable downcasting to concrete system types
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Registration handle for a system within one world
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SystemId(u64);

impl SystemId {
    /// Get the raw value
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SystemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "System({})", self.0)
    }
}

/// Context handed to [`System::initialize`]
///
/// Contracts declared here are validated together with those passed to
/// [`World::register_with_capabilities`]; a malformed declaration aborts
/// the registration.
pub struct InitContext<'a> {
    world: &'a World,
    id: SystemId,
    inclusion: Vec<Contract>,
    exclusion: Vec<Contract>,
}

impl<'a> InitContext<'a> {
    pub(crate) fn new(world: &'a World, id: SystemId) -> Self {
        InitContext {
            world,
            id,
            inclusion: Vec::new(),
            exclusion: Vec::new(),
        }
    }

    /// Read access to the world the system is joining
    pub fn world(&self) -> &World {
        self.world
    }

    /// Handle the system will be registered under
    pub fn system_id(&self) -> SystemId {
        self.id
    }

    /// Ask for entities satisfying `contract`
    pub fn include(&mut self, contract: Contract) {
        self.inclusion.push(contract);
    }

    /// Refuse entities satisfying `contract`, even if they match an inclusion
    pub fn exclude(&mut self, contract: Contract) {
        self.exclusion.push(contract);
    }

    /// Contracts declared during initialization, (inclusion, exclusion)
    pub(crate) fn into_contracts(self) -> (Vec<Contract>, Vec<Contract>) {
        (self.inclusion, self.exclusion)
    }
}

/// A system with metadata for ordering
struct RegisteredSystem {
    id: SystemId,
    priority: i32,
    system: Box<dyn System>,
}

/// Systems sorted by descending priority, stable on ties
#[derive(Default)]
pub struct SystemRegistry {
    systems: Vec<RegisteredSystem>,
    next_id: u64,
}

impl SystemRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        SystemRegistry {
            systems: Vec::new(),
            next_id: 0,
        }
    }

    /// Handle the next inserted system will receive
    pub(crate) fn peek_id(&self) -> SystemId {
        SystemId(self.next_id)
    }

    /// Add a system and restore priority order
    pub fn insert(&mut self, system: Box<dyn System>) -> SystemId {
        let id = SystemId(self.next_id);
        self.next_id += 1;
        self.systems.push(RegisteredSystem {
            id,
            priority: system.priority(),
            system,
        });
        // sort_by is stable, so equal priorities keep insertion order
        self.systems.sort_by(|a, b| b.priority.cmp(&a.priority));
        id
    }

    /// Iterate systems in execution order
    pub fn ordered_systems(&self) -> impl Iterator<Item = &dyn System> + '_ {
        self.systems.iter().map(|entry| entry.system.as_ref())
    }

    /// Iterate handles and systems mutably in execution order
    pub(crate) fn iter_mut(
        &mut self,
    ) -> impl Iterator<Item = (SystemId, &mut (dyn System + 'static))> + '_ {
        self.systems
            .iter_mut()
            .map(|entry| (entry.id, entry.system.as_mut()))
    }

    /// Priorities in execution order
    pub fn priorities(&self) -> Vec<i32> {
        self.systems.iter().map(|entry| entry.priority).collect()
    }

    /// Handles in execution order
    pub fn ids(&self) -> Vec<SystemId> {
        self.systems.iter().map(|entry| entry.id).collect()
    }

    /// First system of concrete type `S`
    pub fn get<S: System + 'static>(&self) -> Option<&S> {
        self.systems
            .iter()
            .find_map(|entry| entry.system.as_any().downcast_ref::<S>())
    }

    /// First system of concrete type `S`, mutably
    pub fn get_mut<S: System + 'static>(&mut self) -> Option<&mut S> {
        self.systems
            .iter_mut()
            .find_map(|entry| entry.system.as_any_mut().downcast_mut::<S>())
    }

    /// System registered under `id`
    pub fn by_id(&self, id: SystemId) -> Option<&dyn System> {
        self.systems
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| entry.system.as_ref())
    }

    /// Number of registered systems
    pub fn len(&self) -> usize {
        self.systems.len()
    }

    /// Check if no systems are registered
    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }
}

impl fmt::Debug for SystemRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.systems.iter().map(|entry| (entry.id, entry.system.name(), entry.priority)))
            .finish()
    }
}
