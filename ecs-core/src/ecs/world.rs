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
//! World management
//!
//! The World is the composition root: it owns the system registry and the
//! routing tables that decide which systems receive which entities.
//!
//! A world is driven from one thread at a time. It is `Send`, so a host that
//! needs to touch it from several threads can wrap the whole world in a
//! single lock. Only the shared [`IdRegistry`] is safe to use concurrently.

use crate::ecs::capability::{validate_sets, CapabilityView, Contract};
use crate::ecs::system::{InitContext, SystemId, SystemRegistry};
use crate::ecs::{Entity, EntityId, IdRegistry, System};
use crate::error::ConfigError;
use std::collections::HashMap;
use std::sync::Arc;

/// The main ECS world container
///
/// # Examples
///
/// ```
/// use ecs_core::ecs::{EntityId, System, World};
/// use std::any::Any;
///
/// struct Noop;
///
/// impl System for Noop {
///     fn update(&mut self, _dt: f32) {}
///     fn remove(&mut self, _entity: EntityId) {}
///     fn as_any(&self) -> &dyn Any { self }
///     fn as_any_mut(&mut self) -> &mut dyn Any { self }
/// }
///
/// let mut world = World::new();
/// world.insert_system(Noop).unwrap();
/// world.update(1.0 / 60.0);
/// assert_eq!(world.frame(), 1);
/// ```
pub struct World {
    registry: Arc<IdRegistry>,
    systems: SystemRegistry,
    inclusion: HashMap<SystemId, Vec<Contract>>,
    exclusion: HashMap<SystemId, Vec<Contract>>,
    frame: u64,
}

impl World {
    /// Create a new world with its own identifier registry
    pub fn new() -> Self {
        Self::with_registry(Arc::new(IdRegistry::new()))
    }

    /// Create a world issuing entities from a shared registry
    pub fn with_registry(registry: Arc<IdRegistry>) -> Self {
        World {
            registry,
            systems: SystemRegistry::new(),
            inclusion: HashMap::new(),
            exclusion: HashMap::new(),
            frame: 0,
        }
    }

    /// The identifier registry this world creates entities from
    pub fn registry(&self) -> &Arc<IdRegistry> {
        &self.registry
    }

    /// Create an entity carrying the given requirement tags
    pub fn new_entity<I, S>(&self, tags: I) -> Entity
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.registry.new_entity(tags)
    }

    /// Create an entity with no requirement tags
    pub fn new_entity_untagged(&self) -> Entity {
        self.registry.new_entity_untagged()
    }

    /// Create `count` entities with contiguous identifiers
    pub fn new_entities(&self, count: usize) -> Vec<Entity> {
        self.registry.new_entities(count)
    }

    /// Add a system without routing contracts
    ///
    /// The system only receives entities through direct calls by the host,
    /// unless it declares contracts from [`System::initialize`].
    pub fn insert_system<S: System + 'static>(&mut self, system: S) -> Result<SystemId, ConfigError> {
        self.register_with_capabilities(system, Vec::new(), Vec::new())
    }

    /// Add a system that receives routed entities
    ///
    /// Entities satisfying any `inclusion` contract are handed to
    /// [`System::add_by_capability`] by [`route_entity`](Self::route_entity),
    /// unless they also satisfy any `exclusion` contract.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if any contract, including those declared
    /// during initialization, is malformed. Nothing is registered in that case.
    pub fn register_with_capabilities<S: System + 'static>(
        &mut self,
        mut system: S,
        mut inclusion: Vec<Contract>,
        mut exclusion: Vec<Contract>,
    ) -> Result<SystemId, ConfigError> {
        let name = system.name().to_string();
        validate_sets(&name, &inclusion, &exclusion)?;

        let id = self.systems.peek_id();
        let mut context = InitContext::new(self, id);
        system.initialize(&mut context);
        let (declared_in, declared_ex) = context.into_contracts();
        inclusion.extend(declared_in);
        exclusion.extend(declared_ex);
        validate_sets(&name, &inclusion, &exclusion)?;

        let id = self.systems.insert(Box::new(system));
        log::debug!(
            "registered {} as {} ({} inclusion, {} exclusion contracts)",
            name,
            id,
            inclusion.len(),
            exclusion.len()
        );

        if !inclusion.is_empty() {
            self.inclusion.insert(id, inclusion);
        }
        if !exclusion.is_empty() {
            self.exclusion.insert(id, exclusion);
        }
        Ok(id)
    }

    /// Hand an entity to every system whose contracts it satisfies
    ///
    /// Systems are visited in execution order. A system is skipped when the
    /// entity satisfies any of its exclusion contracts; otherwise it receives
    /// the entity once, viewed through the first inclusion contract matched.
    /// Systems without inclusion contracts are never visited.
    ///
    /// Returns the number of systems that received the entity.
    pub fn route_entity(&mut self, entity: &Entity) -> usize {
        let mut routed = 0;
        for (id, system) in self.systems.iter_mut() {
            let inclusion = match self.inclusion.get(&id) {
                Some(contracts) => contracts,
                None => continue,
            };

            let excluded = self
                .exclusion
                .get(&id)
                .and_then(|contracts| contracts.iter().find(|c| c.is_satisfied_by(entity)));
            if let Some(contract) = excluded {
                log::debug!(
                    "{} excluded from {} by '{}'",
                    entity.id(),
                    system.name(),
                    contract.name()
                );
                continue;
            }

            if let Some(contract) = inclusion.iter().find(|c| c.is_satisfied_by(entity)) {
                log::debug!("{} routed to {} via '{}'", entity.id(), system.name(), contract.name());
                system.add_by_capability(CapabilityView::new(entity, contract));
                routed += 1;
            }
        }
        routed
    }

    /// Route each entity in turn; returns the total number of deliveries
    pub fn route_entities<'a, I>(&mut self, entities: I) -> usize
    where
        I: IntoIterator<Item = &'a Entity>,
    {
        entities.into_iter().map(|entity| self.route_entity(entity)).sum()
    }

    /// Update every system once, in execution order
    ///
    /// `dt` is the time since the previous call, in seconds. Zero is valid;
    /// a negative or non-finite value is logged and replaced by zero.
    pub fn update(&mut self, dt: f32) {
        let dt = if dt.is_finite() && dt >= 0.0 {
            dt
        } else {
            log::warn!("invalid frame delta {}; using 0", dt);
            0.0
        };

        log::trace!("frame {} (dt = {})", self.frame, dt);
        for (_, system) in self.systems.iter_mut() {
            system.update(dt);
        }
        self.frame += 1;
    }

    /// Tell every system to forget the entity
    ///
    /// Systems that never held the entity must treat this as a no-op.
    pub fn remove_entity(&mut self, entity: EntityId) {
        for (_, system) in self.systems.iter_mut() {
            system.remove(entity);
        }
    }

    /// Tell every system to forget a concrete entity
    pub fn remove(&mut self, entity: &Entity) {
        self.remove_entity(entity.id());
    }

    /// Iterate systems in execution order
    pub fn ordered_systems(&self) -> impl Iterator<Item = &dyn System> + '_ {
        self.systems.ordered_systems()
    }

    /// The system registry
    pub fn systems(&self) -> &SystemRegistry {
        &self.systems
    }

    /// First system of concrete type `S`
    pub fn system<S: System + 'static>(&self) -> Option<&S> {
        self.systems.get::<S>()
    }

    /// First system of concrete type `S`, mutably
    ///
    /// Use this for direct, explicit add calls on systems that are not
    /// routed by contracts.
    pub fn system_mut<S: System + 'static>(&mut self) -> Option<&mut S> {
        self.systems.get_mut::<S>()
    }

    /// Inclusion contracts recorded for a system
    pub fn inclusion_contracts(&self, id: SystemId) -> &[Contract] {
        self.inclusion.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Exclusion contracts recorded for a system
    pub fn exclusion_contracts(&self, id: SystemId) -> &[Contract] {
        self.exclusion.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Get the number of registered systems
    pub fn system_count(&self) -> usize {
        self.systems.len()
    }

    /// Number of completed updates
    pub fn frame(&self) -> u64 {
        self.frame
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}
