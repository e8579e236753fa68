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
//! Entity management
//!
//! Entities are unique identifiers that tie together components. An
//! [`IdRegistry`] issues the identifiers; it is the only part of the core
//! that is safe to call from several threads at once.
//!
//! # Exhaustion
//!
//! Identifiers are never reused while the counter stays below its ceiling
//! (`u64::MAX` by default). An issuance that would reach the ceiling restarts
//! the counter at 1, logs a warning and bumps
//! [`RegistryStats::wraparounds`]. Hosts that can run that long must check
//! the statistic.

use crate::ecs::component::{Component, ComponentKind, ComponentMap, ErasedComponent, Shared};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Unique identifier for an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(u64);

impl EntityId {
    /// Create a new EntityId from a raw u64 value
    pub fn new(id: u64) -> Self {
        EntityId(id)
    }

    /// Get the raw u64 value
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

/// An identifier plus its requirement tags, components and hierarchy links
///
/// Entities carry no behavior. Hierarchy links are identifiers, edited
/// through an [`EntityArena`](crate::ecs::EntityArena) so both directions
/// stay consistent.
#[derive(Debug)]
pub struct Entity {
    id: EntityId,
    tags: Vec<String>,
    components: ComponentMap,
    pub(crate) parent: Option<EntityId>,
    pub(crate) children: Vec<EntityId>,
}

impl Entity {
    /// Create an entity without tags or components
    pub fn new(id: EntityId) -> Self {
        Self::with_tags(id, Vec::new())
    }

    /// Create an entity carrying the given requirement tags
    pub fn with_tags(id: EntityId, tags: Vec<String>) -> Self {
        Entity {
            id,
            tags,
            components: ComponentMap::new(),
            parent: None,
            children: Vec::new(),
        }
    }

    /// Get the entity ID
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Requirement tags given at creation
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Check for a requirement tag
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Attach a component, replacing any component of the same kind
    pub fn attach<T: Component>(&mut self, component: T) -> Option<ErasedComponent> {
        self.components.attach(component)
    }

    /// Attach an existing component handle
    pub fn attach_shared<T: Component>(&mut self, component: Shared<T>) -> Option<ErasedComponent> {
        self.components.attach_shared(component)
    }

    /// Detach the component of the given kind; no-op if absent
    pub fn detach(&mut self, kind: ComponentKind) -> bool {
        self.components.detach(kind)
    }

    /// Typed component retrieval
    pub fn get<T: Component>(&self) -> Option<Shared<T>> {
        self.components.get::<T>()
    }

    /// Check if a component of the given kind is attached
    pub fn has(&self, kind: ComponentKind) -> bool {
        self.components.has(kind)
    }

    /// The entity's component map
    pub fn components(&self) -> &ComponentMap {
        &self.components
    }

    /// Parent identifier, if any
    pub fn parent(&self) -> Option<EntityId> {
        self.parent
    }

    /// Child identifiers in insertion order
    pub fn children(&self) -> &[EntityId] {
        &self.children
    }

    /// Copy this entity under a fresh identifier
    ///
    /// Tags are copied and component handles are shared with the source, so
    /// both entities see the same component values. Hierarchy links are not
    /// copied.
    pub fn duplicate(&self, registry: &IdRegistry) -> Entity {
        self.copy_as(registry.next_id())
    }

    /// Make `count` copies with one block reservation
    pub fn duplicate_many(&self, registry: &IdRegistry, count: usize) -> Vec<Entity> {
        registry
            .next_ids(count)
            .into_iter()
            .map(|id| self.copy_as(id))
            .collect()
    }

    fn copy_as(&self, id: EntityId) -> Entity {
        Entity {
            id,
            tags: self.tags.clone(),
            components: self.components.clone(),
            parent: None,
            children: Vec::new(),
        }
    }
}

/// Configuration for identifier issuance
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// High-water mark to start from; the first issued id is one above it
    pub start_after: u64,
    /// Counter value that triggers the reset to 1
    pub ceiling: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        RegistryConfig {
            start_after: 0,
            ceiling: u64::MAX,
        }
    }
}

impl RegistryConfig {
    /// Start issuing after the given high-water mark
    pub fn starting_after(mut self, high_water: u64) -> Self {
        self.start_after = high_water;
        self
    }

    /// Lower the exhaustion ceiling
    pub fn with_ceiling(mut self, ceiling: u64) -> Self {
        assert!(ceiling >= 2, "Ceiling must leave room for at least one id");
        self.ceiling = ceiling;
        self
    }
}

/// Statistics for monitoring identifier issuance
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryStats {
    /// Total identifiers handed out
    pub issued: u64,
    /// Number of times the counter hit its ceiling and restarted at 1
    pub wraparounds: u64,
    /// Last identifier handed out
    pub high_water: u64,
}

/// Issues globally unique, monotonically increasing entity identifiers
///
/// Share one registry (usually behind an `Arc`) between every call site that
/// creates entities for the same world. Separate registries are isolated.
///
/// ```
/// use ecs_core::ecs::IdRegistry;
///
/// let registry = IdRegistry::new();
/// let first = registry.next_id();
/// let block = registry.next_ids(3);
/// assert_eq!(block[0].raw(), first.raw() + 1);
/// ```
#[derive(Debug)]
pub struct IdRegistry {
    counter: AtomicU64,
    ceiling: u64,
    issued: AtomicU64,
    wraparounds: AtomicU64,
}

impl IdRegistry {
    /// Create a registry whose first id is 1
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create a registry with custom configuration
    pub fn with_config(config: RegistryConfig) -> Self {
        assert!(
            config.start_after < config.ceiling,
            "start_after must be below the ceiling"
        );
        IdRegistry {
            counter: AtomicU64::new(config.start_after),
            ceiling: config.ceiling,
            issued: AtomicU64::new(0),
            wraparounds: AtomicU64::new(0),
        }
    }

    /// Issue one identifier
    pub fn next_id(&self) -> EntityId {
        EntityId(self.reserve(1))
    }

    /// Issue `count` contiguous identifiers in ascending order
    ///
    /// The block starts immediately after the previous high-water mark,
    /// unless the ceiling forces a reset, in which case it starts at 1.
    pub fn next_ids(&self, count: usize) -> Vec<EntityId> {
        if count == 0 {
            return Vec::new();
        }
        let first = self.reserve(count as u64);
        (first..first + count as u64).map(EntityId).collect()
    }

    /// Create an entity carrying the given requirement tags
    pub fn new_entity<I, S>(&self, tags: I) -> Entity
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Entity::with_tags(self.next_id(), tags.into_iter().map(Into::into).collect())
    }

    /// Create an entity with no requirement tags
    pub fn new_entity_untagged(&self) -> Entity {
        Entity::new(self.next_id())
    }

    /// Create `count` entities with one block reservation
    pub fn new_entities(&self, count: usize) -> Vec<Entity> {
        let ids = self.next_ids(count);

        #[cfg(feature = "parallel")]
        {
            ids.into_par_iter().map(Entity::new).collect()
        }
        #[cfg(not(feature = "parallel"))]
        {
            ids.into_iter().map(Entity::new).collect()
        }
    }

    /// Last identifier handed out (the start-after value before any issuance)
    pub fn high_water(&self) -> u64 {
        self.counter.load(Ordering::SeqCst)
    }

    /// Get current issuance statistics
    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            issued: self.issued.load(Ordering::Relaxed),
            wraparounds: self.wraparounds.load(Ordering::Relaxed),
            high_water: self.high_water(),
        }
    }

    /// Atomically advance the counter by `count`, returning the first id of
    /// the reserved block.
    fn reserve(&self, count: u64) -> u64 {
        assert!(
            count < self.ceiling,
            "Cannot reserve {} ids below a ceiling of {}",
            count,
            self.ceiling
        );
        let ceiling = self.ceiling;
        let fits = |current: u64| current.checked_add(count).map_or(false, |end| end < ceiling);

        let previous = match self.counter.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |current| {
            if fits(current) {
                Some(current + count)
            } else {
                Some(count)
            }
        }) {
            Ok(previous) | Err(previous) => previous,
        };
        self.issued.fetch_add(count, Ordering::Relaxed);

        if fits(previous) {
            previous + 1
        } else {
            self.wraparounds.fetch_add(1, Ordering::Relaxed);
            log::warn!(
                "entity id counter reached its ceiling ({}); restarting at 1",
                ceiling
            );
            1
        }
    }
}

impl Default for IdRegistry {
    fn default() -> Self {
        Self::new()
    }
}
