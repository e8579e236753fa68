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
//! Entity hierarchies
//!
//! The [`EntityArena`] owns entities and edits parent/child links between
//! them. Links are stored as identifiers on both ends, so removing an entity
//! or an edge never leaves a dangling reference.
//!
//! Despawning does not cascade: children of a despawned entity become roots.
//! Recursive deletion is left to the host, e.g. by despawning every id in
//! [`EntityArena::descendants`] first.

use crate::ecs::{Entity, EntityId};
use crate::error::HierarchyError;
use std::collections::HashMap;

/// Owner of entities and their hierarchy links
#[derive(Debug, Default)]
pub struct EntityArena {
    entities: HashMap<EntityId, Entity>,
}

impl EntityArena {
    /// Create an empty arena
    pub fn new() -> Self {
        EntityArena {
            entities: HashMap::new(),
        }
    }

    /// Take ownership of an entity
    ///
    /// Any hierarchy links the entity carries in are dropped; edges are only
    /// created through [`append_child`](Self::append_child).
    pub fn spawn(&mut self, mut entity: Entity) -> EntityId {
        let id = entity.id();
        entity.parent = None;
        entity.children.clear();
        if let Some(previous) = self.entities.insert(id, entity) {
            // Same id spawned twice: sever the old copy's edges.
            self.unlink(&previous);
        }
        id
    }

    /// Remove an entity, orphaning its children
    pub fn despawn(&mut self, id: EntityId) -> Option<Entity> {
        let mut entity = self.entities.remove(&id)?;
        self.unlink(&entity);
        entity.parent = None;
        entity.children.clear();
        Some(entity)
    }

    /// Get an entity
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Get an entity mutably
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// Check if an entity is stored
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// Number of stored entities
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Check if the arena is empty
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Iterate stored entities, in no particular order
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    /// Make `child` the last child of `parent`
    ///
    /// A child that already has a parent is detached from it first.
    ///
    /// # Errors
    ///
    /// - [`HierarchyError::UnknownEntity`] if either id is not in the arena
    /// - [`HierarchyError::Cycle`] if `child` is `parent` or one of its ancestors
    pub fn append_child(&mut self, parent: EntityId, child: EntityId) -> Result<(), HierarchyError> {
        if !self.contains(parent) {
            return Err(HierarchyError::UnknownEntity(parent));
        }
        if !self.contains(child) {
            return Err(HierarchyError::UnknownEntity(child));
        }
        if parent == child || self.ancestors(parent).contains(&child) {
            return Err(HierarchyError::Cycle { parent, child });
        }

        if let Some(old_parent) = self.parent(child) {
            self.remove_child(old_parent, child);
        }
        if let Some(entity) = self.entities.get_mut(&child) {
            entity.parent = Some(parent);
        }
        if let Some(entity) = self.entities.get_mut(&parent) {
            entity.children.push(child);
        }
        Ok(())
    }

    /// Remove the first occurrence of `child` from `parent`'s children
    ///
    /// No-op when `child` is not a child of `parent`.
    pub fn remove_child(&mut self, parent: EntityId, child: EntityId) {
        let removed = match self.entities.get_mut(&parent) {
            Some(entity) => match entity.children.iter().position(|&c| c == child) {
                Some(index) => {
                    entity.children.remove(index);
                    true
                }
                None => false,
            },
            None => false,
        };

        if removed {
            if let Some(entity) = self.entities.get_mut(&child) {
                if entity.parent == Some(parent) {
                    entity.parent = None;
                }
            }
        }
    }

    /// Children of `id` in insertion order; empty when unknown
    pub fn children(&self, id: EntityId) -> Vec<EntityId> {
        self.entities
            .get(&id)
            .map(|entity| entity.children.clone())
            .unwrap_or_default()
    }

    /// Parent of `id`, if any
    pub fn parent(&self, id: EntityId) -> Option<EntityId> {
        self.entities.get(&id).and_then(|entity| entity.parent)
    }

    /// All descendants of `id` in depth-first post-order, excluding `id`
    ///
    /// Recomputed on every call. Iterative, so deep trees cannot overflow
    /// the stack.
    pub fn descendants(&self, id: EntityId) -> Vec<EntityId> {
        let mut result = Vec::new();
        // (node, index of the next child to visit)
        let mut stack: Vec<(EntityId, usize)> = vec![(id, 0)];

        while let Some((node, next)) = stack.pop() {
            let children = self
                .entities
                .get(&node)
                .map(|entity| entity.children.as_slice())
                .unwrap_or(&[]);

            if let Some(&child) = children.get(next) {
                stack.push((node, next + 1));
                stack.push((child, 0));
            } else if node != id {
                result.push(node);
            }
        }
        result
    }

    /// Ancestors of `id`, nearest first
    pub fn ancestors(&self, id: EntityId) -> Vec<EntityId> {
        let mut result = Vec::new();
        let mut current = self.parent(id);
        while let Some(ancestor) = current {
            result.push(ancestor);
            current = self.parent(ancestor);
        }
        result
    }

    /// Sever both directions of every edge touching `entity`
    fn unlink(&mut self, entity: &Entity) {
        let id = entity.id();
        if let Some(parent) = entity.parent {
            if let Some(parent_entity) = self.entities.get_mut(&parent) {
                parent_entity.children.retain(|&c| c != id);
            }
        }
        for child in &entity.children {
            if let Some(child_entity) = self.entities.get_mut(child) {
                if child_entity.parent == Some(id) {
                    child_entity.parent = None;
                }
            }
        }
    }
}
