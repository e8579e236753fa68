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
//! Capability contracts
//!
//! A [`Contract`] names the accessors an entity must expose to be routed to
//! a system: a set of component kinds and requirement tags. Every entity has
//! an identity, so that requirement is implicit. Matching only looks at which
//! kinds and tags are present, never at component values.
//!
//! ```
//! use ecs_core::ecs::{Component, Contract, IdRegistry};
//!
//! struct Position;
//! impl Component for Position {
//!     const KIND: &'static str = "Position";
//! }
//!
//! let movable = Contract::new("movable").with::<Position>();
//!
//! let registry = IdRegistry::new();
//! let mut entity = registry.new_entity(["player"]);
//! assert!(!movable.is_satisfied_by(&entity));
//! entity.attach(Position);
//! assert!(movable.is_satisfied_by(&entity));
//! ```

use crate::ecs::component::{Component, ComponentKind, Shared};
use crate::ecs::{Entity, EntityId};
use crate::error::ConfigError;

/// A named set of requirements an entity must satisfy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contract {
    name: String,
    kinds: Vec<ComponentKind>,
    tags: Vec<String>,
}

impl Contract {
    /// Create a contract with no requirements yet
    pub fn new(name: impl Into<String>) -> Self {
        Contract {
            name: name.into(),
            kinds: Vec::new(),
            tags: Vec::new(),
        }
    }

    /// Require a component of type `T`
    pub fn with<T: Component>(self) -> Self {
        self.with_kind(ComponentKind::of::<T>())
    }

    /// Require a component of the given kind
    pub fn with_kind(mut self, kind: ComponentKind) -> Self {
        if !self.kinds.contains(&kind) {
            self.kinds.push(kind);
        }
        self
    }

    /// Require a requirement tag
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        let tag = tag.into();
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
        self
    }

    /// Contract name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Required component kinds
    pub fn kinds(&self) -> &[ComponentKind] {
        &self.kinds
    }

    /// Required tags
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Check whether the entity exposes every required accessor
    pub fn is_satisfied_by(&self, entity: &Entity) -> bool {
        self.kinds.iter().all(|&kind| entity.has(kind))
            && self.tags.iter().all(|tag| entity.has_tag(tag))
    }

    /// Reject contracts that cannot be declared
    pub(crate) fn validate(&self, system: &str) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::UnnamedContract {
                system: system.to_string(),
            });
        }
        if self.kinds.is_empty() && self.tags.is_empty() {
            return Err(ConfigError::VacuousContract {
                system: system.to_string(),
                contract: self.name.clone(),
            });
        }
        Ok(())
    }
}

/// Validate an inclusion/exclusion pair as a whole
pub(crate) fn validate_sets(
    system: &str,
    inclusion: &[Contract],
    exclusion: &[Contract],
) -> Result<(), ConfigError> {
    for contract in inclusion.iter().chain(exclusion) {
        contract.validate(system)?;
    }
    if let Some(conflict) = inclusion.iter().find(|c| exclusion.contains(c)) {
        return Err(ConfigError::ConflictingContract {
            system: system.to_string(),
            contract: conflict.name.clone(),
        });
    }
    Ok(())
}

/// An entity as seen through the contract it matched
///
/// Handed to [`System::add_by_capability`](crate::ecs::System::add_by_capability).
/// Component handles obtained here share their value with the entity.
#[derive(Debug, Clone, Copy)]
pub struct CapabilityView<'a> {
    entity: &'a Entity,
    contract: &'a Contract,
}

impl<'a> CapabilityView<'a> {
    pub(crate) fn new(entity: &'a Entity, contract: &'a Contract) -> Self {
        CapabilityView { entity, contract }
    }

    /// Identifier of the routed entity
    pub fn id(&self) -> EntityId {
        self.entity.id()
    }

    /// Contract the entity matched
    pub fn contract(&self) -> &'a Contract {
        self.contract
    }

    /// Typed component handle
    pub fn get<T: Component>(&self) -> Option<Shared<T>> {
        self.entity.get::<T>()
    }

    /// The underlying entity
    pub fn entity(&self) -> &'a Entity {
        self.entity
    }
}
