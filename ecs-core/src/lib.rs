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
//! # ECS Core
//!
//! The composition core of an Entity Component System: independent systems
//! run once per frame over entities built from components, without knowing
//! about each other.
//!
//! ## Features
//!
//! - **Identity**: unique, monotonic entity ids, safe to issue from many threads
//! - **Hierarchy**: parent/child links stored as ids, cycle-checked
//! - **Components**: one opaque, kind-tagged value per kind per entity
//! - **Ordering**: systems run by descending priority, stable on ties
//! - **Routing**: entities reach systems whose capability contracts they satisfy
//!
//! ## Example
//!
//! ```rust
//! use ecs_core::ecs::{CapabilityView, Component, Contract, EntityId, Shared, System, World};
//! use std::any::Any;
//!
//! struct Counter(u32);
//! impl Component for Counter {
//!     const KIND: &'static str = "Counter";
//! }
//!
//! #[derive(Default)]
//! struct CountSystem {
//!     counters: Vec<(EntityId, Shared<Counter>)>,
//! }
//!
//! impl System for CountSystem {
//!     fn update(&mut self, _dt: f32) {
//!         for (_, counter) in &self.counters {
//!             counter.write().0 += 1;
//!         }
//!     }
//!     fn remove(&mut self, entity: EntityId) {
//!         self.counters.retain(|(id, _)| *id != entity);
//!     }
//!     fn add_by_capability(&mut self, view: CapabilityView<'_>) {
//!         if let Some(counter) = view.get::<Counter>() {
//!             self.counters.push((view.id(), counter));
//!         }
//!     }
//!     fn as_any(&self) -> &dyn Any { self }
//!     fn as_any_mut(&mut self) -> &mut dyn Any { self }
//! }
//!
//! let mut world = World::new();
//! world
//!     .register_with_capabilities(
//!         CountSystem::default(),
//!         vec![Contract::new("counted").with::<Counter>()],
//!         Vec::new(),
//!     )
//!     .unwrap();
//!
//! let mut entity = world.new_entity_untagged();
//! entity.attach(Counter(0));
//! world.route_entity(&entity);
//! world.update(1.0 / 60.0);
//! assert_eq!(entity.get::<Counter>().unwrap().read().0, 1);
//! ```

#![warn(missing_docs)]

/// Entity Component System implementation
pub mod ecs;

/// Error types
pub mod error;

pub use ecs::{Entity, EntityId, World};
pub use error::{ConfigError, HierarchyError};
