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
//! Error types for the composition core
//!
//! Lookup misses are never errors; they surface as `Option::None`.
//! The enums here cover the two failure classes that abort an operation:
//! malformed routing configuration and invalid hierarchy edits.

use crate::ecs::EntityId;

/// Errors raised while registering a system's capability contracts.
///
/// A registration that fails with one of these leaves the world untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A contract was declared without a name.
    #[error("system '{system}' declared a contract with an empty name")]
    UnnamedContract {
        /// Name of the system being registered.
        system: String,
    },

    /// A contract carries no requirements and would match every entity.
    #[error("contract '{contract}' of system '{system}' has no requirements")]
    VacuousContract {
        /// Name of the system being registered.
        system: String,
        /// Name of the offending contract.
        contract: String,
    },

    /// The same contract appears in both the inclusion and exclusion sets.
    #[error("contract '{contract}' of system '{system}' is both included and excluded")]
    ConflictingContract {
        /// Name of the system being registered.
        system: String,
        /// Name of the offending contract.
        contract: String,
    },
}

/// Errors raised by hierarchy edits in an [`EntityArena`](crate::ecs::EntityArena).
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum HierarchyError {
    /// The referenced entity is not stored in the arena.
    #[error("{0} is not present in the arena")]
    UnknownEntity(EntityId),

    /// Appending would make an entity its own ancestor.
    #[error("appending {child} under {parent} would create a cycle")]
    Cycle {
        /// Requested parent.
        parent: EntityId,
        /// Requested child.
        child: EntityId,
    },
}
