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
//! Component storage and management
//!
//! Components are opaque data records attached to entities. Each component
//! type declares a stable kind tag, and an entity stores at most one
//! component per kind. Values live in [`Shared`] handles so that a system
//! holding a component observes the same value the host reads back.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Trait that all components must implement
///
/// Components should be plain data structures without behavior. The kind
/// tag must be distinct across component types; two types sharing a tag
/// replace each other on attach.
///
/// ```
/// use ecs_core::ecs::Component;
///
/// struct Health(u32);
///
/// impl Component for Health {
///     const KIND: &'static str = "Health";
/// }
/// ```
pub trait Component: Send + Sync + 'static {
    /// Stable tag identifying this kind of component.
    const KIND: &'static str;
}

/// Discriminator under which a component is stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentKind(&'static str);

impl ComponentKind {
    /// Create a kind from a raw tag
    pub const fn new(tag: &'static str) -> Self {
        ComponentKind(tag)
    }

    /// Kind declared by the component type `T`
    pub const fn of<T: Component>() -> Self {
        ComponentKind(T::KIND)
    }

    /// Get the raw tag
    pub fn name(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Shared handle to a component value
///
/// Cloning the handle does not clone the value. A poisoned lock is
/// recovered rather than propagated, since a frame has no error channel.
pub struct Shared<T>(Arc<RwLock<T>>);

impl<T> Shared<T> {
    /// Wrap a value in a new handle
    pub fn new(value: T) -> Self {
        Shared(Arc::new(RwLock::new(value)))
    }

    /// Borrow the value for reading
    pub fn read(&self) -> RwLockReadGuard<'_, T> {
        self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Borrow the value for writing
    pub fn write(&self) -> RwLockWriteGuard<'_, T> {
        self.0.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether two handles point at the same value
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<T> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Shared(Arc::clone(&self.0))
    }
}

impl<T: fmt::Debug> fmt::Debug for Shared<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Shared").field(&*self.read()).finish()
    }
}

/// Type-erased component handle as stored in a [`ComponentMap`]
#[derive(Clone)]
pub struct ErasedComponent {
    kind: ComponentKind,
    type_name: &'static str,
    value: Arc<dyn Any + Send + Sync>,
}

impl ErasedComponent {
    fn from_shared<T: Component>(shared: Shared<T>) -> Self {
        ErasedComponent {
            kind: ComponentKind::of::<T>(),
            type_name: std::any::type_name::<T>(),
            value: shared.0,
        }
    }

    /// Kind this component was stored under
    pub fn kind(&self) -> ComponentKind {
        self.kind
    }

    /// Rust type name of the stored value, for diagnostics
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Recover the typed handle, or `None` if the value is not a `T`
    pub fn downcast<T: Component>(&self) -> Option<Shared<T>> {
        Arc::clone(&self.value)
            .downcast::<RwLock<T>>()
            .ok()
            .map(Shared)
    }
}

impl fmt::Debug for ErasedComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErasedComponent")
            .field("kind", &self.kind)
            .field("type_name", &self.type_name)
            .finish()
    }
}

/// Per-entity mapping from component kind to component value
#[derive(Debug, Clone, Default)]
pub struct ComponentMap {
    components: HashMap<ComponentKind, ErasedComponent>,
}

impl ComponentMap {
    /// Create an empty map
    pub fn new() -> Self {
        ComponentMap {
            components: HashMap::new(),
        }
    }

    /// Store a component, replacing any component of the same kind
    ///
    /// Returns the replaced component, if any.
    pub fn attach<T: Component>(&mut self, component: T) -> Option<ErasedComponent> {
        self.attach_shared(Shared::new(component))
    }

    /// Store an existing handle, replacing any component of the same kind
    pub fn attach_shared<T: Component>(&mut self, component: Shared<T>) -> Option<ErasedComponent> {
        self.components
            .insert(ComponentKind::of::<T>(), ErasedComponent::from_shared(component))
    }

    /// Remove the component of the given kind
    ///
    /// Returns `false` when nothing was stored under that kind.
    pub fn detach(&mut self, kind: ComponentKind) -> bool {
        self.components.remove(&kind).is_some()
    }

    /// Typed retrieval
    ///
    /// `None` when the kind is absent or stored by a different type.
    pub fn get<T: Component>(&self) -> Option<Shared<T>> {
        self.components
            .get(&ComponentKind::of::<T>())
            .and_then(ErasedComponent::downcast::<T>)
    }

    /// Untyped retrieval by kind
    pub fn get_erased(&self, kind: ComponentKind) -> Option<&ErasedComponent> {
        self.components.get(&kind)
    }

    /// Check if a component of the given kind is stored
    pub fn has(&self, kind: ComponentKind) -> bool {
        self.components.contains_key(&kind)
    }

    /// Iterate the stored kinds, in no particular order
    pub fn kinds(&self) -> impl Iterator<Item = ComponentKind> + '_ {
        self.components.keys().copied()
    }

    /// Number of stored components
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Check if no components are stored
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}
