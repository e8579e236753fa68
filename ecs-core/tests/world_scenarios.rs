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
//! End-to-end behavior of the composition core
//!
//! Each test drives the public API the way a host application would:
//! create entities, attach components, register systems, route, update.

use ecs_core::ecs::{
    CapabilityView, Component, ComponentKind, Contract, EntityArena, EntityId, Shared, System,
    World,
};
use std::any::Any;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

#[derive(Debug, PartialEq)]
struct K1 {
    value: i32,
}

impl Component for K1 {
    const KIND: &'static str = "K1";
}

#[derive(Debug, PartialEq)]
struct Position {
    x: f32,
    y: f32,
}

impl Component for Position {
    const KIND: &'static str = "Position";
}

struct Hidden;

impl Component for Hidden {
    const KIND: &'static str = "Hidden";
}

/// Increments every K1 it holds by one per frame.
#[derive(Default)]
struct IncrementSystem {
    entities: Vec<(EntityId, Shared<K1>)>,
}

impl IncrementSystem {
    fn add(&mut self, id: EntityId, k1: Shared<K1>) {
        self.entities.push((id, k1));
    }
}

impl System for IncrementSystem {
    fn update(&mut self, _dt: f32) {
        for (_, k1) in &self.entities {
            k1.write().value += 1;
        }
    }

    fn remove(&mut self, entity: EntityId) {
        if let Some(index) = self.entities.iter().position(|(id, _)| *id == entity) {
            self.entities.remove(index);
        }
    }

    fn add_by_capability(&mut self, view: CapabilityView<'_>) {
        if let Some(k1) = view.get::<K1>() {
            self.add(view.id(), k1);
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Records its name into a shared log every frame.
struct Recorder {
    name: &'static str,
    priority: i32,
    log: Arc<Mutex<Vec<&'static str>>>,
}

impl System for Recorder {
    fn update(&mut self, _dt: f32) {
        self.log.lock().unwrap().push(self.name);
    }

    fn remove(&mut self, _entity: EntityId) {}

    fn priority(&self) -> i32 {
        self.priority
    }

    fn name(&self) -> &str {
        self.name
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[test]
fn test_k1_incremented_after_one_frame() {
    let mut world = World::new();
    let mut entity = world.new_entity_untagged();
    entity.attach(K1 { value: 1 });

    world
        .register_with_capabilities(
            IncrementSystem::default(),
            vec![Contract::new("hasK1").with::<K1>()],
            Vec::new(),
        )
        .unwrap();

    assert_eq!(world.route_entity(&entity), 1);
    world.update(1.0);

    assert_eq!(entity.get::<K1>().unwrap().read().value, 2);
}

#[test]
fn test_stable_sort_of_equal_priorities() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut world = World::new();
    for (name, priority) in [("first5", 5), ("one", 1), ("second5", 5), ("zero", 0)] {
        world
            .insert_system(Recorder {
                name,
                priority,
                log: Arc::clone(&log),
            })
            .unwrap();
    }

    assert_eq!(world.systems().priorities(), vec![5, 5, 1, 0]);
    let names: Vec<&str> = world.ordered_systems().map(|s| s.name()).collect();
    assert_eq!(names, vec!["first5", "second5", "one", "zero"]);

    // same visitation order every frame
    world.update(0.016);
    world.update(0.016);
    assert_eq!(
        *log.lock().unwrap(),
        vec!["first5", "second5", "one", "zero", "first5", "second5", "one", "zero"]
    );
}

#[test]
fn test_inclusion_and_exclusion_routing() {
    let mut world = World::new();
    world
        .register_with_capabilities(
            IncrementSystem::default(),
            vec![Contract::new("A").with::<K1>()],
            vec![Contract::new("B").with::<Hidden>()],
        )
        .unwrap();

    let mut only_a = world.new_entity_untagged();
    only_a.attach(K1 { value: 0 });
    let mut a_and_b = world.new_entity_untagged();
    a_and_b.attach(K1 { value: 0 });
    a_and_b.attach(Hidden);

    assert_eq!(world.route_entity(&only_a), 1);
    assert_eq!(world.route_entity(&a_and_b), 0);

    let ids: Vec<EntityId> = world
        .system::<IncrementSystem>()
        .unwrap()
        .entities
        .iter()
        .map(|(id, _)| *id)
        .collect();
    assert_eq!(ids, vec![only_a.id()]);
}

#[test]
fn test_unmatched_entity_is_not_an_error() {
    let mut world = World::new();
    world
        .register_with_capabilities(
            IncrementSystem::default(),
            vec![Contract::new("hasK1").with::<K1>()],
            Vec::new(),
        )
        .unwrap();

    let bare = world.new_entity_untagged();
    assert_eq!(world.route_entity(&bare), 0);
    world.update(0.0);
}

#[test]
fn test_tag_contracts_route_by_requirement_tag() {
    let mut world = World::new();
    world
        .register_with_capabilities(
            IncrementSystem::default(),
            vec![Contract::new("counted").with_tag("IncrementSystem").with::<K1>()],
            Vec::new(),
        )
        .unwrap();

    let mut tagged = world.new_entity(["IncrementSystem"]);
    tagged.attach(K1 { value: 10 });
    let mut untagged = world.new_entity_untagged();
    untagged.attach(K1 { value: 10 });

    let routed = world.route_entities([&tagged, &untagged]);
    assert_eq!(routed, 1);

    world.update(0.5);
    assert_eq!(tagged.get::<K1>().unwrap().read().value, 11);
    assert_eq!(untagged.get::<K1>().unwrap().read().value, 10);
}

#[test]
fn test_direct_add_and_world_removal() {
    let mut world = World::new();
    world.insert_system(IncrementSystem::default()).unwrap();

    let mut entity = world.new_entity_untagged();
    entity.attach(K1 { value: 0 });

    assert_eq!(world.route_entity(&entity), 0);
    assert!(world.system::<IncrementSystem>().unwrap().entities.is_empty());

    let k1 = entity.get::<K1>().unwrap();
    world
        .system_mut::<IncrementSystem>()
        .unwrap()
        .add(entity.id(), k1);
    assert_eq!(world.system::<IncrementSystem>().unwrap().entities.len(), 1);

    world.remove_entity(entity.id());
    assert!(world.system::<IncrementSystem>().unwrap().entities.is_empty());
}

#[test]
fn test_priority_order_is_observed_within_a_frame() {
    #[derive(Default)]
    struct Stage {
        priority: i32,
        seen: Vec<i32>,
        k1: Option<Shared<K1>>,
    }

    impl System for Stage {
        fn update(&mut self, _dt: f32) {
            if let Some(k1) = &self.k1 {
                let mut k1 = k1.write();
                self.seen.push(k1.value);
                k1.value = self.priority;
            }
        }

        fn remove(&mut self, _entity: EntityId) {
            self.k1 = None;
        }

        fn priority(&self) -> i32 {
            self.priority
        }

        fn add_by_capability(&mut self, view: CapabilityView<'_>) {
            self.k1 = view.get::<K1>();
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    let mut world = World::new();
    let contract = || vec![Contract::new("hasK1").with::<K1>()];
    world
        .register_with_capabilities(Stage { priority: 1, ..Stage::default() }, contract(), Vec::new())
        .unwrap();
    world
        .register_with_capabilities(Stage { priority: 500, ..Stage::default() }, contract(), Vec::new())
        .unwrap();

    let mut entity = world.new_entity_untagged();
    entity.attach(K1 { value: 0 });
    assert_eq!(world.route_entity(&entity), 2);

    world.update(1.0);
    // the priority-1 stage ran second and saw the priority-500 write
    let seen: Vec<Vec<i32>> = world
        .ordered_systems()
        .map(|s| s.as_any().downcast_ref::<Stage>().unwrap().seen.clone())
        .collect();
    assert_eq!(seen, vec![vec![0], vec![500]]);
    assert_eq!(entity.get::<K1>().unwrap().read().value, 1);
}

#[test]
fn test_component_replace_semantics() {
    let world = World::new();
    let mut entity = world.new_entity_untagged();
    entity.attach(Position { x: 1.0, y: 1.0 });
    entity.attach(Position { x: 2.0, y: 2.0 });

    assert_eq!(entity.components().len(), 1);
    assert_eq!(*entity.get::<Position>().unwrap().read(), Position { x: 2.0, y: 2.0 });

    assert!(entity.detach(ComponentKind::new("Position")));
    assert!(entity.get::<Position>().is_none());
    assert!(!entity.detach(ComponentKind::new("Position")));
}

#[test]
fn test_hierarchy_integrity() {
    let world = World::new();
    let mut arena = EntityArena::new();
    let p = arena.spawn(world.new_entity_untagged());
    let c = arena.spawn(world.new_entity_untagged());

    arena.append_child(p, c).unwrap();
    arena.remove_child(p, c);

    assert!(arena.parent(c).is_none());
    assert!(!arena.children(p).contains(&c));
}

#[test]
fn test_descendant_traversal() {
    let world = World::new();
    let mut arena = EntityArena::new();
    let ids: Vec<EntityId> = world
        .new_entities(4)
        .into_iter()
        .map(|entity| arena.spawn(entity))
        .collect();
    let (p, a, b, c) = (ids[0], ids[1], ids[2], ids[3]);
    arena.append_child(p, a).unwrap();
    arena.append_child(p, b).unwrap();
    arena.append_child(a, c).unwrap();

    let descendants = arena.descendants(p);
    let set: HashSet<EntityId> = descendants.iter().copied().collect();
    assert_eq!(set, [a, b, c].into_iter().collect());
    assert!(!descendants.contains(&p));
    // fresh on every call
    assert_eq!(arena.descendants(p), descendants);
}

#[test]
fn test_arena_entities_route_and_update() {
    let mut world = World::new();
    world
        .register_with_capabilities(
            IncrementSystem::default(),
            vec![Contract::new("hasK1").with::<K1>()],
            Vec::new(),
        )
        .unwrap();

    let mut arena = EntityArena::new();
    for mut entity in world.new_entities(3) {
        entity.attach(K1 { value: 0 });
        arena.spawn(entity);
    }

    let routed = world.route_entities(arena.iter());
    assert_eq!(routed, 3);

    world.update(1.0);
    world.update(1.0);
    assert!(arena
        .iter()
        .all(|entity| entity.get::<K1>().unwrap().read().value == 2));
}
