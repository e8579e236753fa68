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
//! Frame loop example
//!
//! Builds a small scene hierarchy, routes its entities to two systems with
//! different priorities and runs a few frames.
//!
//! Run with `RUST_LOG=debug cargo run --example frame_loop` to see routing
//! decisions.

use ecs_core::ecs::{
    CapabilityView, Component, Contract, EntityArena, EntityId, InitContext, Shared, System, World,
};
use std::any::Any;

#[derive(Debug)]
struct Position {
    x: f32,
    y: f32,
}

impl Component for Position {
    const KIND: &'static str = "Position";
}

#[derive(Debug)]
struct Velocity {
    dx: f32,
    dy: f32,
}

impl Component for Velocity {
    const KIND: &'static str = "Velocity";
}

struct Static;

impl Component for Static {
    const KIND: &'static str = "Static";
}

/// Applies velocity to position; declares its own contracts.
#[derive(Default)]
struct MovementSystem {
    bodies: Vec<(EntityId, Shared<Position>, Shared<Velocity>)>,
}

impl System for MovementSystem {
    fn update(&mut self, dt: f32) {
        for (_, position, velocity) in &self.bodies {
            let velocity = velocity.read();
            let mut position = position.write();
            position.x += velocity.dx * dt;
            position.y += velocity.dy * dt;
        }
    }

    fn remove(&mut self, entity: EntityId) {
        self.bodies.retain(|(id, _, _)| *id != entity);
    }

    fn priority(&self) -> i32 {
        10
    }

    fn initialize(&mut self, context: &mut InitContext<'_>) {
        context.include(Contract::new("moving").with::<Position>().with::<Velocity>());
        context.exclude(Contract::new("static").with::<Static>());
    }

    fn add_by_capability(&mut self, view: CapabilityView<'_>) {
        if let (Some(position), Some(velocity)) = (view.get::<Position>(), view.get::<Velocity>()) {
            self.bodies.push((view.id(), position, velocity));
        }
    }

    fn name(&self) -> &str {
        "MovementSystem"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Prints positions after movement has run.
#[derive(Default)]
struct ReportSystem {
    positions: Vec<(EntityId, Shared<Position>)>,
}

impl System for ReportSystem {
    fn update(&mut self, _dt: f32) {
        for (id, position) in &self.positions {
            let position = position.read();
            println!("  {} at ({:.2}, {:.2})", id, position.x, position.y);
        }
    }

    fn remove(&mut self, entity: EntityId) {
        self.positions.retain(|(id, _)| *id != entity);
    }

    fn add_by_capability(&mut self, view: CapabilityView<'_>) {
        if let Some(position) = view.get::<Position>() {
            self.positions.push((view.id(), position));
        }
    }

    fn name(&self) -> &str {
        "ReportSystem"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    println!("ECS Core - Frame Loop Example");
    println!("=============================\n");

    let mut world = World::new();
    world.insert_system(MovementSystem::default())?;
    world.register_with_capabilities(
        ReportSystem::default(),
        vec![Contract::new("positioned").with::<Position>()],
        Vec::new(),
    )?;

    for system in world.ordered_systems() {
        println!("System: {} (priority {})", system.name(), system.priority());
    }

    let mut arena = EntityArena::new();

    let mut ship = world.new_entity(["player"]);
    ship.attach(Position { x: 0.0, y: 0.0 });
    ship.attach(Velocity { dx: 1.0, dy: 0.5 });
    let ship = arena.spawn(ship);

    let mut turret = world.new_entity(["player"]);
    turret.attach(Position { x: 0.0, y: 0.0 });
    turret.attach(Velocity { dx: 1.0, dy: 0.5 });
    let turret = arena.spawn(turret);
    arena.append_child(ship, turret)?;

    let mut beacon = world.new_entity_untagged();
    beacon.attach(Position { x: 5.0, y: 5.0 });
    beacon.attach(Velocity { dx: 9.0, dy: 9.0 });
    beacon.attach(Static);
    arena.spawn(beacon);

    let routed = world.route_entities(arena.iter());
    println!("\nRouted {} entities into {} deliveries", arena.len(), routed);
    println!("Ship subtree: {:?}\n", arena.descendants(ship));

    for frame in 0..3 {
        println!("Frame {}:", frame);
        world.update(0.5);
    }

    // Despawning the ship does not despawn the turret.
    if let Some(removed) = arena.despawn(ship) {
        world.remove_entity(removed.id());
    }
    println!("\nAfter despawning the ship ({} entities left):", arena.len());
    world.update(0.5);

    Ok(())
}
