use forage_engine::{
    collision::CollisionBody,
    ecs::{Entity, EntityRef, EntityType, Pool},
    math::Vec2,
    orientation::Orientation,
};
use log::debug;
use rand::Rng;

use crate::{
    components::{Agent, Components, Label, Sprite},
    entities::{Food, Npc},
    world::World,
};

pub const RADIUS: f32 = 0.5;

/// Energy burned per second standing still.
pub const METABOLIC_COST: f32 = 0.5;

/// Extra energy burned per second per unit of speed.
pub const MOVEMENT_COST: f32 = 1.0;

/// NPCs below this share of their maximum energy eat from their inventory.
pub const HUNGER: f32 = 0.5;

/// Largest wandering turn, in radians per second.
pub const WANDER_RATE: f32 = 2.0;

const SPRITE_ID: u32 = 0;
const SPRITE_ORIGIN: Vec2 = Vec2::new(64.0, 64.0);
const SPRITE_COLOR: [f32; 3] = [0.2, 0.4, 0.9];

/// Create an NPC at `position` moving along `heading` at its default speed.
pub fn spawn(pool: &mut Pool<Components>, position: Vec2, heading: f32) -> Entity<Npc> {
    let npc = pool.create_entity::<Npc>();
    *npc.component_mut::<Label>(pool) = Label::of::<Npc>();
    *npc.component_mut::<CollisionBody>(pool) = CollisionBody::of::<Npc>(RADIUS);
    *npc.component_mut::<Orientation>(pool) = Orientation::new(position, heading, 1.0);
    *npc.component_mut::<Sprite>(pool) = Sprite {
        sprite_id: SPRITE_ID,
        origin: SPRITE_ORIGIN,
        scale: RADIUS / SPRITE_ORIGIN.x,
        color: SPRITE_COLOR,
    };
    let agent = npc.component_mut::<Agent>(pool);
    agent.velocity = Vec2::from_angle(heading) * agent.speed;
    npc
}

/// One step of an NPC's life: metabolism, eating, steering, movement and the world boundary.
pub fn update(world: &mut World, npc: EntityRef<Npc>, dt: f32) {
    let mut agent = *npc.component::<Agent>(world.pool());
    agent.energy -= (METABOLIC_COST + MOVEMENT_COST * agent.speed) * dt;
    if agent.energy <= 0.0 {
        debug!("npc {} starved", npc.slot());
        world.remove_npc(npc);
        return;
    }
    if agent.energy < agent.max_energy * HUNGER {
        agent.eat_from_inventory();
    }

    let position = npc.component::<Orientation>(world.pool()).position();
    let radius = npc.component::<CollisionBody>(world.pool()).radius;
    let target = if agent.inventory_space() > 0.0 {
        nearest_food(world, position, agent.sight_radius)
    } else {
        None
    };
    let direction = match target {
        Some(food) => (food - position).normalized(),
        None => {
            let turn = world.rng_mut().gen_range(-WANDER_RATE..=WANDER_RATE) * dt;
            Vec2::from_angle(agent.velocity.angle() + turn)
        }
    };
    if direction != Vec2::ZERO {
        agent.velocity = direction * agent.speed;
    }

    let mut next = position + agent.velocity * dt;
    let limit = world.size() - radius;
    if next.norm() > limit {
        let normal = next.normalized();
        if agent.velocity.dot(normal) > 0.0 {
            agent.velocity = agent.velocity.reflect(normal);
        }
        next = normal * limit;
    }

    let pool = world.pool_mut();
    *npc.component_mut::<Agent>(pool) = agent;
    let orientation = npc.component_mut::<Orientation>(pool);
    orientation.set_position(next);
    orientation.set_rotation(agent.velocity.angle());
}

/// Position of the closest food within `sight` of `position`.
fn nearest_food(world: &mut World, position: Vec2, sight: f32) -> Option<Vec2> {
    let found = world.entities_within(position, sight);
    found
        .into_iter()
        .filter(|&(_, entity_type)| entity_type == Food::ID)
        .filter_map(|(slot, _)| world.pool().get::<Orientation>(slot).map(Orientation::position))
        .min_by(|a, b| {
            (*a - position)
                .squared_norm()
                .total_cmp(&(*b - position).squared_norm())
        })
}

#[cfg(test)]
mod tests {
    use forage_engine::collision::CollisionContext;

    use super::*;
    use crate::world::tests::empty_world;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn spawn_sets_up_components() {
        // Given
        let mut world = empty_world();

        // When
        let npc = world.spawn_npc(Vec2::new(1.0, 2.0), 0.0).unwrap();

        // Then
        let pool = world.pool();
        assert_eq!(npc.component::<Label>(pool).entity_type, Npc::ID);
        assert_eq!(npc.component::<CollisionBody>(pool).radius, RADIUS);
        assert_eq!(npc.component::<Sprite>(pool).sprite_id, 0);
        assert_eq!(npc.component::<Agent>(pool).velocity, Vec2::new(1.5, 0.0));
        assert_eq!(npc.component::<Orientation>(pool).position(), Vec2::new(1.0, 2.0));
    }

    #[test]
    fn burns_energy_and_moves() {
        // Given
        let mut world = empty_world();
        let npc = world.spawn_npc(Vec2::ZERO, 0.0).unwrap();

        // When
        update(&mut world, npc, DT);

        // Then
        let agent = npc.component::<Agent>(world.pool());
        assert!((agent.energy - (100.0 - 2.0 * DT)).abs() < 1e-4);
        let orientation = npc.component::<Orientation>(world.pool());
        assert!(orientation.position().norm() > 0.0);
        assert!((orientation.rotation() - agent.velocity.angle()).abs() < 1e-6);
    }

    #[test]
    fn starving_npc_is_removed() {
        // Given
        let mut world = empty_world();
        let npc = world.spawn_npc(Vec2::ZERO, 0.0).unwrap();
        npc.component_mut::<Agent>(world.pool_mut()).energy = 0.01;

        // When
        update(&mut world, npc, DT);

        // Then
        assert!(world.is_retired(&npc.occupant()));
    }

    #[test]
    fn hungry_npc_eats_from_inventory() {
        // Given
        let mut world = empty_world();
        let npc = world.spawn_npc(Vec2::ZERO, 0.0).unwrap();
        let agent = npc.component_mut::<Agent>(world.pool_mut());
        agent.energy = 20.0;
        agent.food_in_inventory = 0.5;

        // When
        update(&mut world, npc, DT);

        // Then
        let agent = npc.component::<Agent>(world.pool());
        assert!(agent.energy > 69.0);
        assert!(agent.food_in_inventory < 1e-5);
    }

    #[test]
    fn steers_toward_nearest_food() {
        // Given
        let mut world = empty_world();
        let npc = world.spawn_npc(Vec2::ZERO, 0.0).unwrap();
        world.spawn_food(Vec2::new(0.0, 3.0), 0.1);
        world.spawn_food(Vec2::new(0.0, -4.0), 0.1);
        world.spawn_food(Vec2::new(9.0, 0.0), 0.1);

        // When
        update(&mut world, npc, DT);

        // Then
        let velocity = npc.component::<Agent>(world.pool()).velocity;
        assert!(velocity.x.abs() < 1e-5);
        assert!((velocity.y - 1.5).abs() < 1e-5);
    }

    #[test]
    fn boundary_reflects_outward_velocity() {
        // Given
        let mut world = empty_world();
        let edge = world.size() - RADIUS;
        let npc = world.spawn_npc(Vec2::new(edge - 0.001, 0.0), 0.0).unwrap();

        // When
        update(&mut world, npc, DT);

        // Then
        let velocity = npc.component::<Agent>(world.pool()).velocity;
        let position = npc.component::<Orientation>(world.pool()).position();
        assert!(velocity.x < 0.0);
        assert!(position.norm() <= edge + 1e-4);
    }
}
