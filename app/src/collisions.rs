//! The collision behaviours of the sample world.
//!
//! ```text
//!            Npc          Food
//!   Npc   [ npc_npc   ,  npc_food  ]
//!   Food  [           ,  food_food ]
//! ```

use forage_engine::{
    collision::{CollisionBody, CollisionHandler, DispatchError, DispatchTable},
    ecs::{EntityRef, Has, Pool, Shape},
    math::Vec2,
    orientation::Orientation,
};
use log::trace;

use crate::{
    components::{Agent, Components},
    entities::{Food, Kinds, Npc},
    food,
    world::World,
};

pub type Collisions = CollisionHandler<Components, Kinds, World>;

/// Extra separation so resolved bodies no longer touch.
const SEPARATION_SLACK: f32 = 0.001;

pub fn dispatch_table() -> Result<DispatchTable<Kinds, World>, DispatchError> {
    DispatchTable::<Kinds, World>::builder()
        .on::<Npc, Npc>(npc_npc)
        .on::<Npc, Food>(npc_food)
        .on::<Food, Food>(food_food)
        .build()
}

pub fn handler() -> Result<Collisions, DispatchError> {
    Ok(CollisionHandler::new(dispatch_table()?))
}

/// Unit vector from `b` towards `a` and how far they must move apart.
fn contact<A, B>(pool: &Pool<Components>, a: EntityRef<A>, b: EntityRef<B>) -> (Vec2, f32)
where
    A: Shape<Components = Components> + Has<CollisionBody> + Has<Orientation>,
    B: Shape<Components = Components> + Has<CollisionBody> + Has<Orientation>,
{
    let offset =
        a.component::<Orientation>(pool).position() - b.component::<Orientation>(pool).position();
    let distance = offset.norm();
    // Coincident centres have no line between them; push apart along x.
    let normal = if distance > 0.0 { offset / distance } else { Vec2::X };
    let reach = a.component::<CollisionBody>(pool).radius + b.component::<CollisionBody>(pool).radius;
    (normal, reach - distance + SEPARATION_SLACK)
}

/// Reflect `agent`'s velocity about `normal` if it is heading along it.
fn bounce(agent: &mut Agent, normal: Vec2) {
    if agent.velocity.dot(normal) > 0.0 {
        agent.velocity = agent.velocity.reflect(normal);
    }
}

/// Two NPCs push each other apart and bounce off.
pub fn npc_npc(world: &mut World, a: EntityRef<Npc>, b: EntityRef<Npc>) {
    let pool = world.pool_mut();
    let (normal, overlap) = contact(pool, a, b);
    for (npc, away) in [(a, normal), (b, -normal)] {
        let agent = npc.component_mut::<Agent>(pool);
        bounce(agent, -away);
        let heading = agent.velocity.angle();
        let orientation = npc.component_mut::<Orientation>(pool);
        orientation.translate(away * (overlap * 0.5));
        orientation.set_rotation(heading);
    }
    trace!("npc {} bounced off npc {}", a.slot(), b.slot());
}

/// An NPC is pushed clear of the food and picks up as much of it as it can carry.
///
/// Food that fits the inventory is taken whole and removed. Otherwise the NPC first eats from
/// its inventory to make room; if the food still does not fit, it takes a piece the size of the
/// remaining room and the food shrinks.
pub fn npc_food(world: &mut World, npc: EntityRef<Npc>, food: EntityRef<Food>) {
    let pool = world.pool_mut();
    let (normal, overlap) = contact(pool, npc, food);
    npc.component_mut::<Orientation>(pool).translate(normal * overlap);

    let nutrition = food::nutrition(pool, food);
    let agent = npc.component_mut::<Agent>(pool);
    let whole = if agent.inventory_space() > nutrition {
        true
    } else {
        agent.eat_from_inventory();
        agent.inventory_space() > nutrition
    };
    if whole {
        agent.food_in_inventory += nutrition;
        trace!("npc {} took food {} whole", npc.slot(), food.slot());
        world.remove_food(food);
        return;
    }

    let piece = agent.inventory_space().max(0.0);
    agent.food_in_inventory += piece;
    food::set_nutrition(pool, food, nutrition - piece);
    trace!("npc {} took {piece} of food {}", npc.slot(), food.slot());
}

/// Two food entities push each other apart.
pub fn food_food(world: &mut World, a: EntityRef<Food>, b: EntityRef<Food>) {
    let pool = world.pool_mut();
    let (normal, overlap) = contact(pool, a, b);
    a.component_mut::<Orientation>(pool).translate(normal * (overlap * 0.5));
    b.component_mut::<Orientation>(pool).translate(-normal * (overlap * 0.5));
}

#[cfg(test)]
mod tests {
    use forage_engine::{collision::CollisionContext, ecs::EntityType};

    use super::*;
    use crate::world::tests::empty_world;

    fn distance<A, B>(world: &World, a: EntityRef<A>, b: EntityRef<B>) -> f32
    where
        A: Shape<Components = Components> + Has<Orientation>,
        B: Shape<Components = Components> + Has<Orientation>,
    {
        (a.component::<Orientation>(world.pool()).position()
            - b.component::<Orientation>(world.pool()).position())
        .norm()
    }

    #[test]
    fn table_covers_every_pair() {
        let table = dispatch_table().unwrap();
        assert!(table.is_supported(Npc::ID, Npc::ID));
        assert!(table.is_supported(Food::ID, Npc::ID));
        assert!(table.is_supported(Food::ID, Food::ID));
    }

    #[test]
    fn npcs_separate_and_bounce() {
        // Given
        let mut world = empty_world();
        let a = world.spawn_npc(Vec2::new(0.0, 0.0), 0.0).unwrap();
        let b = world.spawn_npc(Vec2::new(0.6, 0.0), std::f32::consts::PI).unwrap();

        // When
        npc_npc(&mut world, a, b);

        // Then
        assert!((distance(&world, a, b) - 1.001).abs() < 1e-4);
        let pool = world.pool();
        let (va, vb) = (
            a.component::<Agent>(pool).velocity,
            b.component::<Agent>(pool).velocity,
        );
        assert!(va.x < 0.0, "a heads away from b: {va:?}");
        assert!(vb.x > 0.0, "b heads away from a: {vb:?}");
        let rotation = a.component::<Orientation>(pool).rotation();
        assert!((rotation - va.angle()).abs() < 1e-6);
    }

    #[test]
    fn separating_npcs_keep_their_velocity() {
        // Given
        let mut world = empty_world();
        let a = world.spawn_npc(Vec2::new(0.0, 0.0), std::f32::consts::PI).unwrap();
        let b = world.spawn_npc(Vec2::new(0.6, 0.0), 0.0).unwrap();
        let before = a.component::<Agent>(world.pool()).velocity;

        // When
        npc_npc(&mut world, a, b);

        // Then
        assert_eq!(a.component::<Agent>(world.pool()).velocity, before);
    }

    #[test]
    fn npc_takes_small_food_whole() {
        // Given
        let mut world = empty_world();
        let npc = world.spawn_npc(Vec2::ZERO, 0.0).unwrap();
        let food = world.spawn_food(Vec2::new(0.2, 0.0), 0.1).unwrap();

        // When
        npc_food(&mut world, npc, food);

        // Then
        let agent = npc.component::<Agent>(world.pool());
        assert!((agent.food_in_inventory - 0.1).abs() < 1e-6);
        assert!(world.is_retired(&food.occupant()));
        let reach = 0.5 + food::radius_for(0.1);
        assert!((distance(&world, npc, food) - (reach + 0.001)).abs() < 1e-4);
    }

    #[test]
    fn npc_eats_to_make_room() {
        // Given
        let mut world = empty_world();
        let npc = world.spawn_npc(Vec2::ZERO, 0.0).unwrap();
        let food = world.spawn_food(Vec2::new(0.2, 0.0), 0.3).unwrap();
        let agent = npc.component_mut::<Agent>(world.pool_mut());
        agent.food_in_inventory = 0.8;
        agent.energy = 50.0;

        // When
        npc_food(&mut world, npc, food);

        // Then
        let agent = npc.component::<Agent>(world.pool());
        assert!((agent.energy - 100.0).abs() < 1e-3);
        assert!((agent.food_in_inventory - 0.6).abs() < 1e-5);
        assert!(world.is_retired(&food.occupant()));
    }

    #[test]
    fn full_npc_takes_a_piece() {
        // Given
        let mut world = empty_world();
        let npc = world.spawn_npc(Vec2::ZERO, 0.0).unwrap();
        let food = world.spawn_food(Vec2::new(0.2, 0.0), 0.5).unwrap();
        let agent = npc.component_mut::<Agent>(world.pool_mut());
        agent.food_in_inventory = 0.8;
        agent.energy = 100.0;

        // When
        npc_food(&mut world, npc, food);

        // Then
        let agent = npc.component::<Agent>(world.pool());
        assert!((agent.food_in_inventory - 1.0).abs() < 1e-5);
        assert!(!world.is_retired(&food.occupant()));
        let left = food::nutrition(world.pool(), food);
        assert!((left - 0.3).abs() < 1e-5);
        let radius = food.component::<CollisionBody>(world.pool()).radius;
        assert!((radius - food::radius_for(0.3)).abs() < 1e-6);
    }

    #[test]
    fn food_separates_evenly() {
        // Given
        let mut world = empty_world();
        let a = world.spawn_food(Vec2::new(1.0, 1.0), 0.16).unwrap();
        let b = world.spawn_food(Vec2::new(1.0, 1.2), 0.16).unwrap();

        // When
        food_food(&mut world, a, b);

        // Then
        let pool = world.pool();
        let ya = a.component::<Orientation>(pool).position().y;
        let yb = b.component::<Orientation>(pool).position().y;
        assert!((ya - (1.0 - 0.1005)).abs() < 1e-4);
        assert!((yb - (1.2 + 0.1005)).abs() < 1e-4);
    }
}
