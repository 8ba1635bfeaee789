use std::{collections::HashSet, f32::consts::TAU};

use forage_engine::{
    collision::CollisionContext,
    ecs::{Entity, EntityRef, EntityTypeId, Occupant, Pool, Slot},
    math::Vec2,
};
use log::{debug, info, trace};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::{
    collisions::Collisions,
    components::{Agent, Components},
    config::Config,
    entities::{Food, Npc},
    finder::EntityFinder,
    food, npc,
    render::Renderer,
};

/// What happened during one [`World::update`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepReport {
    /// Collision pairs resolved.
    pub collisions: usize,
    /// Entities removed at the end of the step.
    pub removed: usize,
    /// Food entities spawned.
    pub spawned: usize,
}

/// A circular world of NPCs and food around the origin.
///
/// The world owns every entity handle. Removals requested during a step (starvation, food eaten
/// whole) are only recorded; the handles are dropped and the pool maintained once the step,
/// including its collision pass, has finished.
pub struct World {
    size: f32,
    pool: Pool<Components>,
    npcs: Vec<Entity<Npc>>,
    food: Vec<Entity<Food>>,
    rng: ChaCha8Rng,
    removals: HashSet<Occupant>,
    max_food: usize,
    food_spawn_chance: f64,
    step: u64,
}

impl World {
    /// Build a world and spawn its initial population.
    pub fn new(config: &Config) -> Self {
        let mut world = Self {
            size: config.world_size,
            pool: Pool::with_capacity(config.npc_count + config.max_food),
            npcs: Vec::with_capacity(config.npc_count),
            food: Vec::with_capacity(config.max_food),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            removals: HashSet::new(),
            max_food: config.max_food,
            food_spawn_chance: config.food_spawn_chance,
            step: 0,
        };
        for _ in 0..config.npc_count {
            let position = world.random_point();
            let heading = world.rng.gen_range(0.0..TAU);
            world.spawn_npc(position, heading);
        }
        for _ in 0..config.initial_food {
            world.spawn_random_food();
        }
        info!(
            "spawned {} npcs and {} food in a world of radius {}",
            world.npcs.len(),
            world.food.len(),
            world.size
        );
        world
    }

    /// Radius of the world.
    #[inline]
    pub fn size(&self) -> f32 {
        self.size
    }

    /// Number of completed steps.
    #[inline]
    pub fn step(&self) -> u64 {
        self.step
    }

    #[inline]
    pub fn pool(&self) -> &Pool<Components> {
        &self.pool
    }

    #[inline]
    pub fn pool_mut(&mut self) -> &mut Pool<Components> {
        &mut self.pool
    }

    #[inline]
    pub fn rng_mut(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng
    }

    pub fn npc_count(&self) -> usize {
        self.npcs.len()
    }

    pub fn food_count(&self) -> usize {
        self.food.len()
    }

    /// References to every live NPC, in spawn order.
    pub fn npcs(&self) -> impl Iterator<Item = EntityRef<Npc>> + '_ {
        self.npcs.iter().filter_map(Entity::reference)
    }

    /// References to every food entity, in spawn order.
    pub fn food(&self) -> impl Iterator<Item = EntityRef<Food>> + '_ {
        self.food.iter().filter_map(Entity::reference)
    }

    /// Food carried by NPCs plus food lying in the world.
    pub fn total_food(&self) -> f32 {
        let mut total = 0.0;
        for npc in self.npcs() {
            let agent = npc.component::<Agent>(&self.pool);
            total += agent.food_in_inventory;
        }
        for food in self.food() {
            total += food::nutrition(&self.pool, food);
        }
        total
    }

    /// Spawn an NPC at `position` heading along `heading` radians.
    pub fn spawn_npc(&mut self, position: Vec2, heading: f32) -> Option<EntityRef<Npc>> {
        let npc = npc::spawn(&mut self.pool, position, heading);
        let reference = npc.reference();
        trace!("spawned npc at {:?}", position);
        self.npcs.push(npc);
        reference
    }

    /// Spawn a food entity holding `nutrition` at `position`.
    pub fn spawn_food(&mut self, position: Vec2, nutrition: f32) -> Option<EntityRef<Food>> {
        let food = food::spawn(&mut self.pool, position, nutrition);
        let reference = food.reference();
        self.food.push(food);
        reference
    }

    /// Schedule an NPC for removal at the end of the step.
    pub fn remove_npc(&mut self, npc: EntityRef<Npc>) {
        self.removals.insert(npc.occupant());
    }

    /// Schedule a food entity for removal at the end of the step.
    pub fn remove_food(&mut self, food: EntityRef<Food>) {
        self.removals.insert(food.occupant());
    }

    /// Entities with a label whose position lies within `radius` of `point`.
    pub fn entities_within(&mut self, point: Vec2, radius: f32) -> Vec<(Slot, EntityTypeId)> {
        EntityFinder::new(point, radius).find(self.pool.view())
    }

    /// Advance the world by one fixed step of `dt` seconds.
    pub fn update(&mut self, collisions: &mut Collisions, dt: f32) -> StepReport {
        self.update_npcs(dt);
        food::grow(&mut self.pool, &mut self.rng);
        let spawned = self.spawn_food_by_chance();
        let resolved = collisions.run(self);
        let removed = self.apply_removals();
        self.step += 1;
        StepReport {
            collisions: resolved,
            removed,
            spawned,
        }
    }

    /// Queue one draw command per visible entity.
    pub fn render(&mut self, renderer: &mut Renderer) {
        renderer.draw(&mut self.pool);
    }

    fn update_npcs(&mut self, dt: f32) {
        let npcs: Vec<EntityRef<Npc>> = self.npcs().collect();
        for npc in npcs {
            npc::update(self, npc, dt);
        }
    }

    fn spawn_food_by_chance(&mut self) -> usize {
        if self.food.len() >= self.max_food || !self.rng.gen_bool(self.food_spawn_chance) {
            return 0;
        }
        self.spawn_random_food();
        1
    }

    fn spawn_random_food(&mut self) {
        let position = self.random_point();
        let nutrition = food::initial_nutrition(&mut self.rng);
        self.spawn_food(position, nutrition);
    }

    /// A uniformly distributed point inside the world.
    fn random_point(&mut self) -> Vec2 {
        let distance = self.size * self.rng.r#gen::<f32>().sqrt();
        Vec2::from_angle(self.rng.gen_range(0.0..TAU)) * distance
    }

    /// Drop the handles of every removed entity and free their slots.
    fn apply_removals(&mut self) -> usize {
        if self.removals.is_empty() {
            return 0;
        }
        let removals = std::mem::take(&mut self.removals);
        let removed = |occupant: Option<Occupant>| occupant.is_some_and(|o| removals.contains(&o));
        self.npcs.retain(|npc| !removed(npc.occupant()));
        self.food.retain(|food| !removed(food.occupant()));
        let freed = self.pool.maintain();
        debug!("step {}: removed {freed} entities", self.step);
        freed
    }
}

impl CollisionContext<Components> for World {
    fn pool(&self) -> &Pool<Components> {
        &self.pool
    }

    fn pool_mut(&mut self) -> &mut Pool<Components> {
        &mut self.pool
    }

    fn is_retired(&self, occupant: &Occupant) -> bool {
        self.removals.contains(occupant)
    }
}
