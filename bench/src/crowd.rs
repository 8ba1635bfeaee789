//! Seeded random crowds of colliding bodies.
//!
//! A crowd is a square of `2 * extent` per side filled with circles of random radius. Every
//! fourth body is a static [`Marker`]; the rest are [`Mover`]s drifting at random velocities and
//! wrapping around the edges. One update integrates the movers and runs a full collision pass.

use forage_engine::{
    collision::{CollisionBody, CollisionContext, CollisionHandler, DispatchError, DispatchTable},
    ecs::{Entity, EntityRef, Pool},
    math::Vec2,
    orientation::Orientation,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::components::{Hits, Kinds, Marker, Mover, Parts, Tint, Velocity};

/// Configuration for a crowd.
#[derive(Debug, Clone)]
pub struct CrowdConfig {
    /// Number of bodies.
    pub body_count: usize,
    /// Smallest body radius.
    pub min_radius: f32,
    /// Largest body radius.
    pub max_radius: f32,
    /// Half the side of the square the bodies live in.
    pub extent: f32,
    /// Fixed timestep for integration.
    pub delta_time: f32,
    /// Random seed for reproducibility.
    pub seed: u64,
}

impl Default for CrowdConfig {
    fn default() -> Self {
        Self {
            body_count: 1_000,
            min_radius: 0.25,
            max_radius: 1.0,
            extent: 100.0,
            delta_time: 1.0 / 60.0,
            seed: 99999,
        }
    }
}

pub type CrowdCollisions = CollisionHandler<Parts, Kinds, Crowd>;

/// A crowd of movers and markers in one pool.
pub struct Crowd {
    config: CrowdConfig,
    pool: Pool<Parts>,
    rng: ChaCha8Rng,
    movers: Vec<Entity<Mover>>,
    markers: Vec<Entity<Marker>>,
}

impl Crowd {
    pub fn new() -> Self {
        Self::with_config(CrowdConfig::default())
    }

    pub fn with_config(config: CrowdConfig) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            pool: Pool::with_capacity(config.body_count),
            movers: Vec::new(),
            markers: Vec::new(),
            config,
        }
    }

    /// Spawn every body.
    pub fn setup(&mut self) {
        for i in 0..self.config.body_count {
            if i % 4 == 3 {
                let marker = self.spawn_marker();
                self.markers.push(marker);
            } else {
                let mover = self.spawn_mover();
                self.movers.push(mover);
            }
        }
    }

    /// Integrate movers, then resolve every overlapping pair. Returns the pairs resolved.
    pub fn update(&mut self, collisions: &mut CrowdCollisions) -> usize {
        self.integrate();
        collisions.run(self)
    }

    /// Drop every body and free their slots.
    pub fn teardown(&mut self) {
        self.movers.clear();
        self.markers.clear();
        self.pool.maintain();
    }

    /// Current body count.
    pub fn body_count(&self) -> usize {
        self.movers.len() + self.markers.len()
    }

    #[inline]
    pub fn pool(&self) -> &Pool<Parts> {
        &self.pool
    }

    #[inline]
    pub fn pool_mut(&mut self) -> &mut Pool<Parts> {
        &mut self.pool
    }

    /// Every hit recorded so far.
    pub fn total_hits(&mut self) -> u64 {
        let mut total = 0;
        self.pool.run_system::<&Hits, _>(|_, hits| total += u64::from(hits.count));
        total
    }

    pub fn integrate(&mut self) {
        let dt = self.config.delta_time;
        let extent = self.config.extent;
        self.pool
            .run_system::<(&Velocity, &mut Orientation), _>(|_, (velocity, orientation)| {
                let mut next = orientation.position() + velocity.value * dt;
                if next.x.abs() > extent {
                    next.x -= 2.0 * extent * next.x.signum();
                }
                if next.y.abs() > extent {
                    next.y -= 2.0 * extent * next.y.signum();
                }
                orientation.set_position(next);
            });
    }

    /// A random radius and placement.
    fn random_body(&mut self) -> (f32, Orientation) {
        let extent = self.config.extent;
        let radius = self
            .rng
            .gen_range(self.config.min_radius..=self.config.max_radius);
        let position = Vec2::new(
            self.rng.gen_range(-extent..extent),
            self.rng.gen_range(-extent..extent),
        );
        let rotation = self.rng.gen_range(0.0..std::f32::consts::TAU);
        (radius, Orientation::new(position, rotation, 1.0))
    }

    fn spawn_mover(&mut self) -> Entity<Mover> {
        let (radius, orientation) = self.random_body();
        let velocity = Vec2::new(self.rng.gen_range(-5.0..5.0), self.rng.gen_range(-5.0..5.0));
        let pool = &mut self.pool;
        let mover = pool.create_entity::<Mover>();
        *mover.component_mut::<CollisionBody>(pool) = CollisionBody::of::<Mover>(radius);
        *mover.component_mut::<Orientation>(pool) = orientation;
        mover.component_mut::<Velocity>(pool).value = velocity;
        mover
    }

    fn spawn_marker(&mut self) -> Entity<Marker> {
        let (radius, orientation) = self.random_body();
        let pool = &mut self.pool;
        let marker = pool.create_entity::<Marker>();
        *marker.component_mut::<CollisionBody>(pool) = CollisionBody::of::<Marker>(radius);
        *marker.component_mut::<Orientation>(pool) = orientation;
        marker.component_mut::<Tint>(pool).rgb = [1.0, 0.0, 0.0];
        marker
    }
}

impl Default for Crowd {
    fn default() -> Self {
        Self::new()
    }
}

impl CollisionContext<Parts> for Crowd {
    fn pool(&self) -> &Pool<Parts> {
        &self.pool
    }

    fn pool_mut(&mut self) -> &mut Pool<Parts> {
        &mut self.pool
    }
}

/// The dispatch table for crowds.
pub fn dispatch_table() -> Result<DispatchTable<Kinds, Crowd>, DispatchError> {
    DispatchTable::<Kinds, Crowd>::builder()
        .on::<Mover, Mover>(mover_mover)
        .on::<Mover, Marker>(mover_marker)
        .on::<Marker, Marker>(marker_marker)
        .build()
}

pub fn collisions() -> Result<CrowdCollisions, DispatchError> {
    Ok(CollisionHandler::new(dispatch_table()?))
}

/// Movers trade velocities.
fn mover_mover(crowd: &mut Crowd, a: EntityRef<Mover>, b: EntityRef<Mover>) {
    let pool = crowd.pool_mut();
    if let Some((va, vb)) = pool.pair_mut::<Velocity>(a.slot(), b.slot()) {
        std::mem::swap(va, vb);
    }
    if let Some((ha, hb)) = pool.pair_mut::<Hits>(a.slot(), b.slot()) {
        ha.count += 1;
        hb.count += 1;
    }
}

/// Movers bounce off markers.
fn mover_marker(crowd: &mut Crowd, mover: EntityRef<Mover>, marker: EntityRef<Marker>) {
    let pool = crowd.pool_mut();
    let normal = (mover.component::<Orientation>(pool).position()
        - marker.component::<Orientation>(pool).position())
    .normalized();
    let velocity = mover.component_mut::<Velocity>(pool);
    if velocity.value.dot(normal) < 0.0 {
        velocity.value = velocity.value.reflect(normal);
    }
    mover.component_mut::<Hits>(pool).count += 1;
    marker.component_mut::<Hits>(pool).count += 1;
}

fn marker_marker(crowd: &mut Crowd, a: EntityRef<Marker>, b: EntityRef<Marker>) {
    let pool = crowd.pool_mut();
    a.component_mut::<Hits>(pool).count += 1;
    b.component_mut::<Hits>(pool).count += 1;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crowd_setup() {
        let mut crowd = Crowd::with_config(CrowdConfig {
            body_count: 100,
            ..Default::default()
        });

        crowd.setup();
        assert_eq!(crowd.body_count(), 100);
        assert_eq!(crowd.pool().len(), 100);

        crowd.teardown();
        assert_eq!(crowd.body_count(), 0);
        assert!(crowd.pool().is_empty());
    }

    #[test]
    fn crowd_update_counts_hits() {
        // Dense enough that bodies overlap from the start.
        let mut crowd = Crowd::with_config(CrowdConfig {
            body_count: 200,
            extent: 5.0,
            ..Default::default()
        });
        let mut collisions = collisions().unwrap();
        crowd.setup();

        let resolved = crowd.update(&mut collisions);

        assert!(resolved > 0);
        assert_eq!(crowd.total_hits(), 2 * resolved as u64);
    }
}
