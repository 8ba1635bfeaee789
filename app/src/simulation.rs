use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use forage_engine::{
    collision::DispatchError,
    core::{Logic, Time},
};
use log::{debug, info, trace};

use crate::{
    collisions::{self, Collisions},
    config::Config,
    render::Renderer,
    world::World,
};

/// The sample simulation driven by the engine's loop.
pub struct Simulation {
    world: World,
    collisions: Collisions,
    renderer: Renderer,
    steps: u64,
    stats_interval: u64,
    stop: Option<Arc<AtomicBool>>,
}

impl Simulation {
    pub fn new(config: &Config) -> Result<Self, DispatchError> {
        Ok(Self {
            world: World::new(config),
            collisions: collisions::handler()?,
            renderer: Renderer::new(),
            steps: config.steps,
            stats_interval: config.stats_interval.max(1),
            stop: None,
        })
    }

    /// Set `stop` once the configured number of steps has run.
    pub fn with_stop_handle(mut self, stop: Arc<AtomicBool>) -> Self {
        self.stop = Some(stop);
        self
    }

    #[inline]
    pub fn world(&self) -> &World {
        &self.world
    }

    #[inline]
    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn is_finished(&self) -> bool {
        self.world.step() >= self.steps
    }

    fn stop(&self) {
        if let Some(stop) = &self.stop {
            stop.store(true, Ordering::Relaxed);
        }
    }

    fn log_stats(&self) {
        info!(
            "step {}: {} npcs, {} food, {:.2} food in play",
            self.world.step(),
            self.world.npc_count(),
            self.world.food_count(),
            self.world.total_food()
        );
    }
}

impl Logic for Simulation {
    fn on_init(&mut self) {
        info!(
            "simulating {} steps with {} npcs and {} food",
            self.steps,
            self.world.npc_count(),
            self.world.food_count()
        );
    }

    fn on_update(&mut self, _time: &Time) {
        self.renderer.begin_frame();
        self.world.render(&mut self.renderer);
        trace!(
            "frame {}: {} sprites",
            self.renderer.frames(),
            self.renderer.commands().len()
        );
    }

    fn on_fixed_update(&mut self, time: &Time) {
        if self.is_finished() {
            self.stop();
            return;
        }
        let report = self.world.update(&mut self.collisions, time.fixed_delta_secs());
        if report.removed > 0 || report.spawned > 0 {
            debug!(
                "step {}: {} collisions, {} removed, {} spawned",
                self.world.step(),
                report.collisions,
                report.removed,
                report.spawned
            );
        }
        if self.world.step() % self.stats_interval == 0 {
            self.log_stats();
        }
        if self.is_finished() {
            info!("finished after {} steps", self.world.step());
            self.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use forage_engine::core::SimLoop;

    use super::*;

    #[test]
    fn stops_after_configured_steps() {
        // Given
        let config = Config {
            steps: 5,
            ..Config::default()
        };
        let mut sim_loop = SimLoop::new(config.fixed_time_step);
        let stop = sim_loop.stop_handle();
        let mut simulation = Simulation::new(&config).unwrap().with_stop_handle(stop.clone());

        // When
        let steps = sim_loop.advance(&mut simulation, Duration::from_nanos(config.fixed_time_step * 8));

        // Then
        assert_eq!(steps, 8);
        assert_eq!(simulation.world().step(), 5);
        assert!(simulation.is_finished());
        assert!(stop.load(Ordering::Relaxed));
        assert_eq!(simulation.renderer().frames(), 1);
        assert_eq!(
            simulation.renderer().commands().len(),
            simulation.world().npc_count() + simulation.world().food_count()
        );
    }

    #[test]
    fn food_only_grows_without_npcs() {
        // Given
        let config = Config {
            npc_count: 0,
            food_spawn_chance: 0.0,
            ..Config::default()
        };
        let mut simulation = Simulation::new(&config).unwrap();
        let before = simulation.world().total_food();
        let mut sim_loop = SimLoop::new(config.fixed_time_step);

        // When
        sim_loop.advance(&mut simulation, Duration::from_nanos(config.fixed_time_step));

        // Then
        let after = simulation.world().total_food();
        let food = simulation.world().food_count() as f32;
        assert!(after >= before && after < before + food * 0.001);
    }
}
