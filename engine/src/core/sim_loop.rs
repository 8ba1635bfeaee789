use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
    time::Duration,
};

use log::info;

use crate::core::{logic::Logic, time::Time};

/// The single-threaded simulation loop.
///
/// Each iteration first runs every fixed step that has accumulated, each to completion, then one
/// open update. Nothing runs concurrently with the logic.
#[derive(Debug)]
pub struct SimLoop {
    time: Time,
    stop: Arc<AtomicBool>,
    initialized: bool,
}

impl SimLoop {
    /// Construct a loop with a fixed step in nanoseconds.
    pub fn new(fixed_time_step: u64) -> Self {
        Self {
            time: Time::new(fixed_time_step),
            stop: Arc::new(AtomicBool::new(false)),
            initialized: false,
        }
    }

    /// A handle that stops [`SimLoop::run`] when set.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        self.stop.clone()
    }

    /// The current frame time.
    #[inline]
    pub fn time(&self) -> &Time {
        &self.time
    }

    /// Run in real time until the stop handle is set, sleeping 1ms per iteration.
    pub fn run<L: Logic>(&mut self, logic: &mut L) {
        self.init(logic);
        self.time.reset_now();
        info!("simulation loop started");
        while !self.stop.load(Ordering::Relaxed) {
            let next = self.time.next();
            self.tick(logic, next);
            thread::sleep(Duration::from_millis(1));
        }
        info!("ending simulation due to stop handle");
    }

    /// Run one iteration as if exactly `delta` had elapsed. Returns the number of fixed steps run.
    pub fn advance<L: Logic>(&mut self, logic: &mut L, delta: Duration) -> u64 {
        self.init(logic);
        let next = self.time.advance(delta);
        self.tick(logic, next)
    }

    fn init<L: Logic>(&mut self, logic: &mut L) {
        if !self.initialized {
            logic.on_init();
            self.initialized = true;
        }
    }

    fn tick<L: Logic>(&mut self, logic: &mut L, next: Time) -> u64 {
        self.time = next;
        let mut steps = 0;
        while self.time.has_fixed() {
            self.time.increment_fixed();
            logic.on_fixed_update(&self.time);
            steps += 1;
        }
        logic.on_update(&self.time);
        steps
    }
}
