mod collisions;
mod components;
mod config;
mod entities;
mod finder;
mod food;
mod npc;
mod render;
mod simulation;
mod world;

use std::{env, error::Error, time::Duration};

use crossbeam::channel::Receiver;
use forage_engine::core::{
    Logic, SimLoop, Time,
    log::{ChannelLogger, LogMessage},
};

use crate::{config::Config, simulation::Simulation};

/// Prints forwarded log lines after every frame.
struct Console {
    simulation: Simulation,
    logs: Receiver<LogMessage>,
}

impl Console {
    fn flush(&self) {
        for message in self.logs.try_iter() {
            println!("{message}");
        }
    }
}

impl Logic for Console {
    fn on_init(&mut self) {
        self.simulation.on_init();
        self.flush();
    }

    fn on_update(&mut self, time: &Time) {
        self.simulation.on_update(time);
        self.flush();
    }

    fn on_fixed_update(&mut self, time: &Time) {
        self.simulation.on_fixed_update(time);
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let config = Config::from_args(env::args().skip(1))?;
    let (logger, logs) = ChannelLogger::with_receiver(config.log_level);
    logger.install()?;

    let mut sim_loop = SimLoop::new(config.fixed_time_step);
    let simulation = Simulation::new(&config)?.with_stop_handle(sim_loop.stop_handle());
    let mut console = Console { simulation, logs };

    if config.realtime {
        sim_loop.run(&mut console);
    } else {
        let step = Duration::from_nanos(config.fixed_time_step);
        while !console.simulation.is_finished() {
            sim_loop.advance(&mut console, step);
        }
    }
    console.flush();
    Ok(())
}
