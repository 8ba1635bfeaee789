use std::num::ParseIntError;

use forage_engine::core::SIXTY_FPS;
use log::Level;
use thiserror::Error;

/// Configuration for a simulation run.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Random seed for reproducibility.
    pub seed: u64,
    /// Radius of the circular world around the origin.
    pub world_size: f32,
    /// Number of NPCs spawned at start.
    pub npc_count: usize,
    /// Number of food entities spawned at start.
    pub initial_food: usize,
    /// Food stops spawning at this population.
    pub max_food: usize,
    /// Chance per step that a new food entity spawns.
    pub food_spawn_chance: f64,
    /// Fixed step in nanoseconds.
    pub fixed_time_step: u64,
    /// Number of fixed steps to run before exiting.
    pub steps: u64,
    /// Run against the wall clock instead of as fast as possible.
    pub realtime: bool,
    /// Log population stats every this many steps.
    pub stats_interval: u64,
    /// The most verbose level printed.
    pub log_level: Level,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            seed: 20240611,
            world_size: 20.0,
            npc_count: 12,
            initial_food: 40,
            max_food: 120,
            food_spawn_chance: 0.2,
            fixed_time_step: SIXTY_FPS,
            steps: 600,
            realtime: false,
            stats_interval: 60,
            log_level: Level::Info,
        }
    }
}

/// Invalid command line input.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid step count {value:?}: {source}")]
    InvalidSteps {
        value: String,
        #[source]
        source: ParseIntError,
    },

    #[error("unknown option {0:?}")]
    UnknownOption(String),
}

impl Config {
    /// Apply command line arguments (without the program name) to the defaults.
    ///
    /// The first positional argument is the step count. `--realtime` runs against the wall clock
    /// and `--verbose` prints debug output.
    pub fn from_args<I>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut config = Self::default();
        let mut positional = 0;
        for arg in args {
            match arg.as_str() {
                "--realtime" => config.realtime = true,
                "--verbose" => config.log_level = Level::Debug,
                flag if flag.starts_with("--") => return Err(ConfigError::UnknownOption(arg)),
                _ if positional == 0 => {
                    config.steps = arg
                        .parse()
                        .map_err(|source| ConfigError::InvalidSteps {
                            value: arg.clone(),
                            source,
                        })?;
                    positional += 1;
                }
                _ => return Err(ConfigError::UnknownOption(arg)),
            }
        }
        Ok(config)
    }
}
