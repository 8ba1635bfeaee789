//! The single-threaded simulation loop and its ambient services.

pub mod log;
mod logic;
mod sim_loop;
mod time;

pub use logic::Logic;
pub use sim_loop::SimLoop;
pub use time::{ONE_FPS, SIXTY_FPS, Time};
