use std::time::{Duration, Instant};

/// Nanoseconds per frame at 60 frames per second.
pub const SIXTY_FPS: u64 = 16_666_666;

/// Nanoseconds per frame at one frame per second.
pub const ONE_FPS: u64 = 1_000_000_000;

/// Time elapsed within the simulation for a single frame.
///
/// Each frame captures the delta since the previous one, the total elapsed time, and a fixed-step
/// accumulator. New frames are derived from the previous frame with [`Time::next`] (wall clock)
/// or [`Time::advance`] (an explicit delta, for deterministic runs and tests).
#[derive(Debug, Copy, Clone)]
pub struct Time {
    instant: Instant,
    /// The length of a fixed step in nanoseconds.
    pub fixed_time_step: u64,
    /// The time delta since the last frame.
    pub delta: Duration,
    /// The total elapsed time since the first frame.
    pub time: Duration,
    /// The total time consumed by fixed steps.
    pub fixed_time: Duration,
    /// The number of fixed steps taken.
    pub fixed_frame: u64,
    accumulator: u64,
}

impl Time {
    /// Construct the first frame, with zero delta and time, for a fixed step in nanoseconds.
    pub fn new(fixed_time_step: u64) -> Self {
        Self {
            instant: Instant::now(),
            fixed_time_step,
            delta: Duration::ZERO,
            time: Duration::ZERO,
            fixed_time: Duration::ZERO,
            fixed_frame: 0,
            accumulator: 0,
        }
    }

    /// The next frame, measured against the wall clock.
    pub fn next(self) -> Self {
        let delta = self.instant.elapsed();
        let mut next = self.advance(delta);
        next.instant = Instant::now();
        next
    }

    /// The next frame after exactly `delta`.
    pub fn advance(self, delta: Duration) -> Self {
        Self {
            delta,
            time: self.time + delta,
            accumulator: self.accumulator + delta.as_nanos() as u64,
            ..self
        }
    }

    /// Determine whether enough time has accumulated for a fixed step.
    #[inline]
    pub fn has_fixed(&self) -> bool {
        self.accumulator >= self.fixed_time_step
    }

    /// Consume one fixed step from the accumulator.
    pub fn increment_fixed(&mut self) {
        self.fixed_time += Duration::from_nanos(self.fixed_time_step);
        self.fixed_frame += 1;
        self.accumulator -= self.fixed_time_step;
    }

    /// The fixed step as seconds.
    #[inline]
    pub fn fixed_delta_secs(&self) -> f32 {
        Duration::from_nanos(self.fixed_time_step).as_secs_f32()
    }

    /// Restart timing from now with an empty accumulator, e.g. after a pause.
    pub fn reset_now(&mut self) {
        self.instant = Instant::now();
        self.accumulator = 0;
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new(SIXTY_FPS)
    }
}
