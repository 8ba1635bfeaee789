use crate::core::time::Time;

/// Simulation logic driven by a [`SimLoop`](super::SimLoop).
///
/// `on_fixed_update` is called on a fixed interval for time sensitive work such as movement and
/// collisions. `on_update` is called once per loop iteration. Depending on the work performed
/// there may be several fixed updates per update or none at all.
pub trait Logic {
    /// Called once before the first update.
    fn on_init(&mut self) {}

    /// Called on every iteration of the loop.
    fn on_update(&mut self, time: &Time);

    /// Called for every fixed step that has accumulated.
    fn on_fixed_update(&mut self, time: &Time);
}
