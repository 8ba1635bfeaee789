use forage_engine::{
    ecs::{EntityTypeId, Slot, View},
    math::Vec2,
    orientation::Orientation,
};

use crate::components::{Components, Label};

/// Finds labelled entities within a circle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntityFinder {
    center: Vec2,
    radius: f32,
}

impl EntityFinder {
    pub fn new(center: Vec2, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Whether `point` lies inside the circle, boundary included.
    #[inline]
    pub fn contains(&self, point: Vec2) -> bool {
        (point - self.center).squared_norm() <= self.radius * self.radius
    }

    /// Slot and entity type of every labelled entity inside the circle, in slot order. The type is
    /// the slot occupant's, whatever its label says.
    pub fn find(&self, view: View<'_, Components>) -> Vec<(Slot, EntityTypeId)> {
        let mut found = Vec::new();
        view.run_system::<(&Label, &Orientation), _>(|slot, (_, orientation)| {
            if !self.contains(orientation.position()) {
                return;
            }
            if let Some(occupant) = view.entity_handle(slot) {
                found.push((slot, occupant.entity_type()));
            }
        });
        found
    }
}
