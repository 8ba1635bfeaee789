use crate::{
    Component,
    ecs::{EntityType, EntityTypeId},
};

/// The circular extent of an entity, tagged with the entity type it was built for.
///
/// Dispatch reads the type from the slot's occupant, so a default body is still resolved as the
/// entity that owns it.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct CollisionBody {
    pub radius: f32,
    pub entity_type: EntityTypeId,
}

impl CollisionBody {
    pub const fn new(radius: f32, entity_type: EntityTypeId) -> Self {
        Self {
            radius,
            entity_type,
        }
    }

    /// A body tagged with entity type `E`.
    pub const fn of<E: EntityType>(radius: f32) -> Self {
        Self::new(radius, E::ID)
    }
}

impl Default for CollisionBody {
    fn default() -> Self {
        Self::new(0.0, EntityTypeId::new(0))
    }
}
