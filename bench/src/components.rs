//! Components and entity kinds used by the benchmarks.

use forage_engine::{
    collision::CollisionBody, math::Vec2, orientation::Orientation, register_components,
    register_entities, shape,
};
use forage_macros::Component;

#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct Velocity {
    pub value: Vec2,
}

/// Bumped every time a body is hit.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct Hits {
    pub count: u32,
}

/// Padding component that movers never carry, so queries have something to skip over.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct Tint {
    pub rgb: [f32; 3],
}

register_components!(pub Parts { CollisionBody, Orientation, Velocity, Hits, Tint });

/// A moving body.
pub struct Mover;

/// A static body.
pub struct Marker;

register_entities!(pub Kinds { Mover, Marker });

shape!(Mover in Parts { CollisionBody, Orientation, Velocity, Hits });
shape!(Marker in Parts { CollisionBody, Orientation, Hits, Tint });
