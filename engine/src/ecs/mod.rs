//! Component storage: the type registry, the pool, entity handles and mask queries.
//!
//! A pool is parameterised once over a closed list of component types (declared with
//! [`register_components!`](crate::register_components)). Entity types (declared with
//! [`register_entities!`](crate::register_entities)) each pick a sub-list of those components
//! through a [`shape!`](crate::shape) declaration, and the pool hands out owning [`Entity`]
//! handles for them.
//!
//! ```rust,ignore
//! use forage_engine::{register_components, register_entities, shape};
//!
//! register_components!(pub Components { Label, CollisionBody, Orientation, Sprite });
//! register_entities!(pub Kinds { Npc, Food });
//! shape!(Npc in Components { Label, CollisionBody, Orientation, Sprite });
//!
//! let mut pool = Pool::<Components>::new();
//! let npc = pool.create_entity::<Npc>();
//! npc.component_mut::<Orientation>(&mut pool).translate(Vec2::new(1.0, 0.0));
//!
//! pool.run_system::<(&Sprite, &Orientation), _>(|slot, (sprite, orientation)| {
//!     // draw
//! });
//! ```

pub mod component;
pub mod entity;
mod error;
pub mod query;
pub mod storage;
pub(crate) mod util;

pub use component::{Component, Mask, Registered, Registry};
pub use entity::{
    Entity, EntityRef, EntityRegistry, EntityType, EntityTypeId, Has, Occupant, Shape,
};
pub use error::PoolError;
pub use query::{Query, QueryIter, ReadOnlyQuery};
pub use storage::{Generation, Pool, PoolId, Slot, View};
