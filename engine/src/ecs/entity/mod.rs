//! Entity types, entity shapes and owning entity handles.
//!
//! # Entity types
//!
//! Every kind of entity the application spawns (e.g. `Npc`, `Food`) is a marker type listed once
//! in a closed, ordered entity registry declared with [`register_entities!`]. The declaration
//! position becomes the type's dense [`EntityTypeId`], used to index collision dispatch tables.
//!
//! # Shapes
//!
//! A shape is the sub-list of registered components an entity type carries, declared with
//! [`shape!`]. The pool is built once over the full component registry and serves every shape;
//! it only needs the shape's component index list to initialise, copy and tag a slot.
//!
//! # Handles
//!
//! [`Entity`] is the owning handle returned by [`Pool::create_entity`]. It never caches component
//! addresses: every access is recomputed from `(pool, slot)` and validated against the slot's
//! generation, so storage growth can relocate component data freely.
//!
//! - **Move** is a Rust move. The moved-from binding cannot be used or dropped again.
//! - **Copy** is explicit through [`Entity::duplicate`] (or [`Pool::copy_entity`]), which
//!   allocates a new slot with cloned component values.
//! - **Drop** queues the slot for release; the pool frees it the next time it is maintained.
//!   Empty handles (from [`Default`] or [`std::mem::take`]) drop as a no-op.
//!
//! ```rust,ignore
//! register_entities!(pub Kinds { Npc, Food });
//! shape!(Npc in Components { Label, CollisionBody, Orientation });
//!
//! let npc = pool.create_entity::<Npc>();
//! let twin = npc.duplicate(&mut pool)?;
//! twin.component_mut::<Orientation>(&mut pool).translate(Vec2::new(1.0, 0.0));
//! drop(npc); // slot released on the next pool operation
//! ```

mod reference;

use std::fmt;

use crossbeam::channel::Sender;
pub use reference::{EntityRef, Occupant};

use crate::ecs::{
    component::{Component, Registered, Registry},
    error::PoolError,
    storage::{Pool, Release, Slot},
};

/// The dense identifier of a registered entity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityTypeId(u32);

impl EntityTypeId {
    /// Construct an entity type id from its registration position.
    #[inline]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the index of this entity type, e.g. for table lookups.
    #[inline]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for EntityTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A closed, ordered list of entity types. Implemented by [`register_entities!`].
pub trait EntityRegistry: 'static {
    /// The number of registered entity types.
    const LEN: usize;

    /// The entity type names in registration order.
    fn names() -> &'static [&'static str];

    /// The name of a registered entity type.
    #[inline]
    fn name(id: EntityTypeId) -> &'static str {
        Self::names().get(id.index()).copied().unwrap_or("<unregistered>")
    }
}

/// An entity type registered in an [`EntityRegistry`].
pub trait EntityType: 'static {
    /// The registry this type belongs to.
    type Registry: EntityRegistry;

    /// The registration position of this type.
    const ID: EntityTypeId;

    /// The declared name of this type.
    const NAME: &'static str;
}

/// The components an entity type carries, as a sub-list of a component registry.
pub trait Shape: EntityType {
    /// The component registry the shape draws from.
    type Components: Registry;

    /// Registry indices of the shape's components.
    const COMPONENTS: &'static [usize];
}

/// Marks that a shape declares component `T`. Only entities with `Has<T>` can be asked for `T`.
pub trait Has<T: Component>: Shape {}

/// Declare a closed, ordered entity type registry.
///
/// The listed types must already exist (typically unit structs). Each gets an
/// [`EntityType`] implementation with its declaration position as id.
///
/// ```rust,ignore
/// pub struct Npc;
/// pub struct Food;
///
/// register_entities!(pub Kinds { Npc, Food });
///
/// assert_eq!(Npc::ID.index(), 0);
/// assert_eq!(Kinds::LEN, 2);
/// ```
#[macro_export]
macro_rules! register_entities {
    (@id $registry:ident; $id:expr; $head:ty $(, $tail:ty)*) => {
        impl $crate::ecs::entity::EntityType for $head {
            type Registry = $registry;
            const ID: $crate::ecs::entity::EntityTypeId = $crate::ecs::entity::EntityTypeId::new($id);
            const NAME: &'static str = stringify!($head);
        }
        $crate::register_entities!(@id $registry; $id + 1u32; $($tail),*);
    };
    (@id $registry:ident; $id:expr;) => {};
    ($vis:vis $registry:ident { $($entity:ty),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis struct $registry;

        impl $crate::ecs::entity::EntityRegistry for $registry {
            const LEN: usize = $crate::count!($($entity),+);

            fn names() -> &'static [&'static str] {
                &[$(stringify!($entity)),+]
            }
        }

        $crate::register_entities!(@id $registry; 0u32; $($entity),+);
    };
}

/// Declare the components an entity type carries.
///
/// Every listed component must be registered in the named component registry, and each may be
/// listed once; anything else fails to compile.
///
/// ```rust,ignore
/// shape!(Food in Components { Label, CollisionBody, Orientation, Sprite, Nutrition });
/// ```
#[macro_export]
macro_rules! shape {
    ($entity:ident in $registry:ty { $($component:ty),+ $(,)? }) => {
        impl $crate::ecs::entity::Shape for $entity {
            type Components = $registry;
            const COMPONENTS: &'static [usize] = &[
                $(<$component as $crate::ecs::component::Registered<$registry>>::INDEX),+
            ];
        }

        $(impl $crate::ecs::entity::Has<$component> for $entity {})+
    };
}

/// An owning handle to one entity in a [`Pool`].
///
/// Dropping the handle releases the entity's slot. See the [module docs](self) for the
/// move/copy/drop rules.
pub struct Entity<S: Shape> {
    reference: Option<EntityRef<S>>,
    release: Option<Sender<Release>>,
}

impl<S: Shape> Entity<S> {
    #[inline]
    pub(crate) fn new(reference: EntityRef<S>, release: Sender<Release>) -> Self {
        Self {
            reference: Some(reference),
            release: Some(release),
        }
    }

    /// Determine whether this handle owns no slot.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.reference.is_none()
    }

    /// A non-owning reference to this entity, or `None` for an empty handle.
    #[inline]
    pub fn reference(&self) -> Option<EntityRef<S>> {
        self.reference
    }

    /// The occupant record of this entity, or `None` for an empty handle.
    #[inline]
    pub fn occupant(&self) -> Option<Occupant> {
        self.reference.map(|r| r.occupant())
    }

    /// The slot this entity occupies, or `None` for an empty handle.
    #[inline]
    pub fn slot(&self) -> Option<Slot> {
        self.reference.map(|r| r.slot())
    }

    /// Copy this entity into a new slot of `pool`. The copy owns independent component values.
    #[inline]
    pub fn duplicate(&self, pool: &mut Pool<S::Components>) -> Result<Self, PoolError> {
        pool.copy_entity(self)
    }

    /// Borrow component `T` of this entity.
    pub fn try_component<'p, T>(&self, pool: &'p Pool<S::Components>) -> Result<&'p T, PoolError>
    where
        S: Has<T>,
        T: Registered<S::Components>,
    {
        self.reference
            .ok_or(PoolError::EmptyHandle)?
            .try_component::<T>(pool)
    }

    /// Mutably borrow component `T` of this entity.
    pub fn try_component_mut<'p, T>(
        &self,
        pool: &'p mut Pool<S::Components>,
    ) -> Result<&'p mut T, PoolError>
    where
        S: Has<T>,
        T: Registered<S::Components>,
    {
        self.reference
            .ok_or(PoolError::EmptyHandle)?
            .try_component_mut::<T>(pool)
    }

    /// Borrow component `T` of this entity.
    ///
    /// # Panics
    ///
    /// Panics if the handle is empty or was issued by another pool.
    #[track_caller]
    pub fn component<'p, T>(&self, pool: &'p Pool<S::Components>) -> &'p T
    where
        S: Has<T>,
        T: Registered<S::Components>,
    {
        match self.try_component::<T>(pool) {
            Ok(component) => component,
            Err(err) => panic!("{}: {err}", S::NAME),
        }
    }

    /// Mutably borrow component `T` of this entity.
    ///
    /// # Panics
    ///
    /// Panics if the handle is empty or was issued by another pool.
    #[track_caller]
    pub fn component_mut<'p, T>(&self, pool: &'p mut Pool<S::Components>) -> &'p mut T
    where
        S: Has<T>,
        T: Registered<S::Components>,
    {
        match self.try_component_mut::<T>(pool) {
            Ok(component) => component,
            Err(err) => panic!("{}: {err}", S::NAME),
        }
    }
}

impl<S: Shape> Default for Entity<S> {
    /// An empty handle that owns no slot.
    fn default() -> Self {
        Self {
            reference: None,
            release: None,
        }
    }
}

impl<S: Shape> Drop for Entity<S> {
    fn drop(&mut self) {
        if let (Some(reference), Some(release)) = (self.reference.take(), self.release.take()) {
            // A closed channel means the pool is gone along with the slot.
            let _ = release.send(Release::new(reference.slot(), reference.generation()));
        }
    }
}

impl<S: Shape> fmt::Debug for Entity<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reference {
            Some(reference) => f
                .debug_tuple("Entity")
                .field(&S::NAME)
                .field(&reference.slot())
                .finish(),
            None => f.debug_tuple("Entity").field(&S::NAME).field(&"empty").finish(),
        }
    }
}
