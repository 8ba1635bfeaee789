use std::{fmt, marker::PhantomData};

use crate::ecs::{
    component::Registered,
    entity::{EntityType, EntityTypeId, Has, Shape},
    error::PoolError,
    storage::{Generation, Pool, PoolId, Slot},
};

/// The untyped record of whatever entity currently occupies a slot.
///
/// The pool keeps one occupant per occupied slot and hands it out through
/// [`Pool::entity_handle`]. It carries enough information to validate that the entity is still
/// alive and to recover a typed [`EntityRef`] through [`Occupant::downcast`], which is how
/// out-of-band dispatch (e.g. collision resolution) gets back to concrete entity shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Occupant {
    pool: PoolId,
    slot: Slot,
    generation: Generation,
    entity_type: EntityTypeId,
}

impl Occupant {
    #[inline]
    pub(crate) const fn new(
        pool: PoolId,
        slot: Slot,
        generation: Generation,
        entity_type: EntityTypeId,
    ) -> Self {
        Self {
            pool,
            slot,
            generation,
            entity_type,
        }
    }

    /// The pool that owns the slot.
    #[inline]
    pub fn pool(&self) -> PoolId {
        self.pool
    }

    /// The occupied slot.
    #[inline]
    pub fn slot(&self) -> Slot {
        self.slot
    }

    /// The generation of the slot when this entity was created.
    #[inline]
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// The registered type of the occupying entity.
    #[inline]
    pub fn entity_type(&self) -> EntityTypeId {
        self.entity_type
    }

    /// Recover a typed reference if the occupant is an `S`.
    ///
    /// Entity type ids are only unique within one entity registry, so `S` must come from the
    /// registry the occupying entity was created with.
    #[inline]
    pub fn downcast<S: EntityType>(&self) -> Option<EntityRef<S>> {
        (self.entity_type == S::ID).then(|| EntityRef::new(self.pool, self.slot, self.generation))
    }
}

/// A copyable, non-owning, typed reference to an entity.
///
/// Unlike [`Entity`](super::Entity), dropping a reference never frees the slot. Every access
/// re-validates the reference against the pool, so a reference to an entity that has since been
/// destroyed reports [`PoolError::Stale`] instead of reading another entity's data.
pub struct EntityRef<S> {
    pool: PoolId,
    slot: Slot,
    generation: Generation,
    _shape: PhantomData<fn() -> S>,
}

impl<S> EntityRef<S> {
    #[inline]
    pub(crate) const fn new(pool: PoolId, slot: Slot, generation: Generation) -> Self {
        Self {
            pool,
            slot,
            generation,
            _shape: PhantomData,
        }
    }

    /// The referenced slot.
    #[inline]
    pub fn slot(&self) -> Slot {
        self.slot
    }

    /// The generation the referenced entity was created with.
    #[inline]
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// The pool the referenced entity lives in.
    #[inline]
    pub fn pool(&self) -> PoolId {
        self.pool
    }
}

impl<S: Shape> EntityRef<S> {
    /// The untyped occupant record for this reference.
    #[inline]
    pub fn occupant(&self) -> Occupant {
        Occupant::new(self.pool, self.slot, self.generation, S::ID)
    }

    /// Determine whether the referenced entity is still alive in `pool`.
    #[inline]
    pub fn is_alive(&self, pool: &Pool<S::Components>) -> bool {
        pool.is_current(&self.occupant())
    }

    /// Borrow component `T` of the referenced entity.
    pub fn try_component<'p, T>(&self, pool: &'p Pool<S::Components>) -> Result<&'p T, PoolError>
    where
        S: Has<T>,
        T: Registered<S::Components>,
    {
        pool.checked::<T>(self.pool, self.slot, self.generation)
    }

    /// Mutably borrow component `T` of the referenced entity.
    pub fn try_component_mut<'p, T>(
        &self,
        pool: &'p mut Pool<S::Components>,
    ) -> Result<&'p mut T, PoolError>
    where
        S: Has<T>,
        T: Registered<S::Components>,
    {
        pool.checked_mut::<T>(self.pool, self.slot, self.generation)
    }

    /// Borrow component `T` of the referenced entity.
    ///
    /// # Panics
    ///
    /// Panics if the entity belongs to another pool or has been destroyed. Use
    /// [`EntityRef::try_component`] when that can legitimately happen.
    #[track_caller]
    pub fn component<'p, T>(&self, pool: &'p Pool<S::Components>) -> &'p T
    where
        S: Has<T>,
        T: Registered<S::Components>,
    {
        match self.try_component::<T>(pool) {
            Ok(component) => component,
            Err(err) => panic!("{} {}: {err}", S::NAME, self.slot),
        }
    }

    /// Mutably borrow component `T` of the referenced entity.
    ///
    /// # Panics
    ///
    /// Panics if the entity belongs to another pool or has been destroyed.
    #[track_caller]
    pub fn component_mut<'p, T>(&self, pool: &'p mut Pool<S::Components>) -> &'p mut T
    where
        S: Has<T>,
        T: Registered<S::Components>,
    {
        match self.try_component_mut::<T>(pool) {
            Ok(component) => component,
            Err(err) => panic!("{} {}: {err}", S::NAME, self.slot),
        }
    }
}

impl<S> Clone for EntityRef<S> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for EntityRef<S> {}

impl<S> PartialEq for EntityRef<S> {
    fn eq(&self, other: &Self) -> bool {
        self.pool == other.pool && self.slot == other.slot && self.generation == other.generation
    }
}

impl<S> Eq for EntityRef<S> {}

impl<S: EntityType> fmt::Debug for EntityRef<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityRef")
            .field("type", &S::NAME)
            .field("pool", &self.pool)
            .field("slot", &self.slot)
            .field("generation", &self.generation)
            .finish()
    }
}
