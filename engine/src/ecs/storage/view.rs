use std::fmt;

use crate::ecs::{
    component::{Registered, Registry},
    entity::Occupant,
    error::PoolError,
    query::{QueryIter, ReadOnlyQuery, mask_of},
    storage::{Pool, Slot},
};

/// A shared, copyable view of a [`Pool`].
///
/// A view only hands out shared component references, so any number of read-only passes can be
/// nested inside each other, e.g. an outer and an inner scan over the same bodies when looking for
/// overlapping pairs. Obtain one with [`Pool::view`], which applies pending releases first.
///
/// ```rust,ignore
/// let view = pool.view();
/// view.run_system::<&Orientation, _>(|outer, a| {
///     for (inner, b) in view.query::<&Orientation>() {
///         // compare a and b
///     }
/// });
/// ```
pub struct View<'p, R: Registry> {
    pool: &'p Pool<R>,
}

impl<'p, R: Registry> View<'p, R> {
    #[inline]
    pub(crate) fn new(pool: &'p Pool<R>) -> Self {
        Self { pool }
    }

    /// Iterate `(slot, components)` for every occupied slot carrying `Q`'s components.
    ///
    /// # Panics
    ///
    /// Panics if `Q` requests the same component more than once.
    pub fn query<Q: ReadOnlyQuery<R>>(&self) -> QueryIter<'p, R, Q> {
        let (occupied, masks) = self.pool.occupancy();
        let state = Q::state_shared(self.pool.columns());
        QueryIter::new(occupied, masks, mask_of::<R, Q>(), state)
    }

    /// Read-only counterpart of [`Pool::run_system`].
    pub fn run_system<Q, F>(&self, mut system: F)
    where
        Q: ReadOnlyQuery<R>,
        F: FnMut(Slot, Q::Item<'p>),
    {
        for (slot, item) in self.query::<Q>() {
            system(slot, item);
        }
    }

    /// See [`Pool::entity_handle`].
    #[inline]
    pub fn entity_handle(&self, slot: Slot) -> Option<Occupant> {
        self.pool.entity_handle(slot)
    }

    /// See [`Pool::is_current`].
    #[inline]
    pub fn is_current(&self, occupant: &Occupant) -> bool {
        self.pool.is_current(occupant)
    }

    /// See [`Pool::get`].
    #[inline]
    pub fn get<T: Registered<R>>(&self, slot: Slot) -> Option<&'p T> {
        self.pool.get::<T>(slot)
    }

    /// See [`Pool::component_of`].
    #[inline]
    pub fn component_of<T: Registered<R>>(&self, occupant: &Occupant) -> Result<&'p T, PoolError> {
        self.pool.component_of::<T>(occupant)
    }

    /// The number of occupied slots.
    #[inline]
    pub fn len(&self) -> usize {
        self.pool.len()
    }

    /// Determine whether no slot is occupied.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }
}

impl<R: Registry> Clone for View<'_, R> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<R: Registry> Copy for View<'_, R> {}

impl<R: Registry> fmt::Debug for View<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("View").field(self.pool).finish()
    }
}
