//! Slot-indexed component storage.
//!
//! A [`Pool`] owns every component value for every entity it created. It is built once over a
//! closed component [`Registry`] and keeps one densely packed column per registered type. Columns
//! always have the same length: a slot index addresses the same entity in every column.
//!
//! ```text
//!              slot:   0        1        2        3
//!          occupied:   1        0        1        1
//!              mask:  {0,1,2}  {}       {0,2}    {0,1,2}
//!          occupant:  Npc/g0   -        Food/g3  Npc/g1
//!  column Label     : [L0,     --,      L2,      L3     ]
//!  column Body      : [B0,     --,      --,      B3     ]   <- every column has the same length
//!  column Orientation: [O0,    --,      O2,      O3     ]
//! ```
//!
//! # Slots
//!
//! A slot is occupied iff it holds an [`Occupant`] record. Its component mask is set when the
//! entity is created and is never changed until the slot is freed. Freed slots keep their stale
//! component values, which are reset when the slot is reused, and bump the slot's [`Generation`]
//! so that outstanding references detect the reuse.
//!
//! # Growth
//!
//! When no free slot exists the pool doubles its capacity (minimum 8), growing every column in
//! lock-step. Handles address components by slot, never by address, so growth has nothing to
//! fix up. It only verifies that every occupied slot still has its occupant record.
//!
//! # Deferred release
//!
//! Dropping an [`Entity`] queues its slot on the pool's release channel. Queued releases are
//! applied by [`Pool::maintain`], which runs automatically at the start of every structural or
//! iterating operation. A slot is therefore never freed underneath an active iteration.

pub(crate) mod column;
mod slot;
mod view;

use std::{fmt, marker::PhantomData};

use crossbeam::channel::{Receiver, Sender, unbounded};
use fixedbitset::FixedBitSet;
use log::{debug, error, trace, warn};

pub use column::{AnyColumn, Column};
pub use slot::{Generation, PoolId, Slot};
pub use view::View;

use crate::ecs::{
    component::{Mask, Registered, Registry},
    entity::{Entity, EntityRef, Occupant, Shape},
    error::PoolError,
    query::{Query, QueryIter},
};

/// The smallest capacity a growing pool allocates.
const MIN_CAPACITY: usize = 8;

/// A request, sent by a dropped [`Entity`], to free its slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Release {
    slot: Slot,
    generation: Generation,
}

impl Release {
    #[inline]
    pub(crate) const fn new(slot: Slot, generation: Generation) -> Self {
        Self { slot, generation }
    }
}

/// Component storage for every entity shape drawn from registry `R`.
pub struct Pool<R: Registry> {
    id: PoolId,
    columns: Vec<Box<dyn AnyColumn>>,
    occupied: FixedBitSet,
    masks: Vec<Mask>,
    occupants: Vec<Option<Occupant>>,
    generations: Vec<Generation>,
    len: usize,
    release_tx: Sender<Release>,
    release_rx: Receiver<Release>,
    _registry: PhantomData<fn() -> R>,
}

impl<R: Registry> Pool<R> {
    /// Construct an empty pool. Storage is allocated by the first entity.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Construct a pool with `capacity` slots preallocated in every column.
    pub fn with_capacity(capacity: usize) -> Self {
        let (release_tx, release_rx) = unbounded();
        let mut pool = Self {
            id: PoolId::next(),
            columns: R::columns(),
            occupied: FixedBitSet::new(),
            masks: Vec::new(),
            occupants: Vec::new(),
            generations: Vec::new(),
            len: 0,
            release_tx,
            release_rx,
            _registry: PhantomData,
        };
        if capacity > 0 {
            pool.resize_component_storage(capacity);
        }
        pool
    }

    /// The unique id of this pool.
    #[inline]
    pub fn id(&self) -> PoolId {
        self.id
    }

    /// The number of occupied slots.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Determine whether no slot is occupied.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The number of slots in every column.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.occupied.len()
    }

    /// Create an entity of shape `S` in the lowest free slot, growing storage when none is free.
    ///
    /// Each of the shape's components starts at its `Default` value.
    pub fn create_entity<S>(&mut self) -> Entity<S>
    where
        S: Shape<Components = R>,
    {
        self.maintain();
        let slot = self.allocate::<S>();
        for &index in S::COMPONENTS {
            self.columns[index].reset(slot.index());
        }
        trace!("{} created {} at {slot}", self.id, S::NAME);
        self.issue(slot)
    }

    /// Copy `entity` into a fresh slot, cloning each of its component values.
    ///
    /// The two handles thereafter own independent data and drop independently.
    pub fn copy_entity<S>(&mut self, entity: &Entity<S>) -> Result<Entity<S>, PoolError>
    where
        S: Shape<Components = R>,
    {
        self.maintain();
        let source = entity.reference().ok_or(PoolError::EmptyHandle)?;
        self.validate(source.pool(), source.slot(), source.generation())?;

        let slot = self.allocate::<S>();
        for &index in S::COMPONENTS {
            self.columns[index].copy(source.slot().index(), slot.index());
        }
        trace!(
            "{} copied {} from {} to {slot}",
            self.id,
            S::NAME,
            source.slot()
        );
        Ok(self.issue(slot))
    }

    /// Visit every occupied slot whose mask is a superset of `Q`'s components, in ascending
    /// slot order, passing the slot and the requested components.
    ///
    /// ```rust,ignore
    /// pool.run_system::<(&Sprite, &mut Orientation), _>(|slot, (sprite, orientation)| {
    ///     orientation.rotate(sprite.spin);
    /// });
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if `Q` requests the same component more than once.
    pub fn run_system<'p, Q, F>(&'p mut self, mut system: F)
    where
        Q: Query<R>,
        F: FnMut(Slot, Q::Item<'p>),
    {
        for (slot, item) in self.query::<Q>() {
            system(slot, item);
        }
    }

    /// Iterate `(slot, components)` for every slot [`Pool::run_system`] would visit.
    ///
    /// # Panics
    ///
    /// Panics if `Q` requests the same component more than once.
    pub fn query<Q: Query<R>>(&mut self) -> QueryIter<'_, R, Q> {
        self.maintain();
        let mask = crate::ecs::query::mask_of::<R, Q>();
        let state = Q::state(&mut self.columns);
        QueryIter::new(&self.occupied, &self.masks, mask, state)
    }

    /// A shared view of this pool for nested read-only passes.
    pub fn view(&mut self) -> View<'_, R> {
        self.maintain();
        View::new(self)
    }

    /// The occupant of `slot`, or `None` if the slot is free.
    #[inline]
    pub fn entity_handle(&self, slot: Slot) -> Option<Occupant> {
        self.occupants.get(slot.index()).copied().flatten()
    }

    /// Determine whether `occupant` still owns its slot in this pool.
    #[inline]
    pub fn is_current(&self, occupant: &Occupant) -> bool {
        self.entity_handle(occupant.slot()).as_ref() == Some(occupant)
    }

    /// Component `T` of the entity in `slot`, if the slot is occupied by a shape carrying `T`.
    pub fn get<T: Registered<R>>(&self, slot: Slot) -> Option<&T> {
        self.has::<T>(slot)
            .then(|| &column::typed::<T>(&self.columns, T::INDEX).values()[slot.index()])
    }

    /// Mutable variant of [`Pool::get`].
    pub fn get_mut<T: Registered<R>>(&mut self, slot: Slot) -> Option<&mut T> {
        if !self.has::<T>(slot) {
            return None;
        }
        Some(&mut column::typed_mut::<T>(&mut self.columns, T::INDEX).values_mut()[slot.index()])
    }

    /// Mutably borrow component `T` of two different slots at once.
    pub fn pair_mut<T: Registered<R>>(&mut self, a: Slot, b: Slot) -> Option<(&mut T, &mut T)> {
        if a == b || !self.has::<T>(a) || !self.has::<T>(b) {
            return None;
        }
        let values = column::typed_mut::<T>(&mut self.columns, T::INDEX).values_mut();
        let (low, high) = (a.index().min(b.index()), a.index().max(b.index()));
        let (head, tail) = values.split_at_mut(high);
        let (first, second) = (&mut head[low], &mut tail[0]);
        Some(if a < b { (first, second) } else { (second, first) })
    }

    /// Component `T` of a live occupant.
    pub fn component_of<T: Registered<R>>(&self, occupant: &Occupant) -> Result<&T, PoolError> {
        self.validate(occupant.pool(), occupant.slot(), occupant.generation())?;
        self.get::<T>(occupant.slot())
            .ok_or(PoolError::MissingComponent {
                slot: occupant.slot(),
                component: R::name(T::INDEX),
            })
    }

    /// Mutable variant of [`Pool::component_of`].
    pub fn component_of_mut<T: Registered<R>>(
        &mut self,
        occupant: &Occupant,
    ) -> Result<&mut T, PoolError> {
        self.validate(occupant.pool(), occupant.slot(), occupant.generation())?;
        let slot = occupant.slot();
        self.get_mut::<T>(slot).ok_or(PoolError::MissingComponent {
            slot,
            component: R::name(T::INDEX),
        })
    }

    /// Apply every queued release. Returns the number of slots freed.
    pub fn maintain(&mut self) -> usize {
        let mut freed = 0;
        while let Ok(release) = self.release_rx.try_recv() {
            if self.destroy_entity(release.slot, release.generation) {
                freed += 1;
            }
        }
        freed
    }

    /// Checked access used by entity handles and references.
    pub(crate) fn checked<T: Registered<R>>(
        &self,
        pool: PoolId,
        slot: Slot,
        generation: Generation,
    ) -> Result<&T, PoolError> {
        self.validate(pool, slot, generation)?;
        Ok(&column::typed::<T>(&self.columns, T::INDEX).values()[slot.index()])
    }

    /// Mutable variant of [`Pool::checked`].
    pub(crate) fn checked_mut<T: Registered<R>>(
        &mut self,
        pool: PoolId,
        slot: Slot,
        generation: Generation,
    ) -> Result<&mut T, PoolError> {
        self.validate(pool, slot, generation)?;
        Ok(&mut column::typed_mut::<T>(&mut self.columns, T::INDEX).values_mut()[slot.index()])
    }

    pub(crate) fn columns(&self) -> &[Box<dyn AnyColumn>] {
        &self.columns
    }

    pub(crate) fn occupancy(&self) -> (&FixedBitSet, &[Mask]) {
        (&self.occupied, &self.masks)
    }

    fn validate(&self, pool: PoolId, slot: Slot, generation: Generation) -> Result<(), PoolError> {
        if pool != self.id {
            return Err(PoolError::ForeignPool {
                handle: pool,
                pool: self.id,
            });
        }
        let live = self.occupied.contains(slot.index())
            && self.generations.get(slot.index()) == Some(&generation);
        if live {
            Ok(())
        } else {
            Err(PoolError::Stale { slot })
        }
    }

    #[inline]
    fn has<T: Registered<R>>(&self, slot: Slot) -> bool {
        self.occupied.contains(slot.index()) && self.masks[slot.index()].contains(T::INDEX)
    }

    /// Claim a free slot for shape `S` and record its mask and occupant.
    fn allocate<S: Shape<Components = R>>(&mut self) -> Slot {
        let slot = match self.find_free_slot() {
            Some(slot) => slot,
            None => {
                let slot = Slot::from(self.capacity());
                self.resize_component_storage((self.capacity() * 2).max(MIN_CAPACITY));
                slot
            }
        };
        let index = slot.index();
        self.occupied.insert(index);
        let mask = &mut self.masks[index];
        mask.clear();
        for &component in S::COMPONENTS {
            mask.insert(component);
        }
        self.occupants[index] = Some(Occupant::new(
            self.id,
            slot,
            self.generations[index],
            S::ID,
        ));
        self.len += 1;
        slot
    }

    fn issue<S: Shape<Components = R>>(&self, slot: Slot) -> Entity<S> {
        let reference = EntityRef::new(self.id, slot, self.generations[slot.index()]);
        Entity::new(reference, self.release_tx.clone())
    }

    /// The lowest free slot, if any.
    fn find_free_slot(&self) -> Option<Slot> {
        self.occupied.zeroes().next().map(Slot::from)
    }

    /// Free `slot` if it still belongs to `generation`. Component values are left in place.
    fn destroy_entity(&mut self, slot: Slot, generation: Generation) -> bool {
        let index = slot.index();
        if !self.occupied.contains(index) || self.generations[index] != generation {
            warn!("{} ignored stale release of {slot}", self.id);
            return false;
        }
        let entity_type = self.occupants[index].map(|o| o.entity_type());
        self.occupied.set(index, false);
        self.masks[index].clear();
        self.occupants[index] = None;
        self.generations[index] = generation.next();
        self.len -= 1;
        trace!("{} destroyed {entity_type:?} at {slot}", self.id);
        true
    }

    /// Grow every column, and the per-slot bookkeeping, to `len` slots.
    ///
    /// # Panics
    ///
    /// Panics if an occupied slot has lost its occupant record: the pool's bookkeeping is corrupt
    /// and no handle into it can be trusted.
    fn resize_component_storage(&mut self, len: usize) {
        debug!("{} growing from {} to {len} slots", self.id, self.capacity());
        for column in self.columns.iter_mut() {
            column.resize(len);
        }
        self.occupied.grow(len);
        self.masks.resize_with(len, || Mask::with_capacity(R::LEN));
        self.occupants.resize(len, None);
        self.generations.resize(len, Generation::FIRST);

        for index in self.occupied.ones() {
            if self.occupants[index].is_none() {
                error!("{} slot {index} is occupied without an occupant", self.id);
                panic!("pool bookkeeping corrupt: occupied slot {index} has no occupant record");
            }
        }
    }
}

impl<R: Registry> Default for Pool<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Registry> fmt::Debug for Pool<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("id", &self.id)
            .field("len", &self.len)
            .field("capacity", &self.capacity())
            .field("components", &R::names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::{
        component::tests::{Name, Position, TestComponents, Velocity},
        entity::{
            EntityType,
            tests::{Plant, Rock, Walker},
        },
    };

    type TestPool = Pool<TestComponents>;

    #[test]
    fn create_uses_lowest_free_slot() {
        // Given
        let mut pool = TestPool::new();
        let a = pool.create_entity::<Rock>();
        let b = pool.create_entity::<Rock>();
        let c = pool.create_entity::<Rock>();

        // When
        drop(b);
        let d = pool.create_entity::<Walker>();

        // Then
        assert_eq!(a.slot(), Some(Slot::new(0)));
        assert_eq!(c.slot(), Some(Slot::new(2)));
        assert_eq!(d.slot(), Some(Slot::new(1)));
        assert_eq!(pool.len(), 3);
    }

    #[test]
    fn growth_preserves_component_values() {
        // Given
        let mut pool = TestPool::new();
        let mut walkers = Vec::new();
        for i in 0..MIN_CAPACITY {
            let walker = pool.create_entity::<Walker>();
            walker.component_mut::<Position>(&mut pool).x = i as f32;
            walker.component_mut::<Name>(&mut pool).0 = format!("w{i}");
            walkers.push(walker);
        }
        assert_eq!(pool.capacity(), MIN_CAPACITY);

        // When - force at least one growth
        for _ in 0..MIN_CAPACITY * 3 {
            walkers.push(pool.create_entity::<Walker>());
        }

        // Then
        assert!(pool.capacity() >= MIN_CAPACITY * 4);
        for (i, walker) in walkers.iter().take(MIN_CAPACITY).enumerate() {
            assert_eq!(walker.component::<Position>(&pool).x, i as f32);
            assert_eq!(walker.component::<Name>(&pool).0, format!("w{i}"));
        }
    }

    #[test]
    fn with_capacity_preallocates() {
        let pool = TestPool::with_capacity(100);
        assert_eq!(pool.capacity(), 100);
        assert!(pool.columns().iter().all(|c| c.len() == 100));
        assert!(pool.is_empty());
    }

    #[test]
    fn reused_slot_starts_from_default() {
        // Given
        let mut pool = TestPool::new();
        let plant = pool.create_entity::<Plant>();
        plant.component_mut::<Position>(&mut pool).y = 9.0;
        drop(plant);

        // When
        let walker = pool.create_entity::<Walker>();

        // Then
        assert_eq!(walker.slot(), Some(Slot::new(0)));
        assert_eq!(*walker.component::<Position>(&pool), Position::default());
    }

    #[test]
    fn run_system_visits_superset_masks_only() {
        // Given
        let mut pool = TestPool::new();
        let _walker = pool.create_entity::<Walker>();
        let _plant = pool.create_entity::<Plant>();
        let rock = pool.create_entity::<Rock>();
        let _walker2 = pool.create_entity::<Walker>();
        drop(rock);

        // When
        let mut moving = Vec::new();
        pool.run_system::<(&Position, &Velocity), _>(|slot, _| moving.push(slot.index()));
        let mut named = Vec::new();
        pool.run_system::<&Name, _>(|slot, _| named.push(slot.index()));
        let mut all = Vec::new();
        pool.run_system::<(), _>(|slot, ()| all.push(slot.index()));

        // Then
        assert_eq!(moving, vec![0, 3]);
        assert_eq!(named, vec![0, 1, 3]);
        assert_eq!(all, vec![0, 1, 3]);
    }

    #[test]
    fn run_system_mutates_in_place() {
        // Given
        let mut pool = TestPool::new();
        let walker = pool.create_entity::<Walker>();
        walker.component_mut::<Velocity>(&mut pool).dx = 2.0;

        // When
        pool.run_system::<(&mut Position, &Velocity), _>(|_, (position, velocity)| {
            position.x += velocity.dx;
        });

        // Then
        assert_eq!(walker.component::<Position>(&pool).x, 2.0);
    }

    #[test]
    fn entity_handle_reports_occupant() {
        // Given
        let mut pool = TestPool::new();
        let plant = pool.create_entity::<Plant>();
        let slot = plant.slot().unwrap();

        // When
        let occupant = pool.entity_handle(slot).unwrap();

        // Then
        assert_eq!(occupant.entity_type(), Plant::ID);
        assert!(pool.is_current(&occupant));
        assert!(occupant.downcast::<Walker>().is_none());
        assert_eq!(occupant.downcast::<Plant>(), plant.reference());
        assert!(pool.entity_handle(Slot::new(5)).is_none());
        assert!(pool.entity_handle(Slot::new(500)).is_none());

        // When
        drop(plant);
        pool.maintain();

        // Then
        assert!(!pool.is_current(&occupant));
        assert!(pool.entity_handle(slot).is_none());
    }

    #[test]
    fn slot_access_respects_masks() {
        // Given
        let mut pool = TestPool::new();
        let rock = pool.create_entity::<Rock>();
        let plant = pool.create_entity::<Plant>();
        let (r, p) = (rock.slot().unwrap(), plant.slot().unwrap());

        // Then
        assert!(pool.get::<Position>(r).is_some());
        assert!(pool.get::<Name>(r).is_none());
        assert!(pool.get_mut::<Name>(p).is_some());
        assert!(pool.get::<Position>(Slot::new(7)).is_none());
        let occupant = pool.entity_handle(r).unwrap();
        assert_eq!(
            pool.component_of::<Velocity>(&occupant),
            Err(PoolError::MissingComponent {
                slot: r,
                component: "Velocity"
            })
        );
    }

    #[test]
    fn pair_mut_borrows_two_slots() {
        // Given
        let mut pool = TestPool::new();
        let a = pool.create_entity::<Rock>();
        let b = pool.create_entity::<Rock>();
        let (sa, sb) = (a.slot().unwrap(), b.slot().unwrap());

        // When
        if let Some((second, first)) = pool.pair_mut::<Position>(sb, sa) {
            first.x = 1.0;
            second.x = 2.0;
        }

        // Then
        assert_eq!(a.component::<Position>(&pool).x, 1.0);
        assert_eq!(b.component::<Position>(&pool).x, 2.0);
        assert!(pool.pair_mut::<Position>(sa, sa).is_none());
    }

    #[test]
    fn stale_release_is_ignored() {
        // Given
        let mut pool = TestPool::new();
        let rock = pool.create_entity::<Rock>();
        let slot = rock.slot().unwrap();

        // When - the same slot released for an old generation
        drop(rock);
        assert_eq!(pool.maintain(), 1);
        let _again = pool.create_entity::<Rock>();
        pool.release_tx.send(Release::new(slot, Generation::FIRST)).unwrap();

        // Then
        assert_eq!(pool.maintain(), 0);
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn copy_rejects_stale_and_empty_handles() {
        // Given
        let mut pool = TestPool::new();
        let empty = Entity::<Rock>::default();

        // Then
        assert_eq!(pool.copy_entity(&empty).unwrap_err(), PoolError::EmptyHandle);
    }

    #[test]
    #[should_panic(expected = "pool bookkeeping corrupt")]
    fn resize_detects_missing_occupant() {
        // Given
        let mut pool = TestPool::new();
        let rock = pool.create_entity::<Rock>();
        pool.occupants[rock.slot().unwrap().index()] = None;

        // When
        pool.resize_component_storage(64);
    }

    #[test]
    #[should_panic(expected = "more than once")]
    fn duplicate_query_component_panics() {
        let mut pool = TestPool::new();
        pool.run_system::<(&Position, &mut Position), _>(|_, _| {});
    }
}
