//! The symmetric collision dispatch table.
//!
//! A [`DispatchTable`] is an `N x N` matrix over the entity types of one registry. Only the
//! canonical cell `(a, b)` with `a <= b` of each unordered pair can hold a behaviour, so a
//! behaviour is authored once per pair and the table resolves both orderings to it:
//!
//! ```text
//!            Npc          Food
//!   Npc   [ npc_npc   ,  npc_food  ]
//!   Food  [ <none>    ,  food_food ]      cell(a, b) = b + a * N
//! ```
//!
//! Behaviours receive typed [`EntityRef`]s; the table stores them behind a wrapper that
//! downcasts the opaque [`Occupant`]s it is given.

use std::{fmt, marker::PhantomData};

use log::{debug, error};
use thiserror::Error;

use crate::ecs::{EntityRef, EntityRegistry, EntityType, EntityTypeId, Occupant};

/// Failures building or consulting a dispatch table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// No behaviour was registered for an observed pair.
    #[error("unsupported collision pair ({first}, {second})")]
    UnsupportedPair {
        first: &'static str,
        second: &'static str,
    },

    /// A behaviour was registered with the higher entity type id first.
    #[error("collision pair ({first}, {second}) is not in canonical order")]
    NonCanonicalPair {
        first: &'static str,
        second: &'static str,
    },

    /// A behaviour was registered twice for the same pair.
    #[error("collision pair ({first}, {second}) registered more than once")]
    DuplicatePair {
        first: &'static str,
        second: &'static str,
    },
}

/// One side of a detected collision: who occupies the slot and which entity type its collision
/// body declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Participant {
    pub occupant: Occupant,
    pub entity_type: EntityTypeId,
}

impl Participant {
    #[inline]
    pub const fn new(occupant: Occupant, entity_type: EntityTypeId) -> Self {
        Self {
            occupant,
            entity_type,
        }
    }
}

type Handler<C> = Box<dyn Fn(&mut C, Occupant, Occupant)>;

/// An immutable table from unordered entity type pairs of registry `K` to collision behaviours
/// over a context `C`.
pub struct DispatchTable<K: EntityRegistry, C: 'static> {
    cells: Vec<Option<Handler<C>>>,
    _registry: PhantomData<fn() -> K>,
}

impl<K: EntityRegistry, C: 'static> DispatchTable<K, C> {
    /// Start building a table.
    pub fn builder() -> DispatchBuilder<K, C> {
        DispatchBuilder {
            entries: Vec::new(),
            _registry: PhantomData,
        }
    }

    /// The cell of the ordered pair `(a, b)`.
    #[inline]
    pub const fn cell_index(a: EntityTypeId, b: EntityTypeId) -> usize {
        b.index() + a.index() * K::LEN
    }

    /// Determine whether the unordered pair `{a, b}` has a behaviour.
    pub fn is_supported(&self, a: EntityTypeId, b: EntityTypeId) -> bool {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        self.cells
            .get(Self::cell_index(low, high))
            .is_some_and(Option::is_some)
    }

    /// Run the behaviour for a detected collision between `x` and `y`.
    ///
    /// When `x`'s type id is lower the behaviour is called with `(x, y)`, otherwise with
    /// `(y, x)`, so the lower type id always comes first.
    pub fn resolve(&self, ctx: &mut C, x: Participant, y: Participant) -> Result<(), DispatchError> {
        let (first, second) = if x.entity_type < y.entity_type {
            (x, y)
        } else {
            (y, x)
        };
        let cell = Self::cell_index(first.entity_type, second.entity_type);
        match self.cells.get(cell) {
            Some(Some(handler)) => {
                handler(ctx, first.occupant, second.occupant);
                Ok(())
            }
            _ => Err(DispatchError::UnsupportedPair {
                first: K::name(first.entity_type),
                second: K::name(second.entity_type),
            }),
        }
    }
}

impl<K: EntityRegistry, C: 'static> fmt::Debug for DispatchTable<K, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let supported: Vec<_> = (0..K::LEN)
            .flat_map(|a| (a..K::LEN).map(move |b| (a, b)))
            .filter(|&(a, b)| self.cells[b + a * K::LEN].is_some())
            .map(|(a, b)| (K::names()[a], K::names()[b]))
            .collect();
        f.debug_struct("DispatchTable")
            .field("supported", &supported)
            .finish()
    }
}

/// Collects behaviours for a [`DispatchTable`].
pub struct DispatchBuilder<K: EntityRegistry, C: 'static> {
    entries: Vec<(EntityTypeId, EntityTypeId, Handler<C>)>,
    _registry: PhantomData<fn() -> K>,
}

impl<K: EntityRegistry, C: 'static> DispatchBuilder<K, C> {
    /// Register the behaviour for the pair `(A, B)`. `A` must not have a higher id than `B`.
    pub fn on<A, B>(mut self, behaviour: fn(&mut C, EntityRef<A>, EntityRef<B>)) -> Self
    where
        A: EntityType<Registry = K>,
        B: EntityType<Registry = K>,
    {
        let handler = move |ctx: &mut C, a: Occupant, b: Occupant| {
            behaviour(ctx, downcast::<A>(a), downcast::<B>(b));
        };
        self.entries.push((A::ID, B::ID, Box::new(handler)));
        self
    }

    /// Build the table. Every cell without a behaviour holds an explicit "no handler" marker.
    pub fn build(self) -> Result<DispatchTable<K, C>, DispatchError> {
        let mut cells: Vec<Option<Handler<C>>> = (0..K::LEN * K::LEN).map(|_| None).collect();
        for (a, b, handler) in self.entries {
            let names = (K::name(a), K::name(b));
            if a > b {
                return Err(DispatchError::NonCanonicalPair {
                    first: names.0,
                    second: names.1,
                });
            }
            let cell = &mut cells[DispatchTable::<K, C>::cell_index(a, b)];
            if cell.is_some() {
                return Err(DispatchError::DuplicatePair {
                    first: names.0,
                    second: names.1,
                });
            }
            *cell = Some(handler);
        }

        let table = DispatchTable {
            cells,
            _registry: PhantomData,
        };
        debug!("built {table:?}");
        Ok(table)
    }
}

#[track_caller]
fn downcast<S: EntityType>(occupant: Occupant) -> EntityRef<S> {
    match occupant.downcast::<S>() {
        Some(reference) => reference,
        None => {
            error!("{occupant:?} dispatched as {}", S::NAME);
            panic!(
                "collision body of {} tagged as {}",
                occupant.slot(),
                S::NAME
            );
        }
    }
}
