//! Pairwise collision detection and resolution.
//!
//! Once per simulation step the [`CollisionHandler`] scans every entity carrying a
//! [`CollisionBody`] and an [`Orientation`], finds each unordered pair of overlapping circles
//! exactly once, and resolves every pair through its [`DispatchTable`].
//!
//! # Detection
//!
//! Detection is a nested read-only pass over the pool: for each outer slot, the inner pass
//! visits only lower slots, so a pair is never seen twice and an entity is never paired with
//! itself. Pairs are found in ascending slot order, which makes resolution order deterministic
//! for a given occupancy. Each participant's dispatch cell comes from the entity type of the
//! slot's occupant.
//!
//! # Resolution
//!
//! Resolution runs after the scan has finished, never during it. Behaviours can therefore mutate
//! the context (move entities, retire them) freely. Before each pair is resolved both
//! participants are re-validated; a pair whose participant was destroyed, or retired by an
//! earlier resolution in the same step, is skipped.
//!
//! A pair whose types have no behaviour in the table is a fatal configuration error and panics.

mod body;
mod dispatch;

use log::{error, trace};

pub use body::CollisionBody;
pub use dispatch::{DispatchBuilder, DispatchError, DispatchTable, Participant};

use crate::{
    ecs::{EntityRegistry, Occupant, Pool, Registered, Registry},
    orientation::Orientation,
};

/// What a collision pass needs from its owner.
pub trait CollisionContext<R: Registry> {
    /// The pool holding the colliding entities.
    fn pool(&self) -> &Pool<R>;

    /// Mutable access to the pool.
    fn pool_mut(&mut self) -> &mut Pool<R>;

    /// Whether `occupant` has been scheduled for removal and must not be resolved again.
    fn is_retired(&self, _occupant: &Occupant) -> bool {
        false
    }
}

/// Finds and resolves overlapping pairs of entities.
pub struct CollisionHandler<R, K, C>
where
    R: Registry,
    K: EntityRegistry,
    C: CollisionContext<R> + 'static,
{
    table: DispatchTable<K, C>,
    pairs: Vec<(Participant, Participant)>,
    _registry: std::marker::PhantomData<fn() -> R>,
}

impl<R, K, C> CollisionHandler<R, K, C>
where
    R: Registry,
    K: EntityRegistry,
    C: CollisionContext<R> + 'static,
    CollisionBody: Registered<R>,
    Orientation: Registered<R>,
{
    pub fn new(table: DispatchTable<K, C>) -> Self {
        Self {
            table,
            pairs: Vec::new(),
            _registry: std::marker::PhantomData,
        }
    }

    /// The dispatch table pairs are resolved with.
    #[inline]
    pub fn table(&self) -> &DispatchTable<K, C> {
        &self.table
    }

    /// Whether two circles overlap: `distance² < (r1 + r2)²`.
    #[inline]
    pub fn overlaps(a: (&CollisionBody, &Orientation), b: (&CollisionBody, &Orientation)) -> bool {
        let reach = a.0.radius + b.0.radius;
        (a.1.position() - b.1.position()).squared_norm() < reach * reach
    }

    /// Run one collision pass over `ctx`'s pool. Returns the number of pairs resolved.
    ///
    /// # Panics
    ///
    /// Panics if two overlapping entities have types the dispatch table has no behaviour for.
    pub fn run(&mut self, ctx: &mut C) -> usize {
        self.detect(ctx.pool_mut());

        let mut resolved = 0;
        for &(x, y) in &self.pairs {
            if !Self::is_live(ctx, &x.occupant) || !Self::is_live(ctx, &y.occupant) {
                trace!("skipped pair {} {}", x.occupant.slot(), y.occupant.slot());
                continue;
            }
            if let Err(err) = self.table.resolve(ctx, x, y) {
                error!("collision between {} and {}: {err}", x.occupant.slot(), y.occupant.slot());
                panic!("{err}");
            }
            resolved += 1;
        }
        trace!("resolved {resolved} of {} pairs", self.pairs.len());
        resolved
    }

    /// Collect every overlapping pair as `(outer, inner)` with `inner < outer`.
    fn detect(&mut self, pool: &mut Pool<R>) {
        self.pairs.clear();
        let view = pool.view();
        let pairs = &mut self.pairs;
        view.run_system::<(&CollisionBody, &Orientation), _>(|outer, a| {
            for (inner, b) in view.query::<(&CollisionBody, &Orientation)>() {
                if inner >= outer {
                    break;
                }
                if !Self::overlaps(a, b) {
                    continue;
                }
                if let (Some(x), Some(y)) = (view.entity_handle(outer), view.entity_handle(inner)) {
                    pairs.push((
                        Participant::new(x, x.entity_type()),
                        Participant::new(y, y.entity_type()),
                    ));
                }
            }
        });
    }

    fn is_live(ctx: &C, occupant: &Occupant) -> bool {
        ctx.pool().is_current(occupant) && !ctx.is_retired(occupant)
    }
}
