//! The iterator behind every pool pass.

use std::marker::PhantomData;

use fixedbitset::FixedBitSet;

use crate::ecs::{
    component::{Mask, Registry},
    query::Query,
    storage::Slot,
};

/// An iterator over `(slot, item)` for every occupied slot matching a query's mask.
///
/// Slots are visited in ascending order. Free slots are skipped with a single bit test, so sparse
/// pools iterate correctly without compaction.
pub struct QueryIter<'p, R: Registry, Q: Query<R>> {
    occupied: &'p FixedBitSet,
    masks: &'p [Mask],
    mask: Mask,
    state: Q::State,
    next: usize,
    _marker: PhantomData<fn() -> R>,
}

impl<'p, R: Registry, Q: Query<R>> QueryIter<'p, R, Q> {
    #[inline]
    pub(crate) fn new(
        occupied: &'p FixedBitSet,
        masks: &'p [Mask],
        mask: Mask,
        state: Q::State,
    ) -> Self {
        Self {
            occupied,
            masks,
            mask,
            state,
            next: 0,
            _marker: PhantomData,
        }
    }

    /// The mask a slot must be a superset of to be visited.
    #[inline]
    pub fn mask(&self) -> &Mask {
        &self.mask
    }
}

impl<'p, R: Registry, Q: Query<R>> Iterator for QueryIter<'p, R, Q> {
    type Item = (Slot, Q::Item<'p>);

    fn next(&mut self) -> Option<Self::Item> {
        while self.next < self.masks.len() {
            let index = self.next;
            self.next += 1;
            if self.occupied.contains(index) && self.masks[index].is_superset(&self.mask) {
                // SAFETY: `index` is below the column length captured in `state`, and each index
                // is yielded at most once per pass.
                let item = unsafe { Q::fetch(self.state, index) };
                return Some((Slot::from(index), item));
            }
        }
        None
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.masks.len() - self.next))
    }
}

#[cfg(test)]
mod tests {
    use crate::ecs::{
        component::{
            Mask,
            tests::{Position, TestComponents, Velocity},
        },
        entity::tests::{Plant, Rock, Walker},
        storage::{Pool, Slot},
    };

    #[test]
    fn skips_free_and_unmatched_slots() {
        // Given - a sparse pool
        let mut pool = Pool::<TestComponents>::new();
        let entities = (
            pool.create_entity::<Walker>(),
            pool.create_entity::<Rock>(),
            pool.create_entity::<Walker>(),
            pool.create_entity::<Plant>(),
        );
        drop(entities.0);

        // When
        let iter = pool.query::<(&Position, &Velocity)>();
        assert_eq!(iter.mask(), &Mask::from_indices(&[0, 1]));
        let slots: Vec<Slot> = iter.map(|(slot, _)| slot).collect();

        // Then
        assert_eq!(slots, vec![Slot::new(2)]);
    }

    #[test]
    fn empty_pool_yields_nothing() {
        let mut pool = Pool::<TestComponents>::new();
        assert!(pool.query::<&Position>().next().is_none());
    }
}
