use std::{
    fmt,
    hash::{Hash, Hasher},
};

use fixedbitset::FixedBitSet;

/// Bitset over registered component indices.
///
/// A mask tags which components a slot holds and describes which components a query requires.
/// Bit N set means the component registered at index N is included. A query matches a slot iff
/// the slot's mask is a superset of the query's mask.
#[derive(Clone, Default)]
pub struct Mask {
    bits: FixedBitSet,
}

impl Mask {
    /// An empty mask.
    pub const EMPTY: Self = Self {
        bits: FixedBitSet::new(),
    };

    /// Construct an empty mask sized for `len` component types.
    #[inline]
    pub fn with_capacity(len: usize) -> Self {
        Self {
            bits: FixedBitSet::with_capacity(len),
        }
    }

    /// Construct a mask with the given component indices set.
    pub fn from_indices(indices: &[usize]) -> Self {
        let mut mask = Self::EMPTY;
        for &index in indices {
            mask.insert(index);
        }
        mask
    }

    /// Set the bit for a component index, growing as needed.
    #[inline]
    pub fn insert(&mut self, index: usize) {
        self.bits.grow(index + 1);
        self.bits.insert(index);
    }

    /// Determine whether a component index is set.
    #[inline]
    pub fn contains(&self, index: usize) -> bool {
        self.bits.contains(index)
    }

    /// Determine whether every bit in `other` is also set in `self`.
    #[inline]
    pub fn is_superset(&self, other: &Mask) -> bool {
        self.bits.is_superset(&other.bits)
    }

    /// Determine whether no bit is set.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bits.is_clear()
    }

    /// The number of set bits.
    #[inline]
    pub fn len(&self) -> usize {
        self.bits.count_ones(..)
    }

    /// Clear every bit while keeping the allocation.
    #[inline]
    pub fn clear(&mut self) {
        self.bits.clear();
    }

    /// Overwrite this mask with `other`, reusing the allocation where possible.
    #[inline]
    pub fn assign(&mut self, other: &Mask) {
        self.bits.clear();
        self.bits.union_with(&other.bits);
    }

    /// Iterate the set component indices in ascending order.
    #[inline]
    pub fn ones(&self) -> impl Iterator<Item = usize> + '_ {
        self.bits.ones()
    }
}

/// Masks compare by their set bits, regardless of how far either bitset has grown.
impl PartialEq for Mask {
    fn eq(&self, other: &Self) -> bool {
        self.is_superset(other) && other.is_superset(self)
    }
}

impl Eq for Mask {}

impl Hash for Mask {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for index in self.ones() {
            index.hash(state);
        }
    }
}

impl fmt::Debug for Mask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.ones()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn superset_matches_query_semantics() {
        // Given
        let slot = Mask::from_indices(&[0, 1, 2]);
        let query = Mask::from_indices(&[1, 2]);
        let other = Mask::from_indices(&[1, 3]);

        // Then - (query & slot) == query
        assert!(slot.is_superset(&query));
        assert!(!slot.is_superset(&other));
        assert!(slot.is_superset(&Mask::EMPTY));
        assert!(!Mask::EMPTY.is_superset(&query));
    }

    #[test]
    fn superset_ignores_differing_lengths() {
        // Given - grown to different bit lengths
        let mut wide = Mask::with_capacity(64);
        wide.insert(3);
        let narrow = Mask::from_indices(&[3]);

        // Then
        assert!(wide.is_superset(&narrow));
        assert!(narrow.is_superset(&wide));
        assert_eq!(wide, narrow);
    }

    #[test]
    fn assign_and_clear_reuse_mask() {
        // Given
        let mut mask = Mask::with_capacity(4);
        let shape = Mask::from_indices(&[0, 3]);

        // When
        mask.assign(&shape);

        // Then
        assert_eq!(mask.ones().collect::<Vec<_>>(), vec![0, 3]);
        assert_eq!(mask.len(), 2);

        // When
        mask.clear();

        // Then
        assert!(mask.is_empty());
        assert!(!mask.contains(0));
    }

    #[test]
    fn debug_lists_indices() {
        assert_eq!(format!("{:?}", Mask::from_indices(&[2, 0])), "{0, 2}");
    }
}
