use std::{
    fmt,
    sync::atomic::{AtomicU32, Ordering},
};

use log::error;

/// One position in the pool's parallel component columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Slot(u32);

impl Slot {
    /// Construct a slot from a raw index.
    #[inline]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Get the index of this slot in the pool's columns.
    #[inline]
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl From<usize> for Slot {
    /// # Panics
    ///
    /// Panics if `value` does not fit a `u32`; a pool never holds more than `u32::MAX` slots.
    #[inline]
    fn from(value: usize) -> Self {
        match u32::try_from(value) {
            Ok(index) => Self(index),
            Err(_) => {
                error!("slot index {value} exceeds the pool limit of {}", u32::MAX);
                panic!("slot index {value} exceeds the pool limit of {}", u32::MAX);
            }
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// How many times a slot has been freed. Handles and occupants carry the generation they were
/// issued with, so a reference to a freed (and possibly reused) slot is detected as stale.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u32);

impl Generation {
    /// The generation of a slot that has never been freed.
    pub const FIRST: Self = Self(0);

    /// Get the next generation from the current.
    #[inline]
    pub fn next(&self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// A pool identifier, unique for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PoolId(u32);

static NEXT_POOL_ID: AtomicU32 = AtomicU32::new(0);

impl PoolId {
    /// Allocate the next unused pool identifier.
    pub(crate) fn next() -> Self {
        Self(NEXT_POOL_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw identifier value.
    #[inline]
    pub const fn id(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pool-{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_next() {
        // Given
        let gen0 = Generation::FIRST;

        // When
        let gen1 = gen0.next();
        let gen2 = gen1.next();

        // Then
        assert_eq!(gen0.0, 0);
        assert_eq!(gen1.0, 1);
        assert_eq!(gen2.0, 2);
        assert_eq!(Generation(u32::MAX).next(), Generation::FIRST);
    }

    #[test]
    fn pool_ids_are_unique() {
        let first = PoolId::next();
        let second = PoolId::next();
        assert_ne!(first, second);
    }

    #[test]
    fn slot_index_and_display() {
        let slot = Slot::from(42usize);
        assert_eq!(slot.index(), 42);
        assert_eq!(slot, Slot::new(42));
        assert_eq!(slot.to_string(), "#42");
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    #[should_panic(expected = "exceeds the pool limit")]
    fn slot_index_beyond_u32_is_fatal() {
        let _ = Slot::from(u32::MAX as usize + 1);
    }
}
