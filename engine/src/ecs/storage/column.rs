//! Densely packed, type-erased component columns.
//!
//! Each registered component type owns one [`Column`]: a `Vec<C>` indexed by slot. The pool keeps
//! the columns behind the [`AnyColumn`] trait object so it can grow, reset and copy slots for any
//! entity shape without static knowledge of which components that shape declares.

use std::{any::Any, ptr::NonNull};

use log::error;

use crate::ecs::component::Component;

/// Type-erased operations the pool performs on a component column.
pub trait AnyColumn: Any {
    /// The number of slots in this column.
    fn len(&self) -> usize;

    /// Grow (or shrink) the column to `len` slots, filling new slots with `Default`.
    fn resize(&mut self, len: usize);

    /// Reset a slot to the component's `Default` value.
    fn reset(&mut self, slot: usize);

    /// Clone the value in slot `from` into slot `to`.
    fn copy(&mut self, from: usize, to: usize);

    /// Access the concrete column for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Mutably access the concrete column for downcasting.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Storage for every value of a single component type, one element per pool slot.
#[derive(Debug, Default)]
pub struct Column<C: Component> {
    values: Vec<C>,
}

impl<C: Component> Column<C> {
    /// Construct an empty, boxed column ready to be placed in a pool.
    pub fn boxed() -> Box<dyn AnyColumn> {
        Box::new(Self { values: Vec::new() })
    }

    /// The values of this column as a slice indexed by slot.
    #[inline]
    pub fn values(&self) -> &[C] {
        &self.values
    }

    /// The values of this column as a mutable slice indexed by slot.
    #[inline]
    pub fn values_mut(&mut self) -> &mut [C] {
        &mut self.values
    }

    /// Base pointer of the column, used by queries to hand out references to distinct slots.
    #[inline]
    pub(crate) fn base_ptr(&mut self) -> NonNull<C> {
        // A Vec's pointer is never null, even when empty.
        NonNull::new(self.values.as_mut_ptr()).unwrap_or(NonNull::dangling())
    }

    /// Read-only base pointer of the column. Must only be used to create shared references.
    #[inline]
    pub(crate) fn base_ptr_shared(&self) -> NonNull<C> {
        NonNull::new(self.values.as_ptr().cast_mut()).unwrap_or(NonNull::dangling())
    }
}

impl<C: Component> AnyColumn for Column<C> {
    #[inline]
    fn len(&self) -> usize {
        self.values.len()
    }

    fn resize(&mut self, len: usize) {
        self.values.resize_with(len, C::default);
    }

    #[inline]
    fn reset(&mut self, slot: usize) {
        self.values[slot] = C::default();
    }

    #[inline]
    fn copy(&mut self, from: usize, to: usize) {
        if from != to {
            self.values[to] = self.values[from].clone();
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Look up the typed column registered at `index`.
///
/// # Panics
///
/// Panics if the column at `index` does not store `C`. Registries build their columns in the same
/// order they assign indices, so a mismatch means the registry itself is corrupt.
pub(crate) fn typed<C: Component>(columns: &[Box<dyn AnyColumn>], index: usize) -> &Column<C> {
    match columns.get(index).and_then(|c| c.as_any().downcast_ref::<Column<C>>()) {
        Some(column) => column,
        None => mismatch::<C>(index),
    }
}

/// Mutable variant of [`typed`].
///
/// # Panics
///
/// Panics under the same conditions as [`typed`].
pub(crate) fn typed_mut<C: Component>(
    columns: &mut [Box<dyn AnyColumn>],
    index: usize,
) -> &mut Column<C> {
    match columns
        .get_mut(index)
        .and_then(|c| c.as_any_mut().downcast_mut::<Column<C>>())
    {
        Some(column) => column,
        None => mismatch::<C>(index),
    }
}

#[cold]
fn mismatch<C: Component>(index: usize) -> ! {
    let name = std::any::type_name::<C>();
    error!("column {index} does not store {name}");
    panic!("component registry corrupt: column {index} does not store {name}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::component::tests::{Name, Position};

    fn downcast(column: &dyn AnyColumn) -> &Column<Name> {
        column.as_any().downcast_ref::<Column<Name>>().unwrap()
    }

    #[test]
    fn resize_fills_with_default() {
        // Given
        let mut column = Column::<Position>::boxed();

        // When
        column.resize(4);

        // Then
        assert_eq!(column.len(), 4);
        let typed = column.as_any().downcast_ref::<Column<Position>>().unwrap();
        assert!(typed.values().iter().all(|p| *p == Position::default()));
    }

    #[test]
    fn copy_clones_between_slots() {
        // Given
        let mut column = Column::<Name>::boxed();
        column.resize(3);
        column.as_any_mut().downcast_mut::<Column<Name>>().unwrap().values_mut()[0] =
            Name("npc".into());

        // When
        column.copy(0, 2);
        column.copy(1, 1);

        // Then
        assert_eq!(downcast(column.as_ref()).values()[2], Name("npc".into()));
        assert_eq!(downcast(column.as_ref()).values()[0], Name("npc".into()));
    }

    #[test]
    fn reset_restores_default() {
        // Given
        let mut column = Column::<Name>::boxed();
        column.resize(1);
        column.as_any_mut().downcast_mut::<Column<Name>>().unwrap().values_mut()[0] =
            Name("stale".into());

        // When
        column.reset(0);

        // Then
        assert_eq!(downcast(column.as_ref()).values()[0], Name::default());
    }

    #[test]
    fn wrong_downcast_fails() {
        let column = Column::<Name>::boxed();
        assert!(column.as_any().downcast_ref::<Column<Position>>().is_none());
    }

    #[test]
    fn typed_lookup_by_index() {
        // Given
        let mut columns = vec![Column::<Position>::boxed(), Column::<Name>::boxed()];
        columns[1].resize(1);

        // When
        typed_mut::<Name>(&mut columns, 1).values_mut()[0] = Name("food".into());

        // Then
        assert_eq!(typed::<Name>(&columns, 1).values(), &[Name("food".into())]);
        assert!(typed::<Position>(&columns, 0).values().is_empty());
    }

    #[test]
    #[should_panic(expected = "component registry corrupt")]
    fn typed_lookup_panics_on_mismatch() {
        let columns = vec![Column::<Position>::boxed()];
        typed::<Name>(&columns, 0);
    }
}
