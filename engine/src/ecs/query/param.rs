use std::ptr::NonNull;

use crate::ecs::{
    component::{Registered, Registry},
    query::{Access, Query, ReadOnlyQuery},
    storage::{AnyColumn, column},
};

/// Shared access to one component.
unsafe impl<R: Registry, C: Registered<R>> Query<R> for &C {
    type Item<'p> = &'p C;
    type State = NonNull<C>;

    #[inline]
    fn access(accesses: &mut Vec<Access>) {
        accesses.push(Access::read(C::INDEX));
    }

    #[inline]
    fn state(columns: &mut [Box<dyn AnyColumn>]) -> Self::State {
        column::typed::<C>(columns, C::INDEX).base_ptr_shared()
    }

    #[inline]
    unsafe fn fetch<'p>(state: Self::State, slot: usize) -> Self::Item<'p> {
        // SAFETY: the caller guarantees `slot` is in bounds of the captured column.
        unsafe { state.add(slot).as_ref() }
    }
}

unsafe impl<R: Registry, C: Registered<R>> ReadOnlyQuery<R> for &C {
    #[inline]
    fn state_shared(columns: &[Box<dyn AnyColumn>]) -> Self::State {
        column::typed::<C>(columns, C::INDEX).base_ptr_shared()
    }
}

/// Exclusive access to one component.
unsafe impl<R: Registry, C: Registered<R>> Query<R> for &mut C {
    type Item<'p> = &'p mut C;
    type State = NonNull<C>;

    #[inline]
    fn access(accesses: &mut Vec<Access>) {
        accesses.push(Access::write(C::INDEX));
    }

    #[inline]
    fn state(columns: &mut [Box<dyn AnyColumn>]) -> Self::State {
        column::typed_mut::<C>(columns, C::INDEX).base_ptr()
    }

    #[inline]
    unsafe fn fetch<'p>(state: Self::State, slot: usize) -> Self::Item<'p> {
        // SAFETY: the caller guarantees `slot` is in bounds and not borrowed elsewhere.
        unsafe { state.add(slot).as_mut() }
    }
}
