use crate::ecs::{
    component::Registry,
    query::{Access, Query, ReadOnlyQuery},
    storage::AnyColumn,
};

/// The empty query fetches nothing and matches every occupied slot.
unsafe impl<R: Registry> Query<R> for () {
    type Item<'p> = ();
    type State = ();

    #[inline]
    fn access(_accesses: &mut Vec<Access>) {}

    #[inline]
    fn state(_columns: &mut [Box<dyn AnyColumn>]) -> Self::State {}

    #[inline]
    unsafe fn fetch<'p>(_state: Self::State, _slot: usize) -> Self::Item<'p> {}
}

unsafe impl<R: Registry> ReadOnlyQuery<R> for () {
    #[inline]
    fn state_shared(_columns: &[Box<dyn AnyColumn>]) -> Self::State {}
}

/// Implement [`Query`] and [`ReadOnlyQuery`] for a tuple of queries.
macro_rules! tuple_query_impl {
    ($($name: ident),*) => {
        #[allow(non_snake_case)]
        unsafe impl<R: Registry, $($name: Query<R>),*> Query<R> for ($($name,)*) {
            type Item<'p> = ($(<$name as Query<R>>::Item<'p>,)*);
            type State = ($(<$name as Query<R>>::State,)*);

            #[inline]
            fn access(accesses: &mut Vec<Access>) {
                $(<$name as Query<R>>::access(accesses);)*
            }

            #[inline]
            fn state(columns: &mut [Box<dyn AnyColumn>]) -> Self::State {
                ($(<$name as Query<R>>::state(columns),)*)
            }

            #[inline]
            unsafe fn fetch<'p>(state: Self::State, slot: usize) -> Self::Item<'p> {
                let ($($name,)*) = state;
                // SAFETY: forwarded from the caller; duplicate columns are rejected before a
                // pass starts.
                unsafe { ($(<$name as Query<R>>::fetch($name, slot),)*) }
            }
        }

        #[allow(non_snake_case)]
        unsafe impl<R: Registry, $($name: ReadOnlyQuery<R>),*> ReadOnlyQuery<R> for ($($name,)*) {
            #[inline]
            fn state_shared(columns: &[Box<dyn AnyColumn>]) -> Self::State {
                ($(<$name as ReadOnlyQuery<R>>::state_shared(columns),)*)
            }
        }
    }
}

crate::all_tuples!(tuple_query_impl);

#[cfg(test)]
mod tests {
    use crate::ecs::{
        component::tests::{Name, Position, TestComponents, Velocity},
        entity::tests::{Plant, Walker},
        storage::Pool,
    };

    #[test]
    fn tuple_queries_fetch_each_component() {
        // Given
        let mut pool = Pool::<TestComponents>::new();
        let walker = pool.create_entity::<Walker>();
        let _plant = pool.create_entity::<Plant>();
        walker.component_mut::<Velocity>(&mut pool).dy = -1.0;

        // When
        let mut visited = 0;
        pool.run_system::<(&Name, (&mut Position, &Velocity)), _>(
            |_, (name, (position, velocity))| {
                position.y += velocity.dy;
                assert!(name.0.is_empty());
                visited += 1;
            },
        );

        // Then
        assert_eq!(visited, 1);
        assert_eq!(walker.component::<Position>(&pool).y, -1.0);
    }

    #[test]
    fn wide_tuple_is_a_query() {
        let mut pool = Pool::<TestComponents>::new();
        let _walker = pool.create_entity::<Walker>();
        let count = pool
            .view()
            .query::<(&Position, &Velocity, &Name, ())>()
            .count();
        assert_eq!(count, 1);
    }
}
