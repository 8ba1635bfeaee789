//! Mask queries over a pool: the System Runner.
//!
//! A query type names the components a pass needs, e.g. `(&Sprite, &mut Orientation)`. The
//! components it lists form the query's [`Mask`]; a pass visits every occupied slot whose mask is
//! a superset of it, in ascending slot order, and hands out references to exactly the requested
//! components.
//!
//! # Query types
//!
//! - `&C`: shared access to component `C`
//! - `&mut C`: exclusive access to component `C`
//! - `()`: no components; matches every occupied slot
//! - tuples of the above, up to 12 elements
//!
//! Only queries made of `&C` (and tuples of them) are [`ReadOnlyQuery`], and only those can run
//! through a shared [`View`](crate::ecs::View).
//!
//! # Usage
//!
//! ```rust,ignore
//! pool.run_system::<(&Agent, &mut Orientation), _>(|slot, (agent, orientation)| {
//!     orientation.translate(agent.velocity);
//! });
//!
//! let visible = pool
//!     .query::<(&Label, &Orientation)>()
//!     .filter(|(_, (_, o))| o.position().squared_norm() < 25.0)
//!     .count();
//! ```
//!
//! # Safety and validation
//!
//! Requesting the same component twice (e.g. `(&Foo, &mut Foo)`) panics when the pass starts,
//! since it would alias a column.
//!
//! Each query hands out references derived from column base pointers. Soundness rests on three
//! facts: the pass holds the pool borrowed for as long as any item lives, each item of one pass
//! refers to a distinct slot, and no column is requested twice.

mod data;
mod param;
mod result;

use log::error;

pub use result::QueryIter;

use crate::ecs::{
    component::{Mask, Registry},
    storage::AnyColumn,
};

/// One component access requested by a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Access {
    /// The registry index of the component.
    pub index: usize,
    /// Whether the component is borrowed mutably.
    pub mutable: bool,
}

impl Access {
    #[inline]
    pub const fn read(index: usize) -> Self {
        Self {
            index,
            mutable: false,
        }
    }

    #[inline]
    pub const fn write(index: usize) -> Self {
        Self {
            index,
            mutable: true,
        }
    }
}

/// A set of components to fetch for each visited slot.
///
/// # Safety
///
/// Implementors must report through [`Query::access`] every column [`Query::state`] takes a
/// pointer into, with the right mutability, and [`Query::fetch`] must only dereference those
/// pointers at the given slot.
pub unsafe trait Query<R: Registry> {
    /// The value handed to a system for one slot.
    type Item<'p>;

    /// Column base pointers captured at the start of a pass.
    type State: Copy;

    /// Append the component accesses of this query.
    fn access(accesses: &mut Vec<Access>);

    /// Capture the column pointers for a pass over exclusively borrowed columns.
    fn state(columns: &mut [Box<dyn AnyColumn>]) -> Self::State;

    /// Fetch the item for `slot`.
    ///
    /// # Safety
    ///
    /// `slot` must be within the columns `state` was captured from, those columns must not have
    /// been resized since, and no other live item may refer to the same slot mutably.
    unsafe fn fetch<'p>(state: Self::State, slot: usize) -> Self::Item<'p>;
}

/// A query that only needs shared access.
///
/// # Safety
///
/// Implementors must not produce mutable references from state captured through
/// [`ReadOnlyQuery::state_shared`].
pub unsafe trait ReadOnlyQuery<R: Registry>: Query<R> {
    /// Capture the column pointers for a pass over shared columns.
    fn state_shared(columns: &[Box<dyn AnyColumn>]) -> Self::State;
}

/// The mask of components `Q` requires.
///
/// # Panics
///
/// Panics if `Q` requests a component more than once.
pub(crate) fn mask_of<R: Registry, Q: Query<R>>() -> Mask {
    let mut accesses = Vec::new();
    Q::access(&mut accesses);

    let mut mask = Mask::with_capacity(R::LEN);
    for access in accesses {
        if mask.contains(access.index) {
            let name = R::name(access.index);
            error!("query {} requests {name} twice", std::any::type_name::<Q>());
            panic!("query requests component {name} more than once");
        }
        mask.insert(access.index);
    }
    mask
}
