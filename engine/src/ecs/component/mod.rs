//! Component types and the closed component registry.
//!
//! Components are plain data attached to entities. A pool is parameterised over a [`Registry`]:
//! a fixed, ordered list of component types declared once with [`register_components!`]. The
//! declaration order defines each component's dense index, which is both its column position in
//! the pool and its bit position in a [`Mask`].
//!
//! ## Build-time checks
//!
//! Membership in a registry is expressed as the trait bound [`Registered<R>`]. Asking a pool for
//! a component type that was never registered, or declaring an entity shape that uses one, does
//! not compile.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use forage_engine::{Component, register_components};
//!
//! #[derive(Component, Clone, Default)]
//! struct Label { kind: u32 }
//!
//! register_components!(pub Components { Label, CollisionBody, Orientation });
//!
//! assert_eq!(<Label as Registered<Components>>::INDEX, 0);
//! ```

mod mask;

pub use mask::Mask;

use crate::ecs::storage::AnyColumn;

/// A trait representing a component in the ECS.
///
/// Components are default-constructed in place when an entity is created and cloned when an
/// entity is copied, hence the `Default + Clone` bounds. Use `#[derive(Component)]` to
/// implement it.
pub trait Component: 'static + Sized + Default + Clone {}

/// A closed, ordered list of component types a pool is built over.
///
/// Implemented by the marker type generated by [`register_components!`]; there is no reason to
/// implement it by hand.
pub trait Registry: 'static {
    /// The number of registered component types.
    const LEN: usize;

    /// The component type names in registration order.
    fn names() -> &'static [&'static str];

    /// Construct one empty column per registered component, in registration order.
    fn columns() -> Vec<Box<dyn AnyColumn>>;

    /// The name of the component registered at `index`.
    #[inline]
    fn name(index: usize) -> &'static str {
        Self::names().get(index).copied().unwrap_or("<unregistered>")
    }
}

/// Marks a component type as a member of registry `R` at a dense index.
pub trait Registered<R: Registry>: Component {
    /// The registration position of this component in `R`.
    const INDEX: usize;
}

/// Declare a closed, ordered component registry.
///
/// Generates a unit marker struct implementing [`Registry`] and implements [`Registered`] for
/// each listed component with its position in the list. Listing a type twice fails to compile
/// with conflicting implementations.
///
/// ```rust,ignore
/// register_components!(pub Components { Label, CollisionBody, Orientation, Sprite });
/// ```
#[macro_export]
macro_rules! register_components {
    (@index $registry:ident; $index:expr; $head:ty $(, $tail:ty)*) => {
        impl $crate::ecs::component::Registered<$registry> for $head {
            const INDEX: usize = $index;
        }
        $crate::register_components!(@index $registry; $index + 1usize; $($tail),*);
    };
    (@index $registry:ident; $index:expr;) => {};
    ($vis:vis $registry:ident { $($component:ty),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis struct $registry;

        impl $crate::ecs::component::Registry for $registry {
            const LEN: usize = $crate::count!($($component),+);

            fn names() -> &'static [&'static str] {
                &[$(stringify!($component)),+]
            }

            fn columns() -> ::std::vec::Vec<::std::boxed::Box<dyn $crate::ecs::storage::AnyColumn>> {
                ::std::vec![$($crate::ecs::storage::Column::<$component>::boxed()),+]
            }
        }

        $crate::register_components!(@index $registry; 0usize; $($component),+);
    };
}
