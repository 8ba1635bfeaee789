//! Forage engine: a type-indexed component pool with owning entity handles, mask-based system
//! iteration, and a symmetric collision dispatch table for heterogeneous entity types.
//!
//! The crate is split into:
//!
//! - [`ecs`]: the type registry, the storage pool, entity handles and queries.
//! - [`collision`]: collision bodies, the dispatch table and the pairwise collision handler.
//! - [`math`]: the small 2D vector/matrix value types used by [`Orientation`](orientation::Orientation).
//! - [`orientation`]: the position/rotation/scale component shared by physics and rendering.
//! - [`core`]: the single-threaded simulation loop and the channel logger.

// Allows `::forage_engine::...` paths emitted by `forage_macros` to resolve inside this crate.
extern crate self as forage_engine;

pub mod collision;
pub mod core;
pub mod ecs;
pub mod math;
pub mod orientation;

pub use forage_macros::Component;
