use thiserror::Error;

use crate::ecs::storage::{PoolId, Slot};

/// Recoverable failures when accessing a pool through a handle or reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PoolError {
    /// The handle was default-constructed or taken from and owns no slot.
    #[error("entity handle is empty")]
    EmptyHandle,

    /// The handle was issued by a different pool.
    #[error("entity belongs to {handle}, not {pool}")]
    ForeignPool { handle: PoolId, pool: PoolId },

    /// The slot has been freed (and possibly reused) since the handle was issued.
    #[error("entity at slot {slot} is no longer alive")]
    Stale { slot: Slot },

    /// The occupant of the slot does not carry the requested component.
    #[error("entity at slot {slot} has no {component} component")]
    MissingComponent {
        slot: Slot,
        component: &'static str,
    },
}
