//! Scene error types.

use thiserror::Error;

use crate::entity::{ComponentId, Entity};

/// Structural and hook-misuse failures raised by the scene kernel.
///
/// Construction failures are not represented here: they are `eyre::Report`s
/// produced by user code and routed to error boundaries.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// A hook function ran outside any `with_instance` region.
    #[error("no active component instance: hook called outside of a component")]
    NoActiveInstance,

    /// The entity has no parent and cannot be destroyed.
    #[error("cannot destroy root entity {0}")]
    CannotDestroyRoot(Entity),

    /// The entity handle refers to a destroyed entity.
    #[error("entity {0} is not alive")]
    StaleEntity(Entity),

    /// The component handle refers to a removed component.
    #[error("component {0} is not alive")]
    StaleComponent(ComponentId),

    /// The child already has a parent.
    #[error("entity {child} already has parent {parent}")]
    AlreadyParented {
        /// Entity being attached.
        child: Entity,
        /// Its current parent.
        parent: Entity,
    },

    /// The entity is not a child of the given parent.
    #[error("entity {child} is not a child of {parent}")]
    NotAChild {
        /// Entity being detached.
        child: Entity,
        /// Expected parent.
        parent: Entity,
    },

    /// Attaching would make an entity its own ancestor.
    #[error("attaching {child} under {parent} would create a cycle")]
    WouldCycle {
        /// Entity being attached.
        child: Entity,
        /// Requested parent.
        parent: Entity,
    },

    /// The component finished construction without a payload.
    #[error("component {0} has no payload (construction failed or payload type mismatch)")]
    MissingPayload(ComponentId),

    /// Deferred callbacks kept re-queueing themselves.
    #[error("deferred queue still busy after {0} rounds")]
    DeferredOverflow(usize),
}

/// Result type for scene operations.
pub type SceneResult<T> = Result<T, SceneError>;
