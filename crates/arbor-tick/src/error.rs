//! Scheduler error types.

use arbor_ecs::{Entity, SceneError};
use thiserror::Error;

/// Failures raised by the frame scheduler.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TickError {
    /// The tree rooted at this entity has no scheduler component.
    #[error("no frame scheduler on root entity {0}")]
    NoScheduler(Entity),

    /// Underlying scene failure.
    #[error(transparent)]
    Scene(#[from] SceneError),
}

/// Result type for scheduler operations.
pub type TickResult<T> = Result<T, TickError>;
