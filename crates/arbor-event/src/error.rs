//! Input error types.

use arbor_ecs::{Entity, SceneError};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EventError {
    /// The tree rooted at this entity has no input system component.
    #[error("no input system on root entity {0}")]
    NoInputSystem(Entity),

    #[error(transparent)]
    Scene(#[from] SceneError),
}

pub type EventResult<T> = Result<T, EventError>;
