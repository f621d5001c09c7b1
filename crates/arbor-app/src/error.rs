//! Runtime error types.

use arbor_ecs::SceneError;
use arbor_event::EventError;
use arbor_tick::TickError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AppError {
    /// The runtime has no mounted root yet.
    #[error("runtime is not mounted")]
    NotMounted,

    /// `mount` was called twice.
    #[error("runtime is already mounted")]
    AlreadyMounted,

    /// The runner's surface is in use by a draw pass already running.
    #[error("render surface is already borrowed by a running draw pass")]
    SurfaceBusy,

    #[error(transparent)]
    Scene(#[from] SceneError),

    #[error(transparent)]
    Tick(#[from] TickError),

    #[error(transparent)]
    Event(#[from] EventError),
}

pub type AppResult<T> = Result<T, AppError>;
