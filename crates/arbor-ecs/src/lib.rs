#![allow(missing_docs)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::must_use_candidate)]

//! Arbor ECS - scene-graph kernel
//!
//! A tree of entities, each carrying components built from construction
//! functions. While a construction function or a lifecycle callback runs,
//! its component is the *current instance*; hook functions resolve their
//! target from it instead of taking it as an argument.
//!
//! # Key Concepts
//!
//! - **Entity**: a node in the scene tree with a name, parent, children and
//!   components
//! - **Component**: an instance created from a construction function; its
//!   return value is the payload, shared live through [`Component`]
//! - **Accumulator**: per-component ordered set of values registered under a
//!   purpose type (see [`Accumulate`])
//! - **Instance context**: the stack of active instances, entered with
//!   [`World::with_instance`]
//!
//! # Example
//!
//! ```ignore
//! use arbor_ecs::{World, hooks};
//!
//! let mut world = World::new();
//! let root = world.create_root(Some("root"), |world: &mut World| {
//!     hooks::on_enabled(world, |_| {
//!         tracing::info!("root enabled");
//!         Ok(())
//!     })?;
//!     hooks::create_child(world, Some("child"), |_world: &mut World| Ok(42_u32))?;
//!     Ok("root payload")
//! })?;
//! ```

pub mod accumulator;
pub mod component;
pub mod config;
pub mod context;
pub mod entity;
pub mod error;
pub mod hooks;
pub mod lifecycle;
pub mod shared;
mod world;

pub use accumulator::{Accumulate, Accumulator};
pub use component::{Component, ComponentFlags, ComponentHeader, ComponentKind, Construct, Surface};
pub use config::SceneConfig;
pub use entity::{ComponentId, Entity};
pub use error::{SceneError, SceneResult};
pub use lifecycle::{Boundary, ErrorBoundary, Lifecycle, OnDestroy, OnDisabled, OnEnabled, boundary, lifecycle};
pub use shared::{Callback, Shared};
pub use world::World;

/// Prelude for common imports.
pub mod prelude {
    pub use crate::{
        Accumulate, Component, ComponentId, Entity, SceneError, SceneResult, Shared, Surface, World,
        hooks,
    };
}
