#![allow(clippy::module_name_repetitions)]
#![allow(clippy::float_cmp)]

//! Arbor Spatial - 2D transforms along the entity tree.
//!
//! Position, origin, rotation, scale and shape are plain components looked
//! up by payload type. [`transform`] composes them through the ancestor
//! chain into world and draw matrices and inverts them for hit-testing.

pub mod attributes;
pub mod transform;

pub use attributes::{Origin, Position, Rotation, Scale, Shape, origin, position, rotation, scale, shape};
pub use transform::{
    draw_matrix, hit_test, local_matrix, parent_matrix, to_local, try_inverse, world_matrix, world_position,
};
