//! Transform composition.
//!
//! Matrices are recomputed from the attribute components on every call,
//! so a change anywhere on the ancestor chain is reflected immediately.
//!
//! ```text
//! local = T(position) * R(rotation) * S(scale) * T(-origin)
//! world = local(root) * ... * local(parent) * local(entity)
//! draw  = world * T(-shape / 2), translation rounded unless opted out
//! ```

use arbor_ecs::{Entity, World};
use glam::{Affine2, Vec2};
use tracing::trace;

use crate::attributes::{Origin, Position, Rotation, Scale, Shape};

fn attribute<P: Copy + Default + 'static>(world: &World, entity: Entity) -> P {
    world
        .find::<P>(entity)
        .and_then(|component| component.read().map(|value| *value))
        .unwrap_or_default()
}

/// The entity's own transform; identity when it carries no attributes.
#[must_use]
pub fn local_matrix(world: &World, entity: Entity) -> Affine2 {
    let Position(position) = attribute(world, entity);
    let Rotation(angle) = attribute(world, entity);
    let Scale(scale) = attribute(world, entity);
    let Origin(origin) = attribute(world, entity);

    Affine2::from_scale_angle_translation(scale, angle, position) * Affine2::from_translation(-origin)
}

/// Product of every ancestor's local transform, root first.
#[must_use]
pub fn parent_matrix(world: &World, entity: Entity) -> Affine2 {
    world
        .ancestors(entity)
        .iter()
        .rev()
        .fold(Affine2::IDENTITY, |acc, &ancestor| acc * local_matrix(world, ancestor))
}

/// Local-to-world transform of `entity`.
#[must_use]
pub fn world_matrix(world: &World, entity: Entity) -> Affine2 {
    parent_matrix(world, entity) * local_matrix(world, entity)
}

/// Transform handed to draw callbacks: top-left of the shape at (0, 0).
///
/// With `round` the translation snaps to whole pixels.
#[must_use]
pub fn draw_matrix(world: &World, entity: Entity, round: bool) -> Affine2 {
    let Shape(extent) = attribute(world, entity);
    let mut matrix = world_matrix(world, entity) * Affine2::from_translation(-extent * 0.5);
    if round {
        matrix.translation = matrix.translation.round();
    }
    matrix
}

/// World-space location of the entity's pivot.
#[must_use]
pub fn world_position(world: &World, entity: Entity) -> Vec2 {
    let Position(position) = attribute(world, entity);
    parent_matrix(world, entity).transform_point2(position)
}

/// Inverse of `matrix`, or `None` when it is singular.
#[must_use]
pub fn try_inverse(matrix: Affine2) -> Option<Affine2> {
    let determinant = matrix.matrix2.determinant();
    if determinant == 0.0 || !determinant.is_finite() {
        return None;
    }
    Some(matrix.inverse())
}

/// Map a world-space point into `entity`'s local space.
#[must_use]
pub fn to_local(world: &World, entity: Entity, point: Vec2) -> Option<Vec2> {
    let Some(inverse) = try_inverse(world_matrix(world, entity)) else {
        trace!(?entity, "singular world transform");
        return None;
    };
    Some(inverse.transform_point2(point))
}

/// Whether a world-space point falls inside the entity's shape.
///
/// Entities without a shape, or with a singular transform, never hit.
#[must_use]
pub fn hit_test(world: &World, entity: Entity, point: Vec2) -> bool {
    let Some(shape) = world.find::<Shape>(entity).and_then(|c| c.read().map(|s| *s)) else {
        return false;
    };
    to_local(world, entity, point).is_some_and(|local| shape.contains_local(local))
}
