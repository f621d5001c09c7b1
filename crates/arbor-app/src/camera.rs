//! Camera component.

use arbor_ecs::{World, hooks};
use glam::{Affine2, Vec2};
use tracing::warn;

use crate::dispatch::on_draw;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Camera {
    /// Put the camera's pivot at the center of the surface instead of the
    /// top-left corner.
    pub centered: bool,
}

/// Construction function for a camera.
///
/// The camera is flagged so the default draw order runs it before anything
/// else; its draw callback sets the pass's view transform to the inverse of
/// its entity's world transform.
pub fn camera(centered: bool) -> impl FnOnce(&mut World) -> eyre::Result<Camera> + 'static {
    move |world: &mut World| {
        hooks::mark_camera(world)?;
        let entity = hooks::entity(world)?;

        on_draw(world, move |world, draw| {
            let centered = hooks::this::<Camera>(world)?.read().is_some_and(|camera| camera.centered);
            let Some(inverse) = arbor_spatial::try_inverse(arbor_spatial::world_matrix(world, entity)) else {
                warn!(%entity, "camera transform is singular; keeping previous view");
                return Ok(());
            };
            let anchor = if centered {
                draw.surface.size().as_vec2() * 0.5
            } else {
                Vec2::ZERO
            };
            draw.view = Affine2::from_translation(anchor) * inverse;
            Ok(())
        })?;

        Ok(Camera { centered })
    }
}
