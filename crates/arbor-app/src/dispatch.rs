//! Update and draw dispatch.
//!
//! Both passes walk the tree from the root in pre-order, skipping disabled
//! subtrees, and consult each enabled component's [`UpdateCallbacks`] or
//! [`DrawCallbacks`]. Work is snapshotted before any callback runs, so a
//! callback that registers more callbacks or spawns entities affects the
//! next frame, not this one.

use std::rc::Rc;

use arbor_ecs::{Accumulate, Callback, ComponentId, Entity, World, hooks};
use arbor_tick::FrameInfo;
use glam::Affine2;
use tracing::error;

use crate::order::{DrawItem, DrawOrder};
use crate::surface::RenderSurface;

/// Timing seen by update callbacks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UpdateInfo {
    /// Clamped delta in milliseconds.
    pub delta_ms: f64,
    /// Raw scheduler delta in milliseconds.
    pub raw_delta_ms: f64,
    pub tick: u64,
}

impl UpdateInfo {
    /// Clamped delta in seconds.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn delta_secs(&self) -> f32 {
        (self.delta_ms / 1000.0) as f32
    }
}

/// State handed to each draw callback.
pub struct DrawFrame<'a> {
    pub surface: &'a mut dyn RenderSurface,
    /// View transform, set by camera draw callbacks and applied to every
    /// later item of the pass.
    pub view: Affine2,
    /// `view * draw matrix` of the entity being drawn; already applied to
    /// the surface.
    pub transform: Affine2,
    pub frame: FrameInfo,
}

pub type UpdateFn = dyn Fn(&mut World, UpdateInfo) -> eyre::Result<()>;
pub type DrawFn = dyn Fn(&mut World, &mut DrawFrame<'_>) -> eyre::Result<()>;

pub type UpdateCallback = Callback<UpdateFn>;
pub type DrawCallback = Callback<DrawFn>;

/// Per-frame update callbacks of a component.
pub struct UpdateCallbacks;

impl Accumulate for UpdateCallbacks {
    type Value = UpdateCallback;
}

/// Draw callbacks of a component.
pub struct DrawCallbacks;

impl Accumulate for DrawCallbacks {
    type Value = DrawCallback;
}

/// Run `f` on every frame update while the current instance is enabled.
pub fn on_update<F>(world: &mut World, f: F) -> arbor_ecs::SceneResult<UpdateCallback>
where
    F: Fn(&mut World, UpdateInfo) -> eyre::Result<()> + 'static,
{
    let rc: Rc<UpdateFn> = Rc::new(f);
    let callback = Callback::from_rc(rc);
    hooks::accumulate::<UpdateCallbacks>(world, callback.clone())?;
    Ok(callback)
}

/// Draw with `f` on every frame while the current instance is enabled.
pub fn on_draw<F>(world: &mut World, f: F) -> arbor_ecs::SceneResult<DrawCallback>
where
    F: Fn(&mut World, &mut DrawFrame<'_>) -> eyre::Result<()> + 'static,
{
    let rc: Rc<DrawFn> = Rc::new(f);
    let callback = Callback::from_rc(rc);
    hooks::accumulate::<DrawCallbacks>(world, callback.clone())?;
    Ok(callback)
}

/// Counters for one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PassStats {
    pub invoked: usize,
    pub failed: usize,
}

/// Enabled components of the enabled part of `root`'s tree, pre-order.
#[must_use]
pub fn enabled_components(world: &World, root: Entity) -> Vec<ComponentId> {
    let mut out = Vec::new();
    let mut pending = vec![root];
    while let Some(entity) = pending.pop() {
        if !world.is_enabled(entity) {
            continue;
        }
        out.extend(
            world
                .components_of(entity)
                .iter()
                .copied()
                .filter(|&id| world.is_component_enabled(id)),
        );
        pending.extend(world.children(entity).iter().rev().copied());
    }
    out
}

/// Invoke every update callback in the tree.
pub fn update_pass(world: &mut World, root: Entity, info: UpdateInfo) -> PassStats {
    let work: Vec<(ComponentId, Vec<UpdateCallback>)> = enabled_components(world, root)
        .into_iter()
        .filter(|&id| world.has_accumulated::<UpdateCallbacks>(id))
        .map(|id| (id, world.snapshot::<UpdateCallbacks>(id)))
        .collect();

    let mut stats = PassStats::default();
    for (id, callbacks) in work {
        for callback in callbacks {
            // an earlier callback may have disabled or destroyed this one
            if !world.is_component_enabled(id) {
                break;
            }
            stats.invoked += 1;
            if let Err(err) = world.with_instance(id, |world| (*callback)(world, info)) {
                stats.failed += 1;
                error!(component = %id, tick = info.tick, error = ?err, "update callback failed");
            }
        }
    }
    stats
}

/// Clear `surface` and invoke every draw callback in the tree, in `order`.
pub fn draw_pass(
    world: &mut World,
    root: Entity,
    surface: &mut dyn RenderSurface,
    order: &dyn DrawOrder,
    frame: FrameInfo,
    round: bool,
) -> PassStats {
    surface.clear();

    let mut items: Vec<DrawItem> = enabled_components(world, root)
        .into_iter()
        .filter(|&id| world.has_accumulated::<DrawCallbacks>(id))
        .filter_map(|id| DrawItem::of(world, id))
        .collect();
    order.sort(&mut items);

    let work: Vec<(DrawItem, Vec<DrawCallback>)> = items
        .into_iter()
        .map(|item| (item, world.snapshot::<DrawCallbacks>(item.component)))
        .collect();

    let mut stats = PassStats::default();
    let mut view = Affine2::IDENTITY;
    for (item, callbacks) in work {
        for callback in callbacks {
            if !world.is_component_enabled(item.component) {
                break;
            }
            let transform = view * arbor_spatial::draw_matrix(world, item.entity, round);
            surface.set_transform(transform);

            let mut draw = DrawFrame {
                surface: &mut *surface,
                view,
                transform,
                frame,
            };
            stats.invoked += 1;
            let result = world.with_instance(item.component, |world| (*callback)(world, &mut draw));
            view = draw.view;

            if let Err(err) = result {
                stats.failed += 1;
                error!(component = %item.component, tick = frame.tick, error = ?err, "draw callback failed");
            }
        }
    }
    stats
}
