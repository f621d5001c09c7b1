//! Hook functions.
//!
//! Every function here acts on the current instance, i.e. the component
//! whose construction function or callback is executing. Called outside any
//! instance region they fail with [`SceneError::NoActiveInstance`].

use crate::accumulator::Accumulate;
use crate::component::{Component, ComponentFlags};
use crate::entity::{ComponentId, Entity};
use crate::error::{SceneError, SceneResult};
use crate::lifecycle::{ErrorBoundary, OnDestroy, OnDisabled, OnEnabled, boundary, lifecycle};
use crate::world::World;

/// The current instance.
pub fn current(world: &World) -> SceneResult<ComponentId> {
    world.current_instance()
}

/// The entity owning the current instance.
pub fn entity(world: &World) -> SceneResult<Entity> {
    world.current_entity()
}

/// Register `value` under purpose `K` on the current instance.
///
/// Returns `false` if an equal value was already registered.
pub fn accumulate<K: Accumulate>(world: &mut World, value: K::Value) -> SceneResult<bool> {
    let id = world.current_instance()?;
    Ok(world.accumulator::<K>(id)?.add(value))
}

/// Run `f` every time the current instance becomes enabled.
pub fn on_enabled<F>(world: &mut World, f: F) -> SceneResult<()>
where
    F: Fn(&mut World) -> eyre::Result<()> + 'static,
{
    accumulate::<OnEnabled>(world, lifecycle(f)).map(drop)
}

/// Run `f` every time the current instance becomes disabled.
pub fn on_disabled<F>(world: &mut World, f: F) -> SceneResult<()>
where
    F: Fn(&mut World) -> eyre::Result<()> + 'static,
{
    accumulate::<OnDisabled>(world, lifecycle(f)).map(drop)
}

/// Run `f` when the current instance is destroyed.
pub fn on_destroy<F>(world: &mut World, f: F) -> SceneResult<()>
where
    F: Fn(&mut World) -> eyre::Result<()> + 'static,
{
    accumulate::<OnDestroy>(world, lifecycle(f)).map(drop)
}

/// Handle construction failures of this entity's other components and of
/// every descendant.
pub fn error_boundary<F>(world: &mut World, f: F) -> SceneResult<()>
where
    F: Fn(&mut World, eyre::Report) -> eyre::Result<()> + 'static,
{
    accumulate::<ErrorBoundary>(world, boundary(f)).map(drop)
}

/// Create a child entity of the current entity with one component.
pub fn create_child<P, F>(world: &mut World, name: Option<&str>, construct: F) -> SceneResult<Component<P>>
where
    P: 'static,
    F: FnOnce(&mut World) -> eyre::Result<P> + 'static,
{
    let parent = world.current_entity()?;
    world.create_child(parent, name, construct)
}

/// Attach another component to the current entity.
pub fn attach<P, F>(world: &mut World, construct: F) -> SceneResult<Component<P>>
where
    P: 'static,
    F: FnOnce(&mut World) -> eyre::Result<P> + 'static,
{
    let owner = world.current_entity()?;
    world.add_component(owner, construct)
}

/// Look up a sibling component of the current entity by payload type.
pub fn sibling<P: 'static>(world: &World) -> SceneResult<Option<Component<P>>> {
    let owner = world.current_entity()?;
    Ok(world.find::<P>(owner))
}

/// Nearest ancestor-or-self component with payload `P`.
pub fn context<P: 'static>(world: &World) -> SceneResult<Option<Component<P>>> {
    let mut cursor = Some(world.current_entity()?);
    while let Some(current) = cursor {
        if let Some(found) = world.find::<P>(current) {
            return Ok(Some(found));
        }
        cursor = world.parent(current);
    }
    Ok(None)
}

/// Surface of the current instance with its payload viewed as `P`.
///
/// Inside the construction function the payload does not exist yet, so the
/// returned surface has no data there.
pub fn this<P: 'static>(world: &World) -> SceneResult<Component<P>> {
    let id = world.current_instance()?;
    world.component(id)
}

/// Run `f` after the current outermost operation finishes, inside the
/// current instance's region.
pub fn defer<F>(world: &mut World, f: F) -> SceneResult<()>
where
    F: Fn(&mut World) -> eyre::Result<()> + 'static,
{
    let id = world.current_instance()?;
    world.defer(id, lifecycle(f));
    Ok(())
}

/// Capture the current instance so `f` can later run inside its region.
///
/// The returned closure is what event listeners and timers registered from
/// inside a component should call.
pub fn bind<F, A, R>(world: &World, f: F) -> SceneResult<impl Fn(&mut World, A) -> R + 'static>
where
    F: Fn(&mut World, A) -> R + 'static,
    A: 'static,
    R: 'static,
{
    let id = world.current_instance()?;
    Ok(move |world: &mut World, arg: A| world.with_instance(id, |world| f(world, arg)))
}

/// Destroy the entity owning the current instance.
pub fn destroy_self(world: &mut World) -> SceneResult<()> {
    let owner = world.current_entity()?;
    world.destroy(owner)
}

/// Flag the current instance as a camera for the default draw order.
pub fn mark_camera(world: &mut World) -> SceneResult<()> {
    let id = world.current_instance()?;
    world.set_flag(id, ComponentFlags::CAMERA, true)
}

/// Like [`current`] but maps a missing region to a message naming `hook`.
pub fn require(world: &World, hook: &'static str) -> eyre::Result<ComponentId> {
    world.current_instance().map_err(|err| match err {
        SceneError::NoActiveInstance => eyre::eyre!("{hook} called outside a component"),
        other => other.into(),
    })
}
