//! Scheduler hook functions.

use std::rc::Rc;

use arbor_ecs::{Callback, Component, Entity, Surface, World, hooks};
use tracing::trace;

use crate::error::{TickError, TickResult};
use crate::scheduler::{FrameCallbacks, FrameFn, FrameHandler, FrameInfo, FrameScheduler};

/// The scheduler component on the root of `entity`'s tree.
pub fn scheduler_of(world: &World, entity: Entity) -> TickResult<Component<FrameScheduler>> {
    let root = world.root_of(entity);
    world
        .find::<FrameScheduler>(root)
        .ok_or(TickError::NoScheduler(root))
}

/// The scheduler serving the current instance.
pub fn scheduler(world: &World) -> TickResult<Component<FrameScheduler>> {
    let owner = hooks::entity(world)?;
    scheduler_of(world, owner)
}

/// Run `f` on every frame while the current instance is enabled.
///
/// Registration happens on the enable transition, once the entity is
/// connected to its root, and is withdrawn on disable.
pub fn on_frame<F>(world: &mut World, f: F) -> TickResult<()>
where
    F: Fn(&mut World, FrameInfo) -> eyre::Result<()> + 'static,
{
    let owner = hooks::current(world)?;
    let rc: Rc<FrameFn> = Rc::new(f);
    let callback = Callback::from_rc(rc);
    let handler = FrameHandler { owner, callback };

    let attach = handler.clone();
    hooks::on_enabled(world, move |world| {
        attach_handler(world, &attach)?;
        Ok(())
    })?;

    let detach = handler.clone();
    hooks::on_disabled(world, move |world| {
        let owner_entity = world.component_entity(detach.owner)?;
        if let Ok(scheduler) = scheduler_of(world, owner_entity) {
            world
                .accumulator::<FrameCallbacks>(scheduler.id())?
                .remove(&detach);
        }
        Ok(())
    })?;

    if world.is_component_enabled(owner) {
        attach_handler(world, &handler)?;
    }
    Ok(())
}

fn attach_handler(world: &mut World, handler: &FrameHandler) -> TickResult<()> {
    let owner_entity = world.component_entity(handler.owner)?;
    let scheduler = scheduler_of(world, owner_entity)?;
    let added = world
        .accumulator::<FrameCallbacks>(scheduler.id())?
        .add(handler.clone());
    trace!(component = %handler.owner, added, "frame handler attached");
    Ok(())
}

/// Pause the current tree's scheduler.
pub fn pause(world: &World) -> TickResult<()> {
    if let Some(shared) = scheduler(world)?.data() {
        shared.write().pause();
    }
    Ok(())
}

/// Resume the current tree's scheduler.
pub fn resume(world: &World) -> TickResult<()> {
    if let Some(shared) = scheduler(world)?.data() {
        shared.write().resume();
    }
    Ok(())
}

/// Run one synthetic tick on the current tree's scheduler.
pub fn step(world: &mut World) -> TickResult<FrameInfo> {
    let id = scheduler(world)?.id();
    FrameScheduler::step(world, id)
}

#[cfg(test)]
mod tests {
    use arbor_ecs::{SceneError, Shared};

    use super::*;
    use crate::clock::ManualClock;
    use crate::config::TickConfig;
    use crate::scheduler::frame_scheduler;

    #[test]
    fn test_on_frame_outside_component_fails() {
        let mut world = World::new();
        let result = on_frame(&mut world, |_, _| Ok(()));
        assert_eq!(result, Err(TickError::Scene(SceneError::NoActiveInstance)));
    }

    #[test]
    fn test_missing_scheduler_is_reported() {
        let mut world = World::new();
        let root = world.create_root(None, |_world: &mut World| Ok(())).unwrap();
        assert_eq!(
            scheduler_of(&world, root.entity()).map(|c| c.id()),
            Err(TickError::NoScheduler(root.entity()))
        );
    }

    #[test]
    fn test_disable_withdraws_registration() {
        let clock = ManualClock::new();
        let mut world = World::new();
        let root = world
            .create_root(None, frame_scheduler(clock.clone(), TickConfig::default()))
            .unwrap();
        let calls = Shared::new(0_u32);
        let sink = calls.clone();

        let child = world
            .create_child(root.entity(), None, move |world: &mut World| {
                on_frame(world, move |_, _| {
                    *sink.write() += 1;
                    Ok(())
                })?;
                Ok(())
            })
            .unwrap();

        assert_eq!(world.snapshot::<FrameCallbacks>(root.id()).len(), 1);

        world.disable(child.entity()).unwrap();
        assert!(world.snapshot::<FrameCallbacks>(root.id()).is_empty());

        let (request, timestamp) = clock.advance(16.0).unwrap();
        FrameScheduler::run_frame(&mut world, root.id(), request, timestamp).unwrap();
        assert_eq!(calls.get(), 0);

        world.enable(child.entity()).unwrap();
        assert_eq!(world.snapshot::<FrameCallbacks>(root.id()).len(), 1);
    }

    #[test]
    fn test_callbacks_run_in_registration_order() {
        let clock = ManualClock::new();
        let mut world = World::new();
        let root = world
            .create_root(None, frame_scheduler(clock.clone(), TickConfig::default()))
            .unwrap();
        let order = Shared::new(Vec::new());

        for label in ["first", "second", "third"] {
            let sink = order.clone();
            world
                .create_child(root.entity(), Some(label), move |world: &mut World| {
                    on_frame(world, move |_, _| {
                        sink.write().push(label);
                        Ok(())
                    })?;
                    Ok(())
                })
                .unwrap();
        }

        assert!(step(&mut world).is_err());
        world.with_instance(root.id(), |world| step(world)).unwrap();

        assert_eq!(*order.read(), vec!["first", "second", "third"]);
    }
}
