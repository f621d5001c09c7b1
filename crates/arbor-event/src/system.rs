//! Input system component and replay.

use arbor_ecs::{Accumulate, Component, ComponentId, Entity, World};
use glam::UVec2;
use tracing::{error, trace};

use crate::error::{EventError, EventResult};
use crate::input::{InputEvent, InputQueue, KeyKind, PointerKind, RawInput, SurfaceMapping};
use crate::listener::{
    KeyDownListeners, KeyUpListeners, Listener, PointerDownListeners, PointerMoveListeners,
    PointerUpListeners,
};

/// Root-level input state: the buffered queue and the coordinate mapping.
#[derive(Debug, Default)]
pub struct InputSystem {
    queue: InputQueue,
    mapping: SurfaceMapping,
}

impl InputSystem {
    #[must_use]
    pub fn new(mapping: SurfaceMapping) -> Self {
        Self {
            queue: InputQueue::new(),
            mapping,
        }
    }

    /// Buffer one raw host event for the next replay.
    pub fn push(&mut self, raw: RawInput) {
        self.queue.push_raw(raw, &self.mapping);
    }

    #[must_use]
    pub const fn mapping(&self) -> &SurfaceMapping {
        &self.mapping
    }

    /// Update the mapping after the surface was resized or moved.
    pub fn set_mapping(&mut self, mapping: SurfaceMapping) {
        self.mapping = mapping;
    }

    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Replay every buffered event on the input component `input`.
    ///
    /// Returns the number of events replayed.
    pub fn replay(world: &mut World, input: ComponentId) -> EventResult<usize> {
        let events = world.payload::<Self>(input)?.write().queue.drain();
        let count = events.len();

        for event in events {
            match &event {
                InputEvent::Pointer(pointer) => match pointer.kind {
                    PointerKind::Move => deliver::<PointerMoveListeners, _>(world, input, pointer),
                    PointerKind::Down => deliver::<PointerDownListeners, _>(world, input, pointer),
                    PointerKind::Up => deliver::<PointerUpListeners, _>(world, input, pointer),
                },
                InputEvent::Key(key) => match key.kind {
                    KeyKind::Down => deliver::<KeyDownListeners, _>(world, input, key),
                    KeyKind::Up => deliver::<KeyUpListeners, _>(world, input, key),
                },
            }
        }

        if count > 0 {
            trace!(count, "replayed input");
        }
        Ok(count)
    }
}

fn deliver<K, E>(world: &mut World, input: ComponentId, event: &E)
where
    K: Accumulate<Value = Listener<E>>,
    E: core::fmt::Debug,
{
    for listener in world.snapshot::<K>(input) {
        if !world.is_component_alive(listener.owner) {
            continue;
        }
        let callback = listener.callback.clone();
        if let Err(err) = world.with_instance(listener.owner, |world| (*callback)(world, event)) {
            error!(component = %listener.owner, ?event, error = ?err, "input listener failed");
        }
    }
}

/// The input system component on the root of `entity`'s tree.
pub fn input_of(world: &World, entity: Entity) -> EventResult<Component<InputSystem>> {
    let root = world.root_of(entity);
    world
        .find::<InputSystem>(root)
        .ok_or(EventError::NoInputSystem(root))
}

/// Construction function for the input system component.
pub fn input_system(surface_size: UVec2) -> impl FnOnce(&mut World) -> eyre::Result<InputSystem> + 'static {
    move |_world| Ok(InputSystem::new(SurfaceMapping::identity(surface_size)))
}

#[cfg(test)]
mod tests {
    use arbor_ecs::{Shared, Surface};
    use glam::Vec2;

    use super::*;
    use crate::listener::{on_key_down, on_pointer_down, on_pointer_down_inside, on_pointer_move};

    fn mount() -> (World, Component<InputSystem>) {
        let mut world = World::new();
        let input = world
            .create_root(Some("root"), input_system(UVec2::new(100, 100)))
            .unwrap();
        (world, input)
    }

    fn push(input: &Component<InputSystem>, raw: RawInput) {
        input.write().unwrap().push(raw);
    }

    #[test]
    fn test_move_listeners_run_before_down_listeners() {
        let (mut world, input) = mount();
        let log = Shared::new(Vec::new());

        let l = log.clone();
        world
            .create_child(input.entity(), None, move |world: &mut World| {
                let down = l.clone();
                on_pointer_down(world, move |_, _| {
                    down.write().push("down");
                    Ok(())
                })?;
                let moved = l.clone();
                on_pointer_move(world, move |_, _| {
                    moved.write().push("move");
                    Ok(())
                })?;
                Ok(())
            })
            .unwrap();

        push(&input, RawInput::PointerDown { x: 1.0, y: 1.0, button: 0 });
        push(&input, RawInput::PointerMove { x: 1.0, y: 1.0 });
        let replayed = InputSystem::replay(&mut world, input.id()).unwrap();

        assert_eq!(replayed, 2);
        assert_eq!(*log.read(), vec!["move", "down"]);
    }

    #[test]
    fn test_listeners_run_as_owner() {
        let (mut world, input) = mount();
        let seen = Shared::new(None);
        let s = seen.clone();

        let child = world
            .create_child(input.entity(), None, move |world: &mut World| {
                on_key_down(world, move |world, key| {
                    *s.write() = Some((world.current_instance()?, key.key.clone()));
                    Ok(())
                })?;
                Ok(())
            })
            .unwrap();

        push(&input, RawInput::KeyDown { key: "Space".into(), repeat: false });
        InputSystem::replay(&mut world, input.id()).unwrap();

        assert_eq!(*seen.read(), Some((child.id(), "Space".to_owned())));
    }

    #[test]
    fn test_disabled_component_stops_listening() {
        let (mut world, input) = mount();
        let count = Shared::new(0_u32);
        let c = count.clone();

        let child = world
            .create_child(input.entity(), None, move |world: &mut World| {
                on_pointer_move(world, move |_, _| {
                    *c.write() += 1;
                    Ok(())
                })?;
                Ok(())
            })
            .unwrap();

        world.disable(child.entity()).unwrap();
        push(&input, RawInput::PointerMove { x: 0.0, y: 0.0 });
        InputSystem::replay(&mut world, input.id()).unwrap();

        assert_eq!(count.get(), 0);
        assert!(world.snapshot::<PointerMoveListeners>(input.id()).is_empty());
    }

    #[test]
    fn test_down_inside_hit_tests_shape() {
        let (mut world, input) = mount();
        let hits = Shared::new(Vec::new());
        let h = hits.clone();

        let button = world
            .create_child(input.entity(), Some("button"), arbor_spatial::position(50.0, 50.0))
            .unwrap();
        world.add_component(button.entity(), arbor_spatial::shape(20.0, 20.0)).unwrap();
        world
            .add_component(button.entity(), move |world: &mut World| {
                on_pointer_down_inside(world, move |_, _, local| {
                    h.write().push(local);
                    Ok(())
                })?;
                Ok(())
            })
            .unwrap();

        push(&input, RawInput::PointerDown { x: 55.0, y: 45.0, button: 0 });
        push(&input, RawInput::PointerDown { x: 5.0, y: 5.0, button: 0 });
        InputSystem::replay(&mut world, input.id()).unwrap();

        assert_eq!(*hits.read(), vec![Vec2::new(5.0, -5.0)]);
    }
}
