//! Input listeners and their registration hooks.
//!
//! Listeners accumulate on the root's [`InputSystem`] component while their
//! owning component is enabled, and are withdrawn when it is disabled.

use std::rc::Rc;

use arbor_ecs::{Accumulate, Callback, ComponentId, Surface, World, hooks};
use glam::Vec2;

use crate::error::EventResult;
use crate::input::{KeyEvent, PointerEvent};
use crate::system::input_of;

/// Signature of a listener for events of type `E`.
pub type ListenerFn<E> = dyn Fn(&mut World, &E) -> eyre::Result<()>;

/// A listener callback together with the instance it runs as.
pub struct Listener<E> {
    pub owner: ComponentId,
    pub callback: Callback<ListenerFn<E>>,
}

impl<E> Clone for Listener<E> {
    fn clone(&self) -> Self {
        Self {
            owner: self.owner,
            callback: self.callback.clone(),
        }
    }
}

impl<E> PartialEq for Listener<E> {
    fn eq(&self, other: &Self) -> bool {
        self.owner == other.owner && self.callback == other.callback
    }
}

impl<E> core::fmt::Debug for Listener<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Listener")
            .field("owner", &self.owner)
            .field("callback", &self.callback)
            .finish()
    }
}

pub struct PointerMoveListeners;
impl Accumulate for PointerMoveListeners {
    type Value = Listener<PointerEvent>;
}

pub struct PointerDownListeners;
impl Accumulate for PointerDownListeners {
    type Value = Listener<PointerEvent>;
}

pub struct PointerUpListeners;
impl Accumulate for PointerUpListeners {
    type Value = Listener<PointerEvent>;
}

pub struct KeyDownListeners;
impl Accumulate for KeyDownListeners {
    type Value = Listener<KeyEvent>;
}

pub struct KeyUpListeners;
impl Accumulate for KeyUpListeners {
    type Value = Listener<KeyEvent>;
}

fn attach<K, E>(world: &mut World, listener: &Listener<E>) -> EventResult<()>
where
    K: Accumulate<Value = Listener<E>>,
{
    let owner_entity = world.component_entity(listener.owner)?;
    let input = input_of(world, owner_entity)?;
    world.accumulator::<K>(input.id())?.add(listener.clone());
    Ok(())
}

fn detach<K, E>(world: &mut World, listener: &Listener<E>) -> EventResult<()>
where
    K: Accumulate<Value = Listener<E>>,
{
    let owner_entity = world.component_entity(listener.owner)?;
    if let Ok(input) = input_of(world, owner_entity) {
        world.accumulator::<K>(input.id())?.remove(listener);
    }
    Ok(())
}

/// Register `f` under purpose `K` for as long as the current instance is
/// enabled.
pub fn listen<K, E, F>(world: &mut World, f: F) -> EventResult<()>
where
    K: Accumulate<Value = Listener<E>>,
    E: 'static,
    F: Fn(&mut World, &E) -> eyre::Result<()> + 'static,
{
    let owner = hooks::current(world)?;
    let rc: Rc<ListenerFn<E>> = Rc::new(f);
    let listener = Listener {
        owner,
        callback: Callback::from_rc(rc),
    };

    let on = listener.clone();
    hooks::on_enabled(world, move |world| Ok(attach::<K, E>(world, &on)?))?;
    let off = listener.clone();
    hooks::on_disabled(world, move |world| Ok(detach::<K, E>(world, &off)?))?;

    if world.is_component_enabled(owner) {
        attach::<K, E>(world, &listener)?;
    }
    Ok(())
}

pub fn on_pointer_move<F>(world: &mut World, f: F) -> EventResult<()>
where
    F: Fn(&mut World, &PointerEvent) -> eyre::Result<()> + 'static,
{
    listen::<PointerMoveListeners, _, _>(world, f)
}

pub fn on_pointer_down<F>(world: &mut World, f: F) -> EventResult<()>
where
    F: Fn(&mut World, &PointerEvent) -> eyre::Result<()> + 'static,
{
    listen::<PointerDownListeners, _, _>(world, f)
}

pub fn on_pointer_up<F>(world: &mut World, f: F) -> EventResult<()>
where
    F: Fn(&mut World, &PointerEvent) -> eyre::Result<()> + 'static,
{
    listen::<PointerUpListeners, _, _>(world, f)
}

pub fn on_key_down<F>(world: &mut World, f: F) -> EventResult<()>
where
    F: Fn(&mut World, &KeyEvent) -> eyre::Result<()> + 'static,
{
    listen::<KeyDownListeners, _, _>(world, f)
}

pub fn on_key_up<F>(world: &mut World, f: F) -> EventResult<()>
where
    F: Fn(&mut World, &KeyEvent) -> eyre::Result<()> + 'static,
{
    listen::<KeyUpListeners, _, _>(world, f)
}

/// Pointer-down listener that only fires when the pointer hits the current
/// entity's shape. `f` receives the point in the entity's local space.
///
/// The pointer position is in surface pixels and is hit-tested as a world
/// position: a camera's view transform is not applied. Scenes whose camera
/// moves or zooms must map `event.position` through the inverse view and
/// call [`arbor_spatial::hit_test`] themselves.
pub fn on_pointer_down_inside<F>(world: &mut World, f: F) -> EventResult<()>
where
    F: Fn(&mut World, &PointerEvent, Vec2) -> eyre::Result<()> + 'static,
{
    let entity = hooks::entity(world)?;
    on_pointer_down(world, move |world, event| {
        if !arbor_spatial::hit_test(world, entity, event.position) {
            return Ok(());
        }
        match arbor_spatial::to_local(world, entity, event.position) {
            Some(local) => f(world, event, local),
            None => Ok(()),
        }
    })
}
