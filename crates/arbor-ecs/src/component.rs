//! Component kinds, records and their public surface.
//!
//! A component is created from a construction function. The function's
//! closure type is the component's [`ComponentKind`]; whatever it returns
//! becomes the component's payload, exposed live through [`Component`].

use core::any::{Any, TypeId};
use core::fmt;
use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

use bitflags::bitflags;

use crate::accumulator::AccumulatorMap;
use crate::entity::{ComponentId, Entity};
use crate::error::SceneResult;
use crate::shared::Shared;
use crate::world::World;

/// Identity of a construction function.
#[derive(Clone, Copy)]
pub struct ComponentKind {
    type_id: TypeId,
    name: &'static str,
}

impl ComponentKind {
    /// Kind of the construction function type `C`.
    #[must_use]
    pub fn of<C: 'static>() -> Self {
        Self {
            type_id: TypeId::of::<C>(),
            name: core::any::type_name::<C>(),
        }
    }

    /// Kind of the construction function `value`.
    ///
    /// Useful for closures and fn items whose type cannot be named.
    #[must_use]
    pub fn of_val<C: 'static>(_value: &C) -> Self {
        Self::of::<C>()
    }

    #[must_use]
    pub const fn type_id(self) -> TypeId {
        self.type_id
    }

    /// Type name, for diagnostics only.
    #[must_use]
    pub const fn name(self) -> &'static str {
        self.name
    }
}

impl PartialEq for ComponentKind {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for ComponentKind {}

impl core::hash::Hash for ComponentKind {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Debug for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentKind({})", self.name)
    }
}

/// Bound satisfied by every construction function.
///
/// A construction function is any `FnOnce(&mut World) -> eyre::Result<P>`.
/// It runs with the new component as the current instance, so hook
/// functions called from its body target that component. APIs take the
/// closure bound directly so that closure signatures are inferred at the
/// call site; this trait names the bound for helper signatures.
pub trait Construct<P>: FnOnce(&mut World) -> eyre::Result<P> + 'static {}

impl<F, P> Construct<P> for F where F: FnOnce(&mut World) -> eyre::Result<P> + 'static {}

bitflags! {
    /// Per-component state bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ComponentFlags: u8 {
        /// The component's enabled flag.
        const ENABLED = 1 << 0;
        /// Drawn before every non-camera component by the default draw order.
        const CAMERA = 1 << 1;
        /// Construction failed; the component has no payload.
        const FAILED = 1 << 2;
    }
}

/// Internal storage for a component instance.
pub(crate) struct ComponentRecord {
    pub(crate) entity: Entity,
    pub(crate) kind: ComponentKind,
    pub(crate) creation_id: u64,
    pub(crate) flags: ComponentFlags,
    pub(crate) payload: Option<Rc<dyn Any>>,
    pub(crate) accumulators: AccumulatorMap,
}

impl ComponentRecord {
    pub(crate) fn new(entity: Entity, kind: ComponentKind, creation_id: u64) -> Self {
        Self {
            entity,
            kind,
            creation_id,
            flags: ComponentFlags::empty(),
            payload: None,
            accumulators: AccumulatorMap::new(),
        }
    }

    pub(crate) fn payload<P: 'static>(&self) -> Option<Shared<P>> {
        let any = Rc::clone(self.payload.as_ref()?);
        any.downcast::<RefCell<P>>().ok().map(Shared::from_rc)
    }
}

/// Fixed identity fields shared by every component surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComponentHeader {
    /// Component handle.
    pub id: ComponentId,
    /// Owning entity (never changes).
    pub entity: Entity,
    /// Construction function identity.
    pub kind: ComponentKind,
}

/// Identity operations available on every component surface.
pub trait Surface {
    /// Identity header.
    fn header(&self) -> &ComponentHeader;

    fn id(&self) -> ComponentId {
        self.header().id
    }

    fn entity(&self) -> Entity {
        self.header().entity
    }

    fn kind(&self) -> ComponentKind {
        self.header().kind
    }

    /// Enable this component (no-op if already enabled).
    fn enable(&self, world: &mut World) -> SceneResult<()> {
        world.enable_component(self.id())
    }

    /// Disable this component (no-op if already disabled).
    fn disable(&self, world: &mut World) -> SceneResult<()> {
        world.disable_component(self.id())
    }

    fn is_enabled(&self, world: &World) -> bool {
        world.is_component_enabled(self.id())
    }
}

/// Public surface of a component: identity header plus live payload.
///
/// `data` is `None` when construction failed. Clones share the same payload.
pub struct Component<P> {
    header: ComponentHeader,
    data: Option<Shared<P>>,
}

impl<P> Component<P> {
    pub(crate) fn new(header: ComponentHeader, data: Option<Shared<P>>) -> Self {
        Self { header, data }
    }

    /// Shared payload handle, if construction produced one.
    #[must_use]
    pub fn data(&self) -> Option<&Shared<P>> {
        self.data.as_ref()
    }

    /// Whether construction succeeded.
    #[must_use]
    pub fn is_constructed(&self) -> bool {
        self.data.is_some()
    }

    /// Borrow the payload.
    #[must_use]
    pub fn read(&self) -> Option<Ref<'_, P>> {
        self.data.as_ref().map(Shared::read)
    }

    /// Mutably borrow the payload.
    #[must_use]
    pub fn write(&self) -> Option<RefMut<'_, P>> {
        self.data.as_ref().map(Shared::write)
    }
}

impl<P> Surface for Component<P> {
    fn header(&self) -> &ComponentHeader {
        &self.header
    }
}

impl<P> Clone for Component<P> {
    fn clone(&self) -> Self {
        Self {
            header: self.header,
            data: self.data.clone(),
        }
    }
}

impl<P: fmt::Debug> fmt::Debug for Component<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("id", &self.header.id)
            .field("entity", &self.header.entity)
            .field("kind", &self.header.kind)
            .field("data", &self.data)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_counter() -> impl FnOnce(&mut World) -> eyre::Result<u32> + 'static {
        |_world| Ok(0)
    }

    #[test]
    fn test_kind_is_construction_function_identity() {
        let a = make_counter();
        let b = make_counter();
        let other = |_world: &mut World| -> eyre::Result<u32> { Ok(0) };

        assert_eq!(ComponentKind::of_val(&a), ComponentKind::of_val(&b));
        assert_ne!(ComponentKind::of_val(&a), ComponentKind::of_val(&other));
    }

    #[test]
    fn test_flags_default_disabled() {
        let flags = ComponentFlags::default();
        assert!(!flags.contains(ComponentFlags::ENABLED));
    }
}
