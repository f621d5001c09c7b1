//! Lifecycle callback purposes.

use std::rc::Rc;

use crate::accumulator::Accumulate;
use crate::shared::Callback;
use crate::world::World;

/// Signature of enable/disable/destroy/deferred callbacks.
pub type LifecycleFn = dyn Fn(&mut World) -> eyre::Result<()>;

/// Identity-compared lifecycle callback.
pub type Lifecycle = Callback<LifecycleFn>;

/// Signature of error-boundary handlers.
///
/// Returning `Err` forwards the new failure further up the tree.
pub type BoundaryFn = dyn Fn(&mut World, eyre::Report) -> eyre::Result<()>;

/// Identity-compared error-boundary handler.
pub type Boundary = Callback<BoundaryFn>;

/// Fired each time the component goes from disabled to enabled.
pub struct OnEnabled;

impl Accumulate for OnEnabled {
    type Value = Lifecycle;
}

/// Fired each time the component goes from enabled to disabled.
pub struct OnDisabled;

impl Accumulate for OnDisabled {
    type Value = Lifecycle;
}

/// Fired once when the component is destroyed or removed.
pub struct OnDestroy;

impl Accumulate for OnDestroy {
    type Value = Lifecycle;
}

/// Receives construction failures from descendants.
pub struct ErrorBoundary;

impl Accumulate for ErrorBoundary {
    type Value = Boundary;
}

/// Wrap a closure as a [`Lifecycle`] callback.
pub fn lifecycle<F>(f: F) -> Lifecycle
where
    F: Fn(&mut World) -> eyre::Result<()> + 'static,
{
    let rc: Rc<LifecycleFn> = Rc::new(f);
    Callback::from_rc(rc)
}

/// Wrap a closure as a [`Boundary`] handler.
pub fn boundary<F>(f: F) -> Boundary
where
    F: Fn(&mut World, eyre::Report) -> eyre::Result<()> + 'static,
{
    let rc: Rc<BoundaryFn> = Rc::new(f);
    Callback::from_rc(rc)
}
