//! World - owner of the entity tree, component instances and hook context.
//!
//! Entities and components live in generational slabs. The parent link of
//! an entity is a plain handle; ownership flows strictly downward (an entity
//! owns its components and children), so tearing down a subtree never has to
//! break reference cycles.

use core::any::Any;
use std::collections::VecDeque;
use std::rc::Rc;

use hashbrown::HashMap;
use smallvec::SmallVec;
use tracing::{debug, error, trace, warn};

use crate::accumulator::{Accumulate, Accumulator};
use crate::component::{Component, ComponentFlags, ComponentHeader, ComponentKind, ComponentRecord, Surface};
use crate::config::SceneConfig;
use crate::context::InstanceStack;
use crate::entity::{ComponentId, Entity, Slab};
use crate::error::{SceneError, SceneResult};
use crate::lifecycle::{Boundary, ErrorBoundary, Lifecycle, OnDestroy, OnDisabled, OnEnabled};
use crate::shared::Shared;

/// A node of the scene tree.
#[derive(Debug)]
pub(crate) struct EntityNode {
    name: Option<String>,
    creation_id: u64,
    parent: Option<Entity>,
    children: SmallVec<[Entity; 4]>,
    components: SmallVec<[ComponentId; 4]>,
    enabled: bool,
    /// Set once teardown starts; further destroy requests are no-ops.
    tearing_down: bool,
}

/// The scene - container for every entity, component and hook region.
pub struct World {
    config: SceneConfig,
    entities: Slab<EntityNode>,
    components: Slab<ComponentRecord>,
    /// Name index: name -> entities carrying it, in creation order.
    names: HashMap<String, SmallVec<[Entity; 1]>>,
    stack: InstanceStack,
    next_entity_serial: u64,
    next_component_serial: u64,
    /// Nesting depth of running construction functions.
    constructing: usize,
    deferred: VecDeque<(ComponentId, Lifecycle)>,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for World {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("World")
            .field("entities", &self.entities.len())
            .field("components", &self.components.len())
            .field("stack_depth", &self.stack.depth())
            .field("deferred", &self.deferred.len())
            .finish_non_exhaustive()
    }
}

impl World {
    /// Create an empty world with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(SceneConfig::default())
    }

    #[must_use]
    pub fn with_config(config: SceneConfig) -> Self {
        Self {
            config,
            entities: Slab::new(),
            components: Slab::new(),
            names: HashMap::new(),
            stack: InstanceStack::new(),
            next_entity_serial: 0,
            next_component_serial: 0,
            constructing: 0,
            deferred: VecDeque::new(),
        }
    }

    #[must_use]
    pub const fn config(&self) -> &SceneConfig {
        &self.config
    }

    // ==================== Instance Context ====================

    /// Run `f` with `instance` as the current instance.
    ///
    /// The stack is restored to its entry depth when `f` returns, whatever
    /// `f` returned.
    pub fn with_instance<R>(&mut self, instance: ComponentId, f: impl FnOnce(&mut Self) -> R) -> R {
        let depth = self.stack.enter(instance);
        let result = f(self);
        self.stack.exit(depth);
        result
    }

    /// The component instance whose code is currently executing.
    pub fn current_instance(&self) -> SceneResult<ComponentId> {
        self.stack.current()
    }

    /// The entity owning the current instance.
    pub fn current_entity(&self) -> SceneResult<Entity> {
        let id = self.current_instance()?;
        self.component_entity(id)
    }

    // ==================== Entity Queries ====================

    fn node(&self, entity: Entity) -> SceneResult<&EntityNode> {
        self.entities
            .get(entity.slot())
            .ok_or(SceneError::StaleEntity(entity))
    }

    fn node_mut(&mut self, entity: Entity) -> SceneResult<&mut EntityNode> {
        self.entities
            .get_mut(entity.slot())
            .ok_or(SceneError::StaleEntity(entity))
    }

    fn record(&self, id: ComponentId) -> SceneResult<&ComponentRecord> {
        self.components
            .get(id.slot())
            .ok_or(SceneError::StaleComponent(id))
    }

    fn record_mut(&mut self, id: ComponentId) -> SceneResult<&mut ComponentRecord> {
        self.components
            .get_mut(id.slot())
            .ok_or(SceneError::StaleComponent(id))
    }

    #[must_use]
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.entities.contains(entity.slot())
    }

    #[must_use]
    pub fn is_component_alive(&self, id: ComponentId) -> bool {
        self.components.contains(id.slot())
    }

    /// Number of live entities.
    #[must_use]
    pub fn entity_count(&self) -> u32 {
        self.entities.len()
    }

    /// Number of live components.
    #[must_use]
    pub fn component_count(&self) -> u32 {
        self.components.len()
    }

    #[must_use]
    pub fn parent(&self, entity: Entity) -> Option<Entity> {
        self.node(entity).ok()?.parent
    }

    /// Children in insertion order; empty for stale handles.
    #[must_use]
    pub fn children(&self, entity: Entity) -> &[Entity] {
        self.node(entity)
            .map(|node| node.children.as_slice())
            .unwrap_or_default()
    }

    /// Components in attachment order; empty for stale handles.
    #[must_use]
    pub fn components_of(&self, entity: Entity) -> &[ComponentId] {
        self.node(entity)
            .map(|node| node.components.as_slice())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn name(&self, entity: Entity) -> Option<&str> {
        self.node(entity).ok()?.name.as_deref()
    }

    /// Monotonic creation serial, used as the stable ordering tie-break.
    #[must_use]
    pub fn creation_id(&self, entity: Entity) -> Option<u64> {
        self.node(entity).ok().map(|node| node.creation_id)
    }

    #[must_use]
    pub fn is_enabled(&self, entity: Entity) -> bool {
        self.node(entity).is_ok_and(|node| node.enabled)
    }

    /// First live entity carrying `name`.
    #[must_use]
    pub fn lookup_name(&self, name: &str) -> Option<Entity> {
        self.names
            .get(name)?
            .iter()
            .copied()
            .find(|&entity| self.is_alive(entity))
    }

    /// Ancestors from the parent up to the root.
    #[must_use]
    pub fn ancestors(&self, entity: Entity) -> Vec<Entity> {
        let mut out = Vec::new();
        let mut cursor = self.parent(entity);
        while let Some(current) = cursor {
            out.push(current);
            cursor = self.parent(current);
        }
        out
    }

    /// Topmost ancestor (the entity itself if it has no parent).
    #[must_use]
    pub fn root_of(&self, entity: Entity) -> Entity {
        self.ancestors(entity).last().copied().unwrap_or(entity)
    }

    /// The entity and all its descendants, pre-order.
    #[must_use]
    pub fn descendants(&self, entity: Entity) -> Vec<Entity> {
        let mut out = Vec::new();
        if !self.is_alive(entity) {
            return out;
        }
        let mut pending = vec![entity];
        while let Some(current) = pending.pop() {
            out.push(current);
            pending.extend(self.children(current).iter().rev().copied());
        }
        out
    }

    // ==================== Tree Mutation ====================

    /// Create a detached, disabled entity.
    pub fn spawn(&mut self, name: Option<&str>) -> Entity {
        let creation_id = self.next_entity_serial;
        self.next_entity_serial += 1;

        let slot = self.entities.insert(EntityNode {
            name: name.map(str::to_owned),
            creation_id,
            parent: None,
            children: SmallVec::new(),
            components: SmallVec::new(),
            enabled: false,
            tearing_down: false,
        });
        let entity = Entity::from_slot(slot);

        if let Some(name) = name {
            self.names.entry(name.to_owned()).or_default().push(entity);
        }

        trace!(%entity, creation_id, ?name, "spawned entity");
        entity
    }

    fn link_child(&mut self, parent: Entity, child: Entity) -> SceneResult<()> {
        if parent == child || self.ancestors(parent).contains(&child) {
            return Err(SceneError::WouldCycle { child, parent });
        }
        self.node(parent)?;
        if let Some(existing) = self.node(child)?.parent {
            return Err(SceneError::AlreadyParented {
                child,
                parent: existing,
            });
        }

        self.node_mut(child)?.parent = Some(parent);
        self.node_mut(parent)?.children.push(child);
        Ok(())
    }

    fn unlink_child(&mut self, parent: Entity, child: Entity) -> SceneResult<()> {
        if self.node(child)?.parent != Some(parent) {
            return Err(SceneError::NotAChild { child, parent });
        }
        self.node_mut(parent)?.children.retain(|c| *c != child);
        self.node_mut(child)?.parent = None;
        Ok(())
    }

    /// Attach a detached entity under `parent`.
    ///
    /// The child is enabled if the parent is enabled.
    pub fn add_child(&mut self, parent: Entity, child: Entity) -> SceneResult<()> {
        self.link_child(parent, child)?;
        if self.is_enabled(parent) {
            self.enable(child)?;
        }
        Ok(())
    }

    /// Detach `child` from `parent`, disabling its subtree.
    ///
    /// The child stays alive as the root of a detached subtree.
    pub fn remove_child(&mut self, parent: Entity, child: Entity) -> SceneResult<()> {
        if self.node(child)?.parent != Some(parent) {
            return Err(SceneError::NotAChild { child, parent });
        }
        if self.is_enabled(child) {
            self.disable(child)?;
        }
        self.unlink_child(parent, child)
    }

    /// Create a root entity from a root construction function and enable it.
    ///
    /// This is the embedding entry point. Deferred callbacks queued during
    /// construction run before this returns.
    pub fn create_root<P, F>(&mut self, name: Option<&str>, construct: F) -> SceneResult<Component<P>>
    where
        P: 'static,
        F: FnOnce(&mut Self) -> eyre::Result<P> + 'static,
    {
        let entity = self.spawn(name);
        let component = self.instantiate(entity, construct)?;
        self.enable(entity)?;
        debug!(%entity, ?name, "created root entity");
        self.flush_if_idle()?;
        Ok(component)
    }

    /// Create a child of `parent` carrying one component built by `construct`.
    ///
    /// The child is linked first, so construction already sees its parent
    /// chain, and enabled only after construction finished.
    pub fn create_child<P, F>(
        &mut self,
        parent: Entity,
        name: Option<&str>,
        construct: F,
    ) -> SceneResult<Component<P>>
    where
        P: 'static,
        F: FnOnce(&mut Self) -> eyre::Result<P> + 'static,
    {
        self.node(parent)?;
        let child = self.spawn(name);
        self.link_child(parent, child)?;
        let component = self.instantiate(child, construct)?;
        if self.is_enabled(parent) {
            self.enable(child)?;
        }
        self.flush_if_idle()?;
        Ok(component)
    }

    // ==================== Components ====================

    /// Turn a construction function into a live component owned by `entity`.
    ///
    /// The function runs with the new component as the current instance. A
    /// failure is routed to the nearest error boundary and leaves the
    /// component without a payload; it never aborts the caller.
    pub fn instantiate<P, F>(&mut self, entity: Entity, construct: F) -> SceneResult<Component<P>>
    where
        P: 'static,
        F: FnOnce(&mut Self) -> eyre::Result<P> + 'static,
    {
        let kind = ComponentKind::of::<F>();
        if self.get_component(entity, kind).is_some() {
            debug!(%entity, kind = kind.name(), "entity already has a component of this kind; lookups return the first");
        }

        let creation_id = self.next_component_serial;
        self.next_component_serial += 1;

        let slot = self
            .components
            .insert(ComponentRecord::new(entity, kind, creation_id));
        let id = ComponentId::from_slot(slot);
        if let Err(err) = self.node_mut(entity).map(|node| node.components.push(id)) {
            self.components.remove(slot);
            return Err(err);
        }

        self.constructing += 1;
        let outcome = self.with_instance(id, construct);
        self.constructing -= 1;

        let header = ComponentHeader { id, entity, kind };
        match outcome {
            Ok(payload) => {
                let shared = Shared::new(payload);
                let rc = Rc::clone(shared.rc());
                self.record_mut(id)?.payload = Some(rc as Rc<dyn Any>);
                Ok(Component::new(header, Some(shared)))
            }
            Err(failure) => {
                self.record_mut(id)?.flags.insert(ComponentFlags::FAILED);
                self.route_failure(id, entity, failure);
                Ok(Component::new(header, None))
            }
        }
    }

    /// Attach a new component to `entity`, enabling it if the entity is enabled.
    pub fn add_component<P, F>(&mut self, entity: Entity, construct: F) -> SceneResult<Component<P>>
    where
        P: 'static,
        F: FnOnce(&mut Self) -> eyre::Result<P> + 'static,
    {
        let component = self.instantiate(entity, construct)?;
        if self.is_enabled(entity) {
            self.enable_component(component.id())?;
        }
        self.flush_if_idle()?;
        Ok(component)
    }

    /// Detach and destroy a single component.
    ///
    /// An enabled component is disabled first, then its destroy callbacks run.
    pub fn remove_component(&mut self, id: ComponentId) -> SceneResult<()> {
        let entity = self.component_entity(id)?;
        if self.is_component_enabled(id) {
            self.disable_component(id)?;
        }
        self.fire::<OnDestroy>(id);
        self.node_mut(entity)?.components.retain(|c| *c != id);
        self.components.remove(id.slot());
        trace!(component = %id, %entity, "removed component");
        Ok(())
    }

    /// Identity header of a live component.
    pub fn header(&self, id: ComponentId) -> SceneResult<ComponentHeader> {
        let record = self.record(id)?;
        Ok(ComponentHeader {
            id,
            entity: record.entity,
            kind: record.kind,
        })
    }

    pub fn component_entity(&self, id: ComponentId) -> SceneResult<Entity> {
        Ok(self.record(id)?.entity)
    }

    /// Component creation serial.
    #[must_use]
    pub fn component_creation_id(&self, id: ComponentId) -> Option<u64> {
        self.record(id).ok().map(|record| record.creation_id)
    }

    #[must_use]
    pub fn flags(&self, id: ComponentId) -> ComponentFlags {
        self.record(id).map_or(ComponentFlags::empty(), |record| record.flags)
    }

    /// Set or clear a non-lifecycle flag such as [`ComponentFlags::CAMERA`].
    ///
    /// `ENABLED` is ignored here; use `enable_component`/`disable_component`.
    pub fn set_flag(&mut self, id: ComponentId, flag: ComponentFlags, on: bool) -> SceneResult<()> {
        let flag = flag.difference(ComponentFlags::ENABLED);
        self.record_mut(id)?.flags.set(flag, on);
        Ok(())
    }

    #[must_use]
    pub fn is_component_enabled(&self, id: ComponentId) -> bool {
        self.flags(id).contains(ComponentFlags::ENABLED)
    }

    /// Public surface of a live component, with its payload viewed as `P`.
    ///
    /// `data` is `None` if construction failed or `P` is not the payload type.
    pub fn component<P: 'static>(&self, id: ComponentId) -> SceneResult<Component<P>> {
        let record = self.record(id)?;
        let header = ComponentHeader {
            id,
            entity: record.entity,
            kind: record.kind,
        };
        Ok(Component::new(header, record.payload::<P>()))
    }

    /// Payload of a live component as `P`.
    pub fn payload<P: 'static>(&self, id: ComponentId) -> SceneResult<Shared<P>> {
        self.record(id)?
            .payload::<P>()
            .ok_or(SceneError::MissingPayload(id))
    }

    /// First component of `entity` built by construction function `kind`.
    #[must_use]
    pub fn get_component(&self, entity: Entity, kind: ComponentKind) -> Option<ComponentId> {
        self.components_of(entity)
            .iter()
            .copied()
            .find(|&id| self.record(id).is_ok_and(|record| record.kind == kind))
    }

    /// Every component of `entity` built by construction function `kind`.
    #[must_use]
    pub fn get_components(&self, entity: Entity, kind: ComponentKind) -> Vec<ComponentId> {
        self.components_of(entity)
            .iter()
            .copied()
            .filter(|&id| self.record(id).is_ok_and(|record| record.kind == kind))
            .collect()
    }

    /// First component of `entity` whose payload is a `P`.
    #[must_use]
    pub fn find<P: 'static>(&self, entity: Entity) -> Option<Component<P>> {
        self.components_of(entity).iter().find_map(|&id| {
            let record = self.record(id).ok()?;
            let data = record.payload::<P>()?;
            Some(Component::new(
                ComponentHeader {
                    id,
                    entity: record.entity,
                    kind: record.kind,
                },
                Some(data),
            ))
        })
    }

    // ==================== Accumulators ====================

    /// Accumulator for purpose `K` on component `id`.
    pub fn accumulator<K: Accumulate>(&mut self, id: ComponentId) -> SceneResult<&mut Accumulator<K::Value>> {
        Ok(self.record_mut(id)?.accumulators.entry::<K>())
    }

    /// Snapshot of `K`'s values on `id`; empty for stale handles.
    #[must_use]
    pub fn snapshot<K: Accumulate>(&self, id: ComponentId) -> Vec<K::Value> {
        self.record(id)
            .map(|record| record.accumulators.snapshot::<K>())
            .unwrap_or_default()
    }

    /// Whether `id` has any value registered for `K`.
    #[must_use]
    pub fn has_accumulated<K: Accumulate>(&self, id: ComponentId) -> bool {
        self.record(id).is_ok_and(|record| record.accumulators.has::<K>())
    }

    // ==================== Lifecycle ====================

    /// Run every `K` lifecycle callback of `id` inside its instance region.
    ///
    /// Failures are logged and do not stop the remaining callbacks.
    fn fire<K: Accumulate<Value = Lifecycle>>(&mut self, id: ComponentId) {
        for callback in self.snapshot::<K>(id) {
            if let Err(err) = self.with_instance(id, |world| (*callback)(world)) {
                error!(
                    component = %id,
                    hook = core::any::type_name::<K>(),
                    error = ?err,
                    "lifecycle callback failed"
                );
            }
        }
    }

    /// Enable one component, firing its enabled callbacks.
    pub fn enable_component(&mut self, id: ComponentId) -> SceneResult<()> {
        let record = self.record_mut(id)?;
        if record.flags.contains(ComponentFlags::ENABLED) {
            return Ok(());
        }
        record.flags.insert(ComponentFlags::ENABLED);
        self.fire::<OnEnabled>(id);
        Ok(())
    }

    /// Disable one component, firing its disabled callbacks.
    pub fn disable_component(&mut self, id: ComponentId) -> SceneResult<()> {
        let record = self.record_mut(id)?;
        if !record.flags.contains(ComponentFlags::ENABLED) {
            return Ok(());
        }
        record.flags.remove(ComponentFlags::ENABLED);
        self.fire::<OnDisabled>(id);
        Ok(())
    }

    /// Enable `entity`, its disabled components, then every child.
    pub fn enable(&mut self, entity: Entity) -> SceneResult<()> {
        self.node_mut(entity)?.enabled = true;

        let components = self.node(entity)?.components.clone();
        for id in components {
            if self.is_component_alive(id) && !self.is_component_enabled(id) {
                self.enable_component(id)?;
            }
        }

        let children = self.node(entity)?.children.clone();
        for child in children {
            if self.is_alive(child) {
                self.enable(child)?;
            }
        }
        Ok(())
    }

    /// Disable `entity`, its enabled components, then every child.
    ///
    /// Recursion into children is unconditional.
    pub fn disable(&mut self, entity: Entity) -> SceneResult<()> {
        self.node_mut(entity)?.enabled = false;

        let components = self.node(entity)?.components.clone();
        for id in components {
            if self.is_component_enabled(id) {
                self.disable_component(id)?;
            }
        }

        let children = self.node(entity)?.children.clone();
        for child in children {
            if self.is_alive(child) {
                self.disable(child)?;
            }
        }
        Ok(())
    }

    /// Destroy `entity` and its subtree.
    ///
    /// Descendants are torn down first (leaf-first destroy callbacks), then
    /// the entity is disabled, its destroy callbacks fire, and it is
    /// detached from its parent. Destroying an entity whose teardown is
    /// already in progress (from one of its own callbacks) does nothing.
    pub fn destroy(&mut self, entity: Entity) -> SceneResult<()> {
        let node = self.node(entity)?;
        if node.tearing_down {
            return Ok(());
        }
        if node.parent.is_none() {
            return Err(SceneError::CannotDestroyRoot(entity));
        }
        self.teardown(entity)
    }

    /// Tear down a parentless tree, typically when the embedder shuts down.
    pub fn unmount(&mut self, root: Entity) -> SceneResult<()> {
        if let Some(parent) = self.node(root)?.parent {
            return Err(SceneError::AlreadyParented {
                child: root,
                parent,
            });
        }
        self.teardown(root)
    }

    fn teardown(&mut self, entity: Entity) -> SceneResult<()> {
        let node = self.node_mut(entity)?;
        if node.tearing_down {
            return Ok(());
        }
        node.tearing_down = true;

        let children = self.node(entity)?.children.clone();
        for child in children {
            if self.is_alive(child) {
                self.teardown(child)?;
            }
        }

        self.disable(entity)?;

        let components = self.node(entity)?.components.clone();
        for &id in &components {
            self.fire::<OnDestroy>(id);
        }

        // A callback may have torn down the parent already.
        if let Some(parent) = self.node(entity)?.parent {
            if self.is_alive(parent) {
                self.unlink_child(parent, entity)?;
            } else {
                self.node_mut(entity)?.parent = None;
            }
        }

        for id in self.node(entity)?.components.clone() {
            self.components.remove(id.slot());
        }
        if let Some(node) = self.entities.remove(entity.slot()) {
            if let Some(name) = node.name {
                if let Some(list) = self.names.get_mut(&name) {
                    list.retain(|e| *e != entity);
                    if list.is_empty() {
                        self.names.remove(&name);
                    }
                }
            }
        }
        trace!(%entity, "destroyed entity");
        Ok(())
    }

    // ==================== Error Boundaries ====================

    fn boundary_candidates(&self, entity: Entity, failed: ComponentId) -> Vec<(ComponentId, Boundary)> {
        self.components_of(entity)
            .iter()
            .copied()
            .filter(|&id| id != failed)
            .flat_map(|id| {
                self.snapshot::<ErrorBoundary>(id)
                    .into_iter()
                    .map(move |handler| (id, handler))
            })
            .collect()
    }

    /// Walk from `entity` up the parent chain offering `failure` to each
    /// error-boundary handler until one accepts it.
    fn route_failure(&mut self, failed: ComponentId, entity: Entity, failure: eyre::Report) {
        let mut failure = failure;
        let mut cursor = Some(entity);

        while let Some(current) = cursor {
            for (owner, handler) in self.boundary_candidates(current, failed) {
                match self.with_instance(owner, |world| (*handler)(world, failure)) {
                    Ok(()) => {
                        debug!(component = %failed, boundary = %owner, "construction failure handled");
                        return;
                    }
                    Err(next) => {
                        warn!(boundary = %owner, error = ?next, "error boundary failed; continuing upward");
                        failure = next;
                    }
                }
            }
            cursor = self.parent(current);
        }

        let kind = self.record(failed).map_or("<removed>", |record| record.kind.name());
        error!(
            component = %failed,
            %entity,
            kind,
            error = ?failure,
            "component construction failed with no error boundary"
        );
    }

    // ==================== Deferred Callbacks ====================

    /// Queue `callback` to run later inside `owner`'s instance region.
    pub fn defer(&mut self, owner: ComponentId, callback: Lifecycle) {
        self.deferred.push_back((owner, callback));
    }

    /// Number of queued deferred callbacks.
    #[must_use]
    pub fn pending_deferred(&self) -> usize {
        self.deferred.len()
    }

    /// Run queued deferred callbacks, including ones queued while flushing.
    ///
    /// Callbacks whose owner was removed in the meantime are dropped.
    /// Returns the number of callbacks run.
    pub fn flush_deferred(&mut self) -> SceneResult<usize> {
        let mut ran = 0;
        for _ in 0..self.config.max_deferred_rounds {
            if self.deferred.is_empty() {
                return Ok(ran);
            }
            let batch: Vec<_> = self.deferred.drain(..).collect();
            for (owner, callback) in batch {
                if !self.is_component_alive(owner) {
                    trace!(component = %owner, "dropping deferred callback of removed component");
                    continue;
                }
                ran += 1;
                if let Err(err) = self.with_instance(owner, |world| (*callback)(world)) {
                    error!(component = %owner, error = ?err, "deferred callback failed");
                }
            }
        }
        if self.deferred.is_empty() {
            Ok(ran)
        } else {
            Err(SceneError::DeferredOverflow(self.config.max_deferred_rounds))
        }
    }

    /// Flush when no hook region or construction is active, i.e. at the end
    /// of an outermost embedder call.
    fn flush_if_idle(&mut self) -> SceneResult<()> {
        if self.stack.is_empty() && self.constructing == 0 {
            self.flush_deferred()?;
        }
        Ok(())
    }
}
