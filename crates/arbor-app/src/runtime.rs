//! Embedding entry point.

use std::rc::Rc;

use arbor_ecs::{Component, ComponentId, Entity, Surface, World};
use arbor_event::{InputSystem, RawInput, SurfaceMapping, input_system};
use arbor_tick::{FrameClock, FrameInfo, FrameRequest, FrameScheduler, ManualClock, SchedulerState, frame_scheduler};
use tracing::{debug, info};

use crate::config::RuntimeConfig;
use crate::error::{AppError, AppResult};
use crate::order::{DefaultDrawOrder, DrawOrder};
use crate::runner::{AppRunner, FrameReport, app_runner};
use crate::surface::RenderSurface;

/// Host collaborators waiting for `mount`.
struct Parts {
    clock: Box<dyn FrameClock>,
    surface: Box<dyn RenderSurface>,
    order: Rc<dyn DrawOrder>,
}

/// System components installed on the root by `mount`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Mounted {
    root: Entity,
    scheduler: ComponentId,
    input: ComponentId,
    runner: ComponentId,
}

/// A world plus the scheduler, input and runner components that drive it.
///
/// ```ignore
/// let clock = ManualClock::new();
/// let mut runtime = Runtime::new(clock.clone(), RecordingSurface::new(size), RuntimeConfig::default());
/// runtime.mount(Some("game"), game_root)?;
/// runtime.advance(&clock, 16.0)?;
/// ```
pub struct Runtime {
    world: World,
    config: RuntimeConfig,
    parts: Option<Parts>,
    mounted: Option<Mounted>,
}

impl core::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Runtime")
            .field("world", &self.world)
            .field("config", &self.config)
            .field("mounted", &self.mounted)
            .finish_non_exhaustive()
    }
}

impl Runtime {
    pub fn new<C, S>(clock: C, surface: S, config: RuntimeConfig) -> Self
    where
        C: FrameClock + 'static,
        S: RenderSurface + 'static,
    {
        Self {
            world: World::with_config(config.scene),
            config,
            parts: Some(Parts {
                clock: Box::new(clock),
                surface: Box::new(surface),
                order: Rc::new(DefaultDrawOrder),
            }),
            mounted: None,
        }
    }

    /// Replace the draw-order policy. Only effective before `mount`.
    #[must_use]
    pub fn with_draw_order(mut self, order: impl DrawOrder + 'static) -> Self {
        if let Some(parts) = self.parts.as_mut() {
            parts.order = Rc::new(order);
        }
        self
    }

    #[must_use]
    pub const fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    fn mounted(&self) -> AppResult<Mounted> {
        self.mounted.ok_or(AppError::NotMounted)
    }

    /// Create the root entity, install the system components and construct
    /// `root_fn` as the application's root component.
    ///
    /// Every component is constructed before the root is enabled, so enable
    /// callbacks see a fully populated root.
    pub fn mount<P, F>(&mut self, name: Option<&str>, root_fn: F) -> AppResult<Component<P>>
    where
        P: 'static,
        F: FnOnce(&mut World) -> eyre::Result<P> + 'static,
    {
        let parts = self.parts.take().ok_or(AppError::AlreadyMounted)?;
        let surface_size = parts.surface.size();
        let world = &mut self.world;

        let root = world.spawn(Some(name.unwrap_or("root")));
        let scheduler = world.instantiate(root, frame_scheduler(parts.clock, self.config.tick))?;
        let input = world.instantiate(root, input_system(surface_size))?;
        let runner = world.instantiate(root, app_runner(parts.surface, parts.order, self.config))?;
        let app = world.instantiate(root, root_fn)?;

        world.enable(root)?;
        world.flush_deferred()?;

        self.mounted = Some(Mounted {
            root,
            scheduler: scheduler.id(),
            input: input.id(),
            runner: runner.id(),
        });
        info!(%root, width = surface_size.x, height = surface_size.y, "runtime mounted");
        Ok(app)
    }

    pub fn root(&self) -> AppResult<Entity> {
        Ok(self.mounted()?.root)
    }

    /// Deliver a frame booked with the clock.
    pub fn run_frame(&mut self, request: FrameRequest, timestamp: f64) -> AppResult<Option<FrameInfo>> {
        let scheduler = self.mounted()?.scheduler;
        Ok(FrameScheduler::run_frame(&mut self.world, scheduler, request, timestamp)?)
    }

    /// Advance a manual clock by `ms` and run the frame it fires, if any.
    pub fn advance(&mut self, clock: &ManualClock, ms: f64) -> AppResult<Option<FrameInfo>> {
        match clock.advance(ms) {
            Some((request, timestamp)) => self.run_frame(request, timestamp),
            None => Ok(None),
        }
    }

    /// Run one synthetic frame.
    pub fn step(&mut self) -> AppResult<FrameInfo> {
        let scheduler = self.mounted()?.scheduler;
        Ok(FrameScheduler::step(&mut self.world, scheduler)?)
    }

    fn scheduler(&self) -> AppResult<Component<FrameScheduler>> {
        Ok(self.world.component(self.mounted()?.scheduler)?)
    }

    pub fn pause(&mut self) -> AppResult<()> {
        if let Some(mut scheduler) = self.scheduler()?.write() {
            scheduler.pause();
        }
        Ok(())
    }

    pub fn resume(&mut self) -> AppResult<()> {
        if let Some(mut scheduler) = self.scheduler()?.write() {
            scheduler.resume();
        }
        Ok(())
    }

    pub fn scheduler_state(&self) -> AppResult<SchedulerState> {
        let scheduler = self.scheduler()?;
        Ok(scheduler.read().map_or(SchedulerState::Disabled, |s| s.state()))
    }

    /// Buffer host input for the next frame.
    pub fn push_input(&mut self, raw: RawInput) -> AppResult<()> {
        let input = self.world.payload::<InputSystem>(self.mounted()?.input)?;
        input.write().push(raw);
        Ok(())
    }

    /// Update how client coordinates map onto the surface.
    pub fn set_surface_mapping(&mut self, mapping: SurfaceMapping) -> AppResult<()> {
        let input = self.world.payload::<InputSystem>(self.mounted()?.input)?;
        input.write().set_mapping(mapping);
        Ok(())
    }

    /// Report of the most recent frame.
    pub fn last_report(&self) -> AppResult<FrameReport> {
        let runner = self.world.payload::<AppRunner>(self.mounted()?.runner)?;
        let report = runner.read().last_report();
        Ok(report)
    }

    /// Tear down the whole tree, firing every disable and destroy callback.
    pub fn unmount(&mut self) -> AppResult<()> {
        let mounted = self.mounted()?;
        self.world.unmount(mounted.root)?;
        self.mounted = None;
        debug!(root = %mounted.root, "runtime unmounted");
        Ok(())
    }
}
