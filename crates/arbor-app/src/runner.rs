//! The runner component: one update pass and one draw pass per frame.

use std::rc::Rc;

use arbor_ecs::{ComponentId, World, hooks};
use arbor_event::{EventError, InputSystem, input_of};
use arbor_tick::FrameInfo;
use tracing::trace;

use crate::config::RuntimeConfig;
use crate::dispatch::{PassStats, UpdateInfo, draw_pass, update_pass};
use crate::error::{AppError, AppResult};
use crate::order::DrawOrder;
use crate::surface::RenderSurface;

/// What happened during one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameReport {
    pub tick: u64,
    pub input_events: usize,
    /// `None` when the tick carried no delta.
    pub update: Option<PassStats>,
    pub draw: PassStats,
}

/// Runner payload: owns the surface and the draw-order policy.
pub struct AppRunner {
    surface: Option<Box<dyn RenderSurface>>,
    order: Rc<dyn DrawOrder>,
    config: RuntimeConfig,
    frames: u64,
    last: FrameReport,
}

impl core::fmt::Debug for AppRunner {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AppRunner")
            .field("surface_present", &self.surface.is_some())
            .field("frames", &self.frames)
            .field("last", &self.last)
            .finish_non_exhaustive()
    }
}

impl AppRunner {
    #[must_use]
    pub const fn frames(&self) -> u64 {
        self.frames
    }

    #[must_use]
    pub const fn last_report(&self) -> FrameReport {
        self.last
    }

    /// Replay input, run updates, then draw, for the runner component `runner`.
    pub fn run_frame(world: &mut World, runner: ComponentId, info: FrameInfo) -> AppResult<FrameReport> {
        let root = world.root_of(world.component_entity(runner)?);

        let input_events = match input_of(world, root) {
            Ok(input) => InputSystem::replay(world, arbor_ecs::Surface::id(&input))?,
            Err(EventError::NoInputSystem(_)) => 0,
            Err(err) => return Err(err.into()),
        };

        let shared = world.payload::<Self>(runner)?;
        let config = shared.read().config;

        let update = info.delta.map(|raw| {
            let update = UpdateInfo {
                delta_ms: config.clamp_delta(raw),
                raw_delta_ms: raw,
                tick: info.tick,
            };
            update_pass(world, root, update)
        });

        let (mut surface, order) = {
            let mut this = shared.write();
            let surface = this.surface.take().ok_or(AppError::SurfaceBusy)?;
            (surface, Rc::clone(&this.order))
        };
        let draw = draw_pass(
            world,
            root,
            &mut *surface,
            &*order,
            info,
            config.round_draw_translation,
        );

        let report = FrameReport {
            tick: info.tick,
            input_events,
            update,
            draw,
        };
        {
            let mut this = shared.write();
            this.surface = Some(surface);
            this.frames += 1;
            this.last = report;
        }
        trace!(?report, "frame complete");
        Ok(report)
    }
}

/// Construction function for the runner component.
pub fn app_runner(
    surface: Box<dyn RenderSurface>,
    order: Rc<dyn DrawOrder>,
    config: RuntimeConfig,
) -> impl FnOnce(&mut World) -> eyre::Result<AppRunner> + 'static {
    move |world: &mut World| {
        arbor_tick::hooks::on_frame(world, |world, info| {
            let runner = hooks::current(world)?;
            AppRunner::run_frame(world, runner, info)?;
            Ok(())
        })?;

        Ok(AppRunner {
            surface: Some(surface),
            order,
            config,
            frames: 0,
            last: FrameReport::default(),
        })
    }
}
