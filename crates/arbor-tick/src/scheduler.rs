//! Frame scheduler.
//!
//! ```text
//!            start()               pause()
//! Disabled ──────────▶ Running ◀──────────▶ Paused
//!    ▲                   │       resume()     │
//!    └──── stop() ───────┴────────────────────┘
//!
//! step(): one synthetic tick from any state (Stepping while it runs)
//! ```
//!
//! The scheduler is a component payload living on a root entity. Per-frame
//! callbacks registered anywhere in that tree accumulate on the scheduler
//! component under [`FrameCallbacks`] and run in registration order.

use arbor_ecs::{Accumulate, Callback, ComponentId, World, hooks};
use tracing::{error, trace, warn};

use crate::clock::{FrameClock, FrameRequest};
use crate::config::TickConfig;
use crate::error::TickResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchedulerState {
    #[default]
    Disabled,
    Running,
    Paused,
    /// A `step()` tick is executing.
    Stepping,
}

/// Timing of one tick as seen by frame callbacks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInfo {
    /// Host timestamp in milliseconds (synthetic for stepped ticks).
    pub timestamp: f64,
    /// Milliseconds since the previous tick, unclamped.
    ///
    /// `None` on the first tick after start or resume.
    pub delta: Option<f64>,
    /// Ticks run so far, this one included.
    pub tick: u64,
    /// Whether this tick came from `step()`.
    pub stepped: bool,
}

/// Signature of per-frame callbacks.
pub type FrameFn = dyn Fn(&mut World, FrameInfo) -> eyre::Result<()>;

/// Identity-compared per-frame callback.
pub type FrameCallback = Callback<FrameFn>;

/// A frame callback together with the instance it runs as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameHandler {
    pub owner: ComponentId,
    pub callback: FrameCallback,
}

/// Purpose key for frame handlers, stored on the scheduler component.
pub struct FrameCallbacks;

impl Accumulate for FrameCallbacks {
    type Value = FrameHandler;
}

/// Scheduler payload.
pub struct FrameScheduler {
    clock: Box<dyn FrameClock>,
    config: TickConfig,
    state: SchedulerState,
    pending: Option<FrameRequest>,
    /// Timestamp of the last real tick; the baseline for the next delta.
    last_timestamp: Option<f64>,
    /// Timestamp of the last stepped tick since the last real one.
    last_step: Option<f64>,
    ticks: u64,
}

impl core::fmt::Debug for FrameScheduler {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FrameScheduler")
            .field("state", &self.state)
            .field("pending", &self.pending)
            .field("last_timestamp", &self.last_timestamp)
            .field("last_step", &self.last_step)
            .field("ticks", &self.ticks)
            .finish_non_exhaustive()
    }
}

impl FrameScheduler {
    #[must_use]
    pub fn new(clock: Box<dyn FrameClock>, config: TickConfig) -> Self {
        Self {
            clock,
            config,
            state: SchedulerState::Disabled,
            pending: None,
            last_timestamp: None,
            last_step: None,
            ticks: 0,
        }
    }

    #[must_use]
    pub const fn state(&self) -> SchedulerState {
        self.state
    }

    #[must_use]
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Frame currently booked with the clock.
    #[must_use]
    pub const fn pending(&self) -> Option<FrameRequest> {
        self.pending
    }

    #[must_use]
    pub const fn config(&self) -> &TickConfig {
        &self.config
    }

    fn arm(&mut self) {
        if self.pending.is_none() {
            self.pending = Some(self.clock.request_frame());
        }
    }

    fn disarm(&mut self) {
        if let Some(request) = self.pending.take() {
            self.clock.cancel_frame(request);
        }
    }

    /// Disabled -> Running. Books the next frame.
    pub fn start(&mut self) {
        if self.state == SchedulerState::Disabled {
            self.state = SchedulerState::Running;
            self.last_timestamp = None;
            self.last_step = None;
            self.arm();
        }
    }

    /// Any state -> Disabled. Cancels the booked frame.
    pub fn stop(&mut self) {
        self.disarm();
        self.state = SchedulerState::Disabled;
        self.last_timestamp = None;
        self.last_step = None;
    }

    /// Running -> Paused. Registered callbacks are kept.
    pub fn pause(&mut self) {
        if self.state == SchedulerState::Running {
            self.disarm();
            self.state = SchedulerState::Paused;
        }
    }

    /// Paused -> Running. The first tick after resuming reports no delta.
    pub fn resume(&mut self) {
        if self.state == SchedulerState::Paused {
            self.state = SchedulerState::Running;
            self.last_timestamp = None;
            self.last_step = None;
            self.arm();
        }
    }

    /// Record a real tick at `timestamp` and book the next one.
    fn begin_frame(&mut self, request: FrameRequest, timestamp: f64) -> Option<FrameInfo> {
        if self.pending != Some(request) {
            warn!(request = request.id(), pending = ?self.pending, "ignoring stale frame request");
            return None;
        }
        self.pending = None;
        if self.state != SchedulerState::Running {
            return None;
        }

        let delta = self.last_timestamp.map(|last| timestamp - last);
        self.last_timestamp = Some(timestamp);
        self.last_step = None;
        self.ticks += 1;
        self.arm();

        Some(FrameInfo {
            timestamp,
            delta,
            tick: self.ticks,
            stepped: false,
        })
    }

    /// Run one frame for the scheduler component `scheduler`.
    ///
    /// Called by the embedder when the clock delivers `request`. Returns the
    /// tick's info, or `None` if the request was stale or the scheduler is
    /// not running.
    pub fn run_frame(
        world: &mut World,
        scheduler: ComponentId,
        request: FrameRequest,
        timestamp: f64,
    ) -> TickResult<Option<FrameInfo>> {
        let shared = world.payload::<Self>(scheduler)?;
        let info = shared.write().begin_frame(request, timestamp);
        let Some(info) = info else {
            return Ok(None);
        };

        dispatch(world, scheduler, info);
        Ok(Some(info))
    }

    /// Run exactly one synthetic tick with the configured nominal delta.
    ///
    /// Does not book a frame and works from any state. The synthetic
    /// timestamp never becomes the baseline of a real tick's delta.
    pub fn step(world: &mut World, scheduler: ComponentId) -> TickResult<FrameInfo> {
        let shared = world.payload::<Self>(scheduler)?;
        let (info, previous) = {
            let mut this = shared.write();
            let delta = this.config.step_delta_ms;
            let timestamp = this.last_step.or(this.last_timestamp).unwrap_or(0.0) + delta;
            this.last_step = Some(timestamp);
            this.ticks += 1;
            let previous = core::mem::replace(&mut this.state, SchedulerState::Stepping);
            let info = FrameInfo {
                timestamp,
                delta: Some(delta),
                tick: this.ticks,
                stepped: true,
            };
            (info, previous)
        };

        dispatch(world, scheduler, info);

        let mut this = shared.write();
        if this.state == SchedulerState::Stepping {
            this.state = previous;
        }
        Ok(info)
    }
}

/// Invoke every registered frame handler, isolating failures.
fn dispatch(world: &mut World, scheduler: ComponentId, info: FrameInfo) {
    if let Err(err) = world.flush_deferred() {
        error!(error = %err, "deferred callbacks did not settle before frame");
    }

    let handlers = world.snapshot::<FrameCallbacks>(scheduler);
    trace!(tick = info.tick, handlers = handlers.len(), "dispatching frame");

    for handler in handlers {
        if !world.is_component_alive(handler.owner) {
            continue;
        }
        let callback = handler.callback.clone();
        if let Err(err) = world.with_instance(handler.owner, |world| (*callback)(world, info)) {
            error!(
                component = %handler.owner,
                tick = info.tick,
                error = ?err,
                "frame callback failed"
            );
        }
    }
}

/// Construction function for a scheduler component.
///
/// The scheduler starts when its component is enabled and stops when it is
/// disabled.
pub fn frame_scheduler<C>(clock: C, config: TickConfig) -> impl FnOnce(&mut World) -> eyre::Result<FrameScheduler> + 'static
where
    C: FrameClock + 'static,
{
    move |world: &mut World| {
        hooks::on_enabled(world, |world| {
            if let Some(shared) = hooks::this::<FrameScheduler>(world)?.data() {
                shared.write().start();
            }
            Ok(())
        })?;
        hooks::on_disabled(world, |world| {
            if let Some(shared) = hooks::this::<FrameScheduler>(world)?.data() {
                shared.write().stop();
            }
            Ok(())
        })?;
        Ok(FrameScheduler::new(Box::new(clock), config))
    }
}

#[cfg(test)]
mod tests {
    use arbor_ecs::{Component, Shared, Surface};

    use super::*;
    use crate::clock::ManualClock;
    use crate::hooks::on_frame;

    fn mount(clock: &ManualClock) -> (World, Component<FrameScheduler>) {
        let mut world = World::new();
        let scheduler = world
            .create_root(Some("root"), frame_scheduler(clock.clone(), TickConfig::default()))
            .unwrap();
        (world, scheduler)
    }

    fn fire(world: &mut World, clock: &ManualClock, id: ComponentId, ms: f64) -> Option<FrameInfo> {
        let (request, timestamp) = clock.advance(ms)?;
        FrameScheduler::run_frame(world, id, request, timestamp).unwrap()
    }

    #[test]
    fn test_enable_arms_first_frame() {
        let clock = ManualClock::new();
        let (_world, scheduler) = mount(&clock);

        assert_eq!(scheduler.read().unwrap().state(), SchedulerState::Running);
        assert!(clock.pending().is_some());
    }

    #[test]
    fn test_first_tick_has_no_delta() {
        let clock = ManualClock::starting_at(1000.0);
        let (mut world, scheduler) = mount(&clock);

        let first = fire(&mut world, &clock, scheduler.id(), 16.0).unwrap();
        let second = fire(&mut world, &clock, scheduler.id(), 20.0).unwrap();

        assert_eq!(first.delta, None);
        assert_eq!(second.delta, Some(20.0));
        assert_eq!(second.tick, 2);
    }

    #[test]
    fn test_pause_resume_skips_paused_interval() {
        let clock = ManualClock::new();
        let (mut world, scheduler) = mount(&clock);
        fire(&mut world, &clock, scheduler.id(), 16.0);
        fire(&mut world, &clock, scheduler.id(), 16.0);

        scheduler.write().unwrap().pause();
        assert_eq!(clock.pending(), None);
        assert_eq!(clock.advance(5000.0), None);

        scheduler.write().unwrap().resume();
        let after_resume = fire(&mut world, &clock, scheduler.id(), 16.0).unwrap();
        let next = fire(&mut world, &clock, scheduler.id(), 16.0).unwrap();

        assert_eq!(after_resume.delta, None);
        assert_eq!(next.delta, Some(16.0));
    }

    #[test]
    fn test_disable_cancels_pending() {
        let clock = ManualClock::new();
        let (mut world, scheduler) = mount(&clock);

        world.disable(scheduler.entity()).unwrap();

        assert_eq!(scheduler.read().unwrap().state(), SchedulerState::Disabled);
        assert_eq!(clock.pending(), None);
        assert_eq!(clock.counts(), (1, 1));
    }

    #[test]
    fn test_stale_request_is_ignored() {
        let clock = ManualClock::new();
        let (mut world, scheduler) = mount(&clock);
        let (request, timestamp) = clock.advance(16.0).unwrap();
        FrameScheduler::run_frame(&mut world, scheduler.id(), request, timestamp).unwrap();

        let replayed = FrameScheduler::run_frame(&mut world, scheduler.id(), request, timestamp + 16.0).unwrap();
        assert_eq!(replayed, None);
    }

    #[test]
    fn test_step_runs_one_tick_without_arming() {
        let clock = ManualClock::new();
        let (mut world, scheduler) = mount(&clock);
        scheduler.write().unwrap().pause();

        let seen = Shared::new(Vec::new());
        let sink = seen.clone();
        world
            .create_child(scheduler.entity(), None, move |world: &mut World| {
                on_frame(world, move |world, info| {
                    sink.write().push((world.current_instance()?, info.delta));
                    Ok(())
                })?;
                Ok(())
            })
            .unwrap();

        let info = FrameScheduler::step(&mut world, scheduler.id()).unwrap();

        assert!(info.stepped);
        assert_eq!(info.delta, Some(TickConfig::default().step_delta_ms));
        assert_eq!(seen.read().len(), 1);
        assert_eq!(scheduler.read().unwrap().state(), SchedulerState::Paused);
        assert_eq!(clock.pending(), None);
    }

    #[test]
    fn test_step_keeps_real_delta_baseline() {
        let clock = ManualClock::starting_at(1000.0);
        let (mut world, scheduler) = mount(&clock);

        fire(&mut world, &clock, scheduler.id(), 16.0);
        fire(&mut world, &clock, scheduler.id(), 16.0);
        let first_step = FrameScheduler::step(&mut world, scheduler.id()).unwrap();
        let second_step = FrameScheduler::step(&mut world, scheduler.id()).unwrap();
        let real = fire(&mut world, &clock, scheduler.id(), 16.0).unwrap();

        let step_ms = TickConfig::default().step_delta_ms;
        assert_eq!(first_step.timestamp, 1032.0 + step_ms);
        assert_eq!(second_step.timestamp, 1032.0 + step_ms + step_ms);
        assert_eq!(real.timestamp, 1048.0);
        assert_eq!(real.delta, Some(16.0));
        assert_eq!(real.tick, 5);
    }

    #[test]
    fn test_failing_callback_does_not_stop_others() {
        let clock = ManualClock::new();
        let (mut world, scheduler) = mount(&clock);
        let count = Shared::new(0_u32);
        let sink = count.clone();

        world
            .create_child(scheduler.entity(), None, move |world: &mut World| {
                on_frame(world, |_, _| Err(eyre::eyre!("frame failed")))?;
                on_frame(world, move |_, _| {
                    *sink.write() += 1;
                    Ok(())
                })?;
                Ok(())
            })
            .unwrap();

        fire(&mut world, &clock, scheduler.id(), 16.0);
        fire(&mut world, &clock, scheduler.id(), 16.0);

        assert_eq!(count.get(), 2);
    }
}
