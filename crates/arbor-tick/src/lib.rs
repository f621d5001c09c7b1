#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::float_cmp)]

//! Arbor Tick - frame scheduling.
//!
//! A [`FrameScheduler`] component on the root entity books frames with a
//! host [`FrameClock`], measures the delta between them and invokes every
//! per-frame callback registered through [`hooks::on_frame`] in registration
//! order. A failing callback is logged; the rest of the tick still runs.

pub mod clock;
pub mod config;
pub mod error;
pub mod hooks;
pub mod scheduler;

pub use clock::{FrameClock, FrameRequest, ManualClock};
pub use config::TickConfig;
pub use error::{TickError, TickResult};
pub use scheduler::{
    FrameCallback, FrameCallbacks, FrameFn, FrameHandler, FrameInfo, FrameScheduler, SchedulerState,
    frame_scheduler,
};
