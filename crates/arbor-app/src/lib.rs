#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::float_cmp)]

//! Arbor App - frame dispatch and the embedding entry point.
//!
//! [`Runtime::mount`] builds a root entity carrying a frame scheduler, an
//! input system, a runner and the application's root component. Each frame
//! the runner replays buffered input, runs every [`on_update`] callback in
//! tree order with a clamped delta, then clears the surface and runs every
//! [`on_draw`] callback in [`DrawOrder`].
//!
//! ```text
//! root ─┬─ FrameScheduler   (books frames, runs on_frame handlers)
//!       ├─ InputSystem      (buffers host input)
//!       ├─ AppRunner        (input replay → update pass → draw pass)
//!       ├─ <root component>
//!       └─ children...
//! ```

pub mod camera;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod order;
pub mod runner;
pub mod runtime;
pub mod surface;

pub use camera::{Camera, camera};
pub use config::RuntimeConfig;
pub use dispatch::{
    DrawCallback, DrawCallbacks, DrawFrame, PassStats, UpdateCallback, UpdateCallbacks, UpdateInfo, draw_pass,
    enabled_components, on_draw, on_update, update_pass,
};
pub use error::{AppError, AppResult};
pub use order::{DefaultDrawOrder, DrawItem, DrawOrder};
pub use runner::{AppRunner, FrameReport};
pub use runtime::Runtime;
pub use surface::{DrawCommand, RecordingSurface, RenderSurface, Rgba};

/// Prelude for application code.
pub mod prelude {
    pub use arbor_ecs::prelude::*;
    pub use arbor_event::{
        KeyEvent, PointerEvent, RawInput, on_key_down, on_key_up, on_pointer_down, on_pointer_down_inside,
        on_pointer_move, on_pointer_up,
    };
    pub use arbor_spatial::{Position, Rotation, Scale, Shape, origin, position, rotation, scale, shape};
    pub use arbor_tick::hooks::on_frame;
    pub use arbor_tick::{FrameInfo, ManualClock};

    pub use crate::{
        DrawFrame, RecordingSurface, RenderSurface, Runtime, RuntimeConfig, UpdateInfo, camera, on_draw, on_update,
    };
}
