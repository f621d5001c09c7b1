#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::float_cmp)]

//! Arbor Event - buffered input.
//!
//! Host input arrives at any time and is buffered on the root's
//! [`InputSystem`]. At the start of each update pass it is replayed: all
//! pointer moves first, then pointer down/up in arrival order, then keys.
//! Down/up handlers can therefore rely on the pointer position already
//! being resolved.

pub mod error;
pub mod input;
pub mod listener;
pub mod system;

pub use error::{EventError, EventResult};
pub use input::{InputEvent, InputQueue, KeyEvent, KeyKind, PointerEvent, PointerKind, RawInput, SurfaceMapping};
pub use listener::{
    KeyDownListeners, KeyUpListeners, Listener, ListenerFn, PointerDownListeners, PointerMoveListeners,
    PointerUpListeners, listen, on_key_down, on_key_up, on_pointer_down, on_pointer_down_inside, on_pointer_move,
    on_pointer_up,
};
pub use system::{InputSystem, input_of, input_system};
