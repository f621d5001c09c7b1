//! Input events, client-to-surface mapping and the replay queue.

use std::collections::VecDeque;

use glam::{UVec2, Vec2};

/// Which pointer transition an event represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerKind {
    Move,
    Down,
    Up,
}

/// Pointer event in surface pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub position: Vec2,
    /// Host button index; 0 for moves.
    pub button: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyKind {
    Down,
    Up,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub kind: KeyKind,
    /// Host key name, e.g. `"ArrowLeft"` or `"a"`.
    pub key: String,
    /// Auto-repeat from a held key.
    pub repeat: bool,
}

/// Raw host input in client (layout) coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum RawInput {
    PointerMove { x: f32, y: f32 },
    PointerDown { x: f32, y: f32, button: u8 },
    PointerUp { x: f32, y: f32, button: u8 },
    /// A touch start is replayed as a move followed by a down.
    TouchStart { x: f32, y: f32 },
    TouchEnd { x: f32, y: f32 },
    KeyDown { key: String, repeat: bool },
    KeyUp { key: String },
}

/// Replayable input event.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Pointer(PointerEvent),
    Key(KeyEvent),
}

/// Maps client coordinates onto the render surface's pixel grid.
///
/// The surface may be displayed at a size different from its pixel size;
/// `client_size` is the displayed size and `offset` the displayed top-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceMapping {
    pub offset: Vec2,
    pub client_size: Vec2,
    pub surface_size: UVec2,
}

impl SurfaceMapping {
    /// Mapping for a surface displayed at its own pixel size.
    #[must_use]
    pub fn identity(surface_size: UVec2) -> Self {
        Self {
            offset: Vec2::ZERO,
            client_size: surface_size.as_vec2(),
            surface_size,
        }
    }

    #[must_use]
    pub fn to_surface(&self, client: Vec2) -> Vec2 {
        let relative = client - self.offset;
        if self.client_size.x <= 0.0 || self.client_size.y <= 0.0 {
            return relative;
        }
        relative * (self.surface_size.as_vec2() / self.client_size)
    }
}

impl Default for SurfaceMapping {
    fn default() -> Self {
        Self::identity(UVec2::ZERO)
    }
}

/// Buffered input, bucketed by replay priority.
///
/// Replay order: every pointer move, then pointer down/up in arrival order,
/// then keyboard events in arrival order.
#[derive(Debug, Default)]
pub struct InputQueue {
    moves: VecDeque<PointerEvent>,
    presses: VecDeque<PointerEvent>,
    keys: VecDeque<KeyEvent>,
}

impl InputQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_pointer(&mut self, event: PointerEvent) {
        match event.kind {
            PointerKind::Move => self.moves.push_back(event),
            PointerKind::Down | PointerKind::Up => self.presses.push_back(event),
        }
    }

    pub fn push_key(&mut self, event: KeyEvent) {
        self.keys.push_back(event);
    }

    /// Map and enqueue one raw host event.
    pub fn push_raw(&mut self, raw: RawInput, mapping: &SurfaceMapping) {
        let pointer = |kind, x, y, button| PointerEvent {
            kind,
            position: mapping.to_surface(Vec2::new(x, y)),
            button,
        };

        match raw {
            RawInput::PointerMove { x, y } => self.push_pointer(pointer(PointerKind::Move, x, y, 0)),
            RawInput::PointerDown { x, y, button } => {
                self.push_pointer(pointer(PointerKind::Down, x, y, button));
            }
            RawInput::PointerUp { x, y, button } => self.push_pointer(pointer(PointerKind::Up, x, y, button)),
            RawInput::TouchStart { x, y } => {
                self.push_pointer(pointer(PointerKind::Move, x, y, 0));
                self.push_pointer(pointer(PointerKind::Down, x, y, 0));
            }
            RawInput::TouchEnd { x, y } => self.push_pointer(pointer(PointerKind::Up, x, y, 0)),
            RawInput::KeyDown { key, repeat } => self.push_key(KeyEvent {
                kind: KeyKind::Down,
                key,
                repeat,
            }),
            RawInput::KeyUp { key } => self.push_key(KeyEvent {
                kind: KeyKind::Up,
                key,
                repeat: false,
            }),
        }
    }

    /// Take every buffered event in replay order.
    pub fn drain(&mut self) -> Vec<InputEvent> {
        let mut out = Vec::with_capacity(self.len());
        out.extend(self.moves.drain(..).map(InputEvent::Pointer));
        out.extend(self.presses.drain(..).map(InputEvent::Pointer));
        out.extend(self.keys.drain(..).map(InputEvent::Key));
        out
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.moves.len() + self.presses.len() + self.keys.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(events: &[InputEvent]) -> Vec<&'static str> {
        events
            .iter()
            .map(|event| match event {
                InputEvent::Pointer(p) => match p.kind {
                    PointerKind::Move => "move",
                    PointerKind::Down => "down",
                    PointerKind::Up => "up",
                },
                InputEvent::Key(_) => "key",
            })
            .collect()
    }

    #[test]
    fn test_moves_replay_before_presses() {
        let mapping = SurfaceMapping::identity(UVec2::new(100, 100));
        let mut queue = InputQueue::new();
        queue.push_raw(RawInput::KeyDown { key: "a".into(), repeat: false }, &mapping);
        queue.push_raw(RawInput::PointerDown { x: 1.0, y: 1.0, button: 0 }, &mapping);
        queue.push_raw(RawInput::PointerMove { x: 2.0, y: 2.0 }, &mapping);
        queue.push_raw(RawInput::PointerUp { x: 3.0, y: 3.0, button: 0 }, &mapping);

        assert_eq!(kinds(&queue.drain()), vec!["move", "down", "up", "key"]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_touch_start_is_move_then_down() {
        let mut queue = InputQueue::new();
        queue.push_raw(RawInput::TouchStart { x: 5.0, y: 5.0 }, &SurfaceMapping::default());
        assert_eq!(kinds(&queue.drain()), vec!["move", "down"]);
    }

    #[test]
    fn test_client_coordinates_scale_to_surface() {
        let mapping = SurfaceMapping {
            offset: Vec2::new(10.0, 20.0),
            client_size: Vec2::new(400.0, 300.0),
            surface_size: UVec2::new(800, 600),
        };
        assert_eq!(mapping.to_surface(Vec2::new(110.0, 70.0)), Vec2::new(200.0, 100.0));
    }
}
