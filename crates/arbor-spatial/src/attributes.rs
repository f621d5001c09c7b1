//! Transform attribute components.
//!
//! Each attribute is an ordinary component whose payload is one of the
//! types below. An entity without a given attribute behaves as if it had
//! the identity value. Payloads are shared live: writing through any
//! [`Component`](arbor_ecs::Component) handle changes the next composition.

use arbor_ecs::World;
use glam::Vec2;

/// Translation relative to the parent, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position(pub Vec2);

/// Pivot for rotation and scale, in local pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Origin(pub Vec2);

/// Rotation in radians, clockwise-positive in screen space (y down).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rotation(pub f32);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale(pub Vec2);

impl Default for Scale {
    fn default() -> Self {
        Self(Vec2::ONE)
    }
}

/// Extent of the entity's drawable area, centered on its local origin.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Shape(pub Vec2);

impl Shape {
    #[must_use]
    pub fn half_extent(self) -> Vec2 {
        self.0 * 0.5
    }

    /// Whether a local-space point lies inside the shape.
    #[must_use]
    pub fn contains_local(self, point: Vec2) -> bool {
        let half = self.half_extent();
        point.x.abs() <= half.x && point.y.abs() <= half.y
    }
}

pub fn position(x: f32, y: f32) -> impl FnOnce(&mut World) -> eyre::Result<Position> + 'static {
    move |_world| Ok(Position(Vec2::new(x, y)))
}

pub fn origin(x: f32, y: f32) -> impl FnOnce(&mut World) -> eyre::Result<Origin> + 'static {
    move |_world| Ok(Origin(Vec2::new(x, y)))
}

pub fn rotation(radians: f32) -> impl FnOnce(&mut World) -> eyre::Result<Rotation> + 'static {
    move |_world| Ok(Rotation(radians))
}

pub fn scale(x: f32, y: f32) -> impl FnOnce(&mut World) -> eyre::Result<Scale> + 'static {
    move |_world| Ok(Scale(Vec2::new(x, y)))
}

pub fn shape(width: f32, height: f32) -> impl FnOnce(&mut World) -> eyre::Result<Shape> + 'static {
    move |_world| Ok(Shape(Vec2::new(width, height)))
}
