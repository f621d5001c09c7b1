//! Render surface collaborator.

use std::cell::RefCell;
use std::rc::Rc;

use glam::{Affine2, UVec2, Vec2};

/// RGBA color, 8 bits per channel.
pub type Rgba = [u8; 4];

/// A 2D drawing surface owned by the host.
///
/// The runtime only clears it and sets the transform before each draw
/// callback; the drawing calls are issued by user draw callbacks.
pub trait RenderSurface {
    /// Size in pixels.
    fn size(&self) -> UVec2;

    fn clear(&mut self);

    /// Transform applied to subsequent drawing calls.
    fn set_transform(&mut self, _transform: Affine2) {}

    /// Fill a rectangle from the current origin.
    fn fill_rect(&mut self, _size: Vec2, _color: Rgba) {}

    /// Draw text at the current origin.
    fn fill_text(&mut self, _text: &str, _color: Rgba) {}
}

/// One call recorded by [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear,
    Rect { transform: Affine2, size: Vec2, color: Rgba },
    Text { transform: Affine2, text: String, color: Rgba },
}

#[derive(Debug, Default)]
struct RecordingInner {
    transform: Affine2,
    commands: Vec<DrawCommand>,
}

/// Headless surface that records drawing calls.
///
/// Cloneable handle: the runtime owns one clone, the embedder inspects
/// another.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    size: UVec2,
    inner: Rc<RefCell<RecordingInner>>,
}

impl RecordingSurface {
    #[must_use]
    pub fn new(size: UVec2) -> Self {
        Self {
            size,
            inner: Rc::default(),
        }
    }

    /// Commands recorded since the last clear.
    #[must_use]
    pub fn commands(&self) -> Vec<DrawCommand> {
        self.inner.borrow().commands.clone()
    }

    /// Text drawn since the last clear, in drawing order.
    #[must_use]
    pub fn texts(&self) -> Vec<String> {
        self.inner
            .borrow()
            .commands
            .iter()
            .filter_map(|command| match command {
                DrawCommand::Text { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }
}

impl RenderSurface for RecordingSurface {
    fn size(&self) -> UVec2 {
        self.size
    }

    fn clear(&mut self) {
        let mut inner = self.inner.borrow_mut();
        inner.commands.clear();
        inner.commands.push(DrawCommand::Clear);
        inner.transform = Affine2::IDENTITY;
    }

    fn set_transform(&mut self, transform: Affine2) {
        self.inner.borrow_mut().transform = transform;
    }

    fn fill_rect(&mut self, size: Vec2, color: Rgba) {
        let mut inner = self.inner.borrow_mut();
        let transform = inner.transform;
        inner.commands.push(DrawCommand::Rect { transform, size, color });
    }

    fn fill_text(&mut self, text: &str, color: Rgba) {
        let mut inner = self.inner.borrow_mut();
        let transform = inner.transform;
        inner.commands.push(DrawCommand::Text {
            transform,
            text: text.to_owned(),
            color,
        });
    }
}
