//! Instance context stack.
//!
//! Tracks which component instance is currently executing so that hook
//! functions can resolve their target without being handed it. The stack is
//! owned by the [`World`](crate::World); regions are entered through
//! [`World::with_instance`](crate::World::with_instance).

use smallvec::SmallVec;

use crate::entity::ComponentId;
use crate::error::{SceneError, SceneResult};

/// Stack of active component instances. Top is the current instance.
#[derive(Debug, Default)]
pub struct InstanceStack {
    frames: SmallVec<[ComponentId; 8]>,
}

impl InstanceStack {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Push `instance`, returning the depth to restore on exit.
    pub fn enter(&mut self, instance: ComponentId) -> usize {
        let depth = self.frames.len();
        self.frames.push(instance);
        depth
    }

    /// Restore the stack to `depth`.
    ///
    /// Truncating rather than popping once keeps the stack balanced even if
    /// a nested region exited without unwinding its own frame.
    pub fn exit(&mut self, depth: usize) {
        self.frames.truncate(depth);
    }

    /// The current instance.
    pub fn current(&self) -> SceneResult<ComponentId> {
        self.frames.last().copied().ok_or(SceneError::NoActiveInstance)
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Generation, Slot};

    fn id(index: u32) -> ComponentId {
        ComponentId::from_slot(Slot::new(index, Generation::new()))
    }

    #[test]
    fn test_empty_stack_has_no_instance() {
        let stack = InstanceStack::new();
        assert_eq!(stack.current(), Err(SceneError::NoActiveInstance));
    }

    #[test]
    fn test_nested_regions() {
        let mut stack = InstanceStack::new();
        let outer = stack.enter(id(1));
        let inner = stack.enter(id(2));
        assert_eq!(stack.current(), Ok(id(2)));

        stack.exit(inner);
        assert_eq!(stack.current(), Ok(id(1)));

        stack.exit(outer);
        assert!(stack.is_empty());
    }

    #[test]
    fn test_exit_restores_depth_past_leaked_frames() {
        let mut stack = InstanceStack::new();
        let outer = stack.enter(id(1));
        stack.enter(id(2));
        stack.enter(id(3));

        stack.exit(outer);
        assert_eq!(stack.depth(), 0);
    }
}
