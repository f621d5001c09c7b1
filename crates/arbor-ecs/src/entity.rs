//! Entity and component handles with generational indices.
//!
//! Both entities and component instances live in slabs owned by the
//! [`World`](crate::World). Handles pair a slot index with a generation so
//! that a handle kept past `destroy` is detected instead of silently
//! resolving to whatever reused the slot.

use std::fmt;

/// Generation counter to detect stale handles.
/// Incremented each time a slot is recycled.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Generation(u32);

impl Generation {
    /// Create a new generation (starts at 0).
    #[must_use]
    pub const fn new() -> Self {
        Self(0)
    }

    /// Increment the generation counter.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Debug for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gen{}", self.0)
    }
}

/// Raw slot index.
pub type SlotIndex = u32;

/// A slot index paired with the generation it was allocated under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Slot {
    index: SlotIndex,
    generation: Generation,
}

impl Slot {
    #[must_use]
    pub const fn new(index: SlotIndex, generation: Generation) -> Self {
        Self { index, generation }
    }

    #[must_use]
    pub const fn index(self) -> SlotIndex {
        self.index
    }

    #[must_use]
    pub const fn generation(self) -> Generation {
        self.generation
    }
}

/// A node of the scene tree.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Entity(Slot);

impl Entity {
    #[must_use]
    pub const fn from_slot(slot: Slot) -> Self {
        Self(slot)
    }

    #[must_use]
    pub const fn slot(self) -> Slot {
        self.0
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({}v{})", self.0.index, self.0.generation.0)
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.0.index, self.0.generation.0)
    }
}

/// A live component instance.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComponentId(Slot);

impl ComponentId {
    #[must_use]
    pub const fn from_slot(slot: Slot) -> Self {
        Self(slot)
    }

    #[must_use]
    pub const fn slot(self) -> Slot {
        self.0
    }
}

impl fmt::Debug for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Component({}v{})", self.0.index, self.0.generation.0)
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}v{}", self.0.index, self.0.generation.0)
    }
}

/// Slab of generational slots.
///
/// Maintains a free list of recycled slots and the values stored in live
/// ones. A lookup with a stale generation returns `None`.
pub struct Slab<T> {
    generations: Vec<Generation>,
    values: Vec<Option<T>>,
    free_list: Vec<SlotIndex>,
    alive_count: u32,
}

impl<T> Default for Slab<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Slab<T> {
    /// Create an empty slab.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            generations: Vec::new(),
            values: Vec::new(),
            free_list: Vec::new(),
            alive_count: 0,
        }
    }

    /// Store a value, reusing a recycled slot when one is available.
    pub fn insert(&mut self, value: T) -> Slot {
        self.alive_count += 1;

        if let Some(index) = self.free_list.pop() {
            let generation = self.generations[index as usize];
            self.values[index as usize] = Some(value);
            Slot::new(index, generation)
        } else {
            let index = self.generations.len() as SlotIndex;
            self.generations.push(Generation::new());
            self.values.push(Some(value));
            Slot::new(index, Generation::new())
        }
    }

    /// Remove the value in `slot`, making the slot available for reuse.
    pub fn remove(&mut self, slot: Slot) -> Option<T> {
        if !self.contains(slot) {
            return None;
        }
        let index = slot.index() as usize;

        // Invalidate outstanding handles
        self.generations[index] = self.generations[index].next();
        self.free_list.push(slot.index());
        self.alive_count -= 1;
        self.values[index].take()
    }

    /// Check whether `slot` refers to a live value.
    #[must_use]
    pub fn contains(&self, slot: Slot) -> bool {
        let index = slot.index() as usize;
        index < self.generations.len()
            && self.generations[index] == slot.generation()
            && self.values[index].is_some()
    }

    #[must_use]
    pub fn get(&self, slot: Slot) -> Option<&T> {
        if self.generations.get(slot.index() as usize) != Some(&slot.generation()) {
            return None;
        }
        self.values[slot.index() as usize].as_ref()
    }

    pub fn get_mut(&mut self, slot: Slot) -> Option<&mut T> {
        if self.generations.get(slot.index() as usize) != Some(&slot.generation()) {
            return None;
        }
        self.values[slot.index() as usize].as_mut()
    }

    /// Number of live values.
    #[must_use]
    pub const fn len(&self) -> u32 {
        self.alive_count
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.alive_count == 0
    }
}
