//! Arena Allocator - growable slab of nodes addressed by 32-bit indices.
//!
//! Both ordered structures keep their nodes here and link them by index
//! rather than by pointer, so unlinking a node can never leave a dangling
//! reference. Freed slots are threaded into a free list and handed out
//! again in O(1).

use std::fmt;

/// Sentinel value representing an absent link (like nullptr)
pub const NULL_INDEX: u32 = u32::MAX;

/// Type alias for arena indices - our "compressed pointers"
/// Using u32 instead of 64-bit pointers halves link size,
/// which matters for the 17 forward links of a skip-list node.
pub type ArenaIndex = u32;

/// A single storage cell.
///
/// Vacant cells carry the index of the next vacant cell, forming the
/// free list without any side allocation.
enum Slot<T> {
    Occupied(T),
    Vacant(ArenaIndex),
}

/// Index-addressed node pool with O(1) allocation and deallocation.
///
/// Unlike a fixed pool, the arena grows on demand: when the free list is
/// empty a fresh slot is appended to the backing `Vec`.
pub struct Arena<T> {
    /// Contiguous block of slots
    slots: Vec<Slot<T>>,

    /// Head of the free list (index of first vacant slot)
    free_head: ArenaIndex,

    /// Number of currently occupied slots
    allocated_count: u32,
}

impl<T> Arena<T> {
    /// Create an empty arena.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create an empty arena with room for `capacity` nodes before the
    /// backing storage has to grow.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_head: NULL_INDEX,
            allocated_count: 0,
        }
    }

    /// Store `value` and return its index.
    ///
    /// Reuses the most recently freed slot if there is one.
    ///
    /// # Panics
    /// Panics if the arena would need more than `u32::MAX - 1` slots.
    ///
    /// # Complexity
    /// O(1) amortized
    #[inline]
    pub fn alloc(&mut self, value: T) -> ArenaIndex {
        let index = if self.free_head == NULL_INDEX {
            let index = self.slots.len() as u64;
            assert!(index < NULL_INDEX as u64, "Arena index space exhausted");
            self.slots.push(Slot::Occupied(value));
            index as ArenaIndex
        } else {
            let index = self.free_head;
            let slot = &mut self.slots[index as usize];
            self.free_head = match slot {
                Slot::Vacant(next) => *next,
                Slot::Occupied(_) => unreachable!("free list points at an occupied slot"),
            };
            *slot = Slot::Occupied(value);
            index
        };

        self.allocated_count += 1;
        index
    }

    /// Free a slot and return the value it held.
    ///
    /// # Panics
    /// Panics on a double free or an out-of-bounds index.
    ///
    /// # Complexity
    /// O(1) - pushes to head of free list
    #[inline]
    pub fn free(&mut self, index: ArenaIndex) -> T {
        let slot = &mut self.slots[index as usize];
        if let Slot::Vacant(_) = slot {
            panic!("Double free of arena slot {index}");
        }

        let value = match std::mem::replace(slot, Slot::Vacant(self.free_head)) {
            Slot::Occupied(value) => value,
            Slot::Vacant(_) => unreachable!(),
        };
        self.free_head = index;
        self.allocated_count -= 1;
        value
    }

    /// Get an immutable reference to a node.
    ///
    /// # Complexity
    /// O(1) - direct array access
    #[inline]
    pub fn get(&self, index: ArenaIndex) -> &T {
        match &self.slots[index as usize] {
            Slot::Occupied(value) => value,
            Slot::Vacant(_) => panic!("Access to freed arena slot {index}"),
        }
    }

    /// Get a mutable reference to a node.
    ///
    /// # Complexity
    /// O(1) - direct array access
    #[inline]
    pub fn get_mut(&mut self, index: ArenaIndex) -> &mut T {
        match &mut self.slots[index as usize] {
            Slot::Occupied(value) => value,
            Slot::Vacant(_) => panic!("Access to freed arena slot {index}"),
        }
    }

    /// Returns the number of currently allocated nodes.
    #[inline]
    pub fn allocated(&self) -> u32 {
        self.allocated_count
    }

    /// Returns the number of slots ever created (occupied + vacant).
    #[inline]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Returns true if the arena is empty (no allocated nodes).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.allocated_count == 0
    }

    /// Drop every node and forget all slots.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free_head = NULL_INDEX;
        self.allocated_count = 0;
    }
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Arena<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arena")
            .field("slots", &self.slots.len())
            .field("allocated", &self.allocated_count)
            .field("free_head", &self.free_head)
            .finish()
    }
}
