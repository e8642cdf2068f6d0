#![forbid(unsafe_code)]

//! Owner-scoped, once-initialized cell storage.

use std::cell::RefCell;

use localstate::StateCell;

/// A once-initialized slot holding a [`StateCell`].
///
/// An owner that re-runs its creation path on every render keeps one
/// `CellSlot` in its own persistent storage; `get_or_init` creates the cell
/// on the first call and returns the same cell thereafter, so the cell's
/// identity is stable for the owner's lifetime. Deliberately not
/// process-wide: each owner holds its own slot, keeping cells independently
/// testable and destroyable.
pub struct CellSlot<T> {
    cell: RefCell<Option<StateCell<T>>>,
}

impl<T> Default for CellSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> CellSlot<T> {
    /// An empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cell: RefCell::new(None),
        }
    }

    /// Whether the slot already holds a cell.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.cell.borrow().is_some()
    }

    /// Return the slot's cell, creating it with `make` on the first call.
    /// Subsequent calls ignore `make` and hand back the same cell.
    pub fn get_or_init(&self, make: impl FnOnce() -> StateCell<T>) -> StateCell<T> {
        let mut slot = self.cell.borrow_mut();
        slot.get_or_insert_with(make).clone()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
