#![forbid(unsafe_code)]

//! Mock presentation host: mounts, unmounts, and re-render recording.

use std::cell::RefCell;
use std::rc::Rc;

use localstate::{Selector, StateCell, Subscription};

/// One recorded re-render: which view rendered and what it observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRecord<V> {
    pub view: &'static str,
    pub seen: V,
}

/// RAII mount guard. Dropping it unmounts the view: the underlying
/// subscription is released and no further renders are recorded.
#[derive(Debug)]
pub struct Mounted {
    _sub: Subscription,
}

/// A mock host framework tracking re-renders of named views.
///
/// Mounting a view subscribes a callback that appends to a shared, ordered
/// render log; the log's order is the host's render schedule. `V` is the
/// type the views' render functions produce (commonly the observed value
/// itself).
pub struct Host<V> {
    log: Rc<RefCell<Vec<RenderRecord<V>>>>,
}

impl<V: Clone + 'static> Default for Host<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone + 'static> Host<V> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            log: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Mount a view over the raw cell value. Each notification pass
    /// re-renders the view with the new value.
    pub fn mount<T: Clone + PartialEq + 'static>(
        &self,
        view: &'static str,
        cell: &StateCell<T>,
        render: impl Fn(&T) -> V + 'static,
    ) -> Mounted {
        let log = Rc::clone(&self.log);
        let sub = cell.subscribe(move |value| {
            log.borrow_mut().push(RenderRecord {
                view,
                seen: render(value),
            });
        });
        Mounted { _sub: sub }
    }

    /// Mount a view over a projection of the cell value. The view
    /// re-renders only when the projection changes; unrelated mutations
    /// are swallowed by the selector's equality gate.
    pub fn mount_selected<T, K>(
        &self,
        view: &'static str,
        cell: &StateCell<T>,
        select: impl Fn(&T) -> K + 'static,
        render: impl Fn(&K) -> V + 'static,
    ) -> Selector<K>
    where
        T: Clone + PartialEq + 'static,
        K: Clone + PartialEq + 'static,
    {
        let log = Rc::clone(&self.log);
        Selector::bind(cell, select, move |projected| {
            log.borrow_mut().push(RenderRecord {
                view,
                seen: render(projected),
            });
        })
    }

    /// Number of recorded re-renders of `view` (mount itself is not a
    /// render).
    #[must_use]
    pub fn renders(&self, view: &'static str) -> usize {
        self.log.borrow().iter().filter(|r| r.view == view).count()
    }

    /// The full render log, in schedule order.
    #[must_use]
    pub fn records(&self) -> Vec<RenderRecord<V>> {
        self.log.borrow().clone()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
