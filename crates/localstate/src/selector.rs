#![forbid(unsafe_code)]

//! Derived projections over a [`StateCell`], gated by equality.
//!
//! # Design
//!
//! [`Selector<K>`] binds a pure projection function to a cell. On every raw
//! notification it recomputes the projection and compares it (`PartialEq`)
//! against the cached previous result; only a differing projection updates
//! the cache and signals the selector's own observer. Many observers can
//! derive cheap scalar views over one shared value without a re-render
//! fan-out proportional to the number of unrelated mutations.
//!
//! # Invariants
//!
//! 1. The cached projection always equals `select` applied to the cell
//!    value as of the last raw notification (or bind time).
//! 2. The observer is signalled exactly once per projection change, never
//!    for a raw change that leaves the projection equal.
//! 3. Dropping the `Selector` tears down its raw subscription; the observer
//!    is never signalled afterwards.
//!
//! # Failure Modes
//!
//! - **Impure selector**: a `select` returning different results for the
//!   same input degrades the gate to firing on almost every mutation. This
//!   is a caller contract, not guarded here.

use std::cell::RefCell;
use std::rc::Rc;

use crate::cell::{StateCell, Subscription};

/// A derived, equality-gated view over a [`StateCell`].
///
/// Holds the last observed projection and the raw subscription keeping the
/// binding alive. Dropping the selector unsubscribes.
pub struct Selector<K> {
    last: Rc<RefCell<K>>,
    _sub: Subscription,
}

impl<K: std::fmt::Debug> std::fmt::Debug for Selector<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Selector")
            .field("current", &self.last.borrow())
            .finish_non_exhaustive()
    }
}

impl<K: Clone + PartialEq + 'static> Selector<K> {
    /// Bind a projection to `cell`.
    ///
    /// The initial projection is computed immediately and becomes the first
    /// gate reference. `signal` is invoked with each *changed* projection;
    /// raw mutations that leave the projection equal are swallowed.
    pub fn bind<T: Clone + PartialEq + 'static>(
        cell: &StateCell<T>,
        select: impl Fn(&T) -> K + 'static,
        signal: impl Fn(&K) + 'static,
    ) -> Self {
        let last = Rc::new(RefCell::new(cell.with(|v| select(v))));
        let last_cb = Rc::clone(&last);
        let sub = cell.subscribe(move |value| {
            let projected = select(value);
            let changed = *last_cb.borrow() != projected;
            if changed {
                *last_cb.borrow_mut() = projected.clone();
                // No borrow held here: the observer may re-read current().
                signal(&projected);
            }
        });
        Self { last, _sub: sub }
    }

    /// The last observed projection.
    #[must_use]
    pub fn current(&self) -> K {
        self.last.borrow().clone()
    }

    /// Tear down the binding. Equivalent to dropping the selector.
    pub fn unsubscribe(self) {}
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
