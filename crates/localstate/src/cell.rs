#![forbid(unsafe_code)]

//! Shared state cell with change notification and version tracking.
//!
//! # Design
//!
//! [`StateCell<T>`] wraps a value of type `T` in shared, reference-counted
//! storage (`Rc<RefCell<..>>`). Mutations replace the value wholesale; whether
//! a replacement notifies subscribers is decided by the cell's
//! [`NotifyPolicy`]. Each notification pass runs against a snapshot of live
//! subscribers collected before any callback is invoked, so subscribing or
//! unsubscribing from inside a callback never disturbs the pass in progress.
//!
//! Mutations issued from inside a notification callback are deferred: the
//! running pass completes first, then deferred mutations apply one at a time,
//! each with its own fresh snapshot and full pass.
//!
//! # Performance
//!
//! | Operation     | Complexity                 |
//! |---------------|----------------------------|
//! | `get()`       | O(1) + one clone           |
//! | `set()`       | O(S) where S = subscribers |
//! | `subscribe()` | O(1) amortized             |
//!
//! # Invariants
//!
//! 1. `version` increments by exactly 1 per mutation that notifies.
//! 2. Subscribers are notified in registration order.
//! 3. Under [`NotifyPolicy::OnChange`], committing a value equal to the
//!    current one is a no-op (no assignment, no version bump, no pass).
//! 4. A mutation issued during a pass applies only after that pass finishes;
//!    its updater sees the value current at application time.
//! 5. Dropping a [`Subscription`] removes the callback before the next pass.
//!    A callback already captured in the running snapshot still fires once.
//!
//! # Failure Modes
//!
//! - **Subscriber leak**: `Subscription` guards stored indefinitely
//!   accumulate callbacks. Dead weak references are pruned lazily during
//!   notification.
//! - **Panicking callback**: unwinds through the pass. The committed value
//!   stands (delivery started only after commit), mutations still queued
//!   behind the pass are dropped, and the cell remains usable: the in-pass
//!   flag is reset on unwind, so a host that catches the panic can keep
//!   mutating.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use tracing::trace;

/// A subscriber callback stored as a strong `Rc` inside the guard, handed
/// to the cell as `Weak`.
type CallbackRc<T> = Rc<dyn Fn(&T)>;
type CallbackWeak<T> = Weak<dyn Fn(&T)>;

/// Decides whether committing a value equal to the current one still
/// assigns and notifies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotifyPolicy {
    /// Compare the incoming value against the current one with `PartialEq`;
    /// equal values are dropped without assignment or notification.
    #[default]
    OnChange,
    /// Assign and notify unconditionally, even when the incoming value
    /// equals the current one. Callers use this to force dependent
    /// recomputation with an intentionally identical value.
    Always,
}

/// A mutation captured for deferred application while a pass is running.
enum Mutation<T> {
    Value(T),
    Updater(Box<dyn FnOnce(&T) -> T>),
}

/// Shared interior for [`StateCell<T>`].
struct CellInner<T> {
    value: T,
    version: u64,
    policy: NotifyPolicy,
    /// Subscribers stored as weak references, in registration order.
    /// Dead entries are pruned on notify.
    subscribers: Vec<CallbackWeak<T>>,
    /// True while a notification pass is delivering callbacks.
    notifying: bool,
    /// Mutations issued from inside a pass, applied FIFO afterwards.
    deferred: VecDeque<Mutation<T>>,
}

/// A shared, version-tracked value with change notification.
///
/// Cloning a `StateCell` creates a new handle to the **same** inner state —
/// both handles see the same value and share subscribers. The cell is
/// single-threaded by construction (`Rc`-based); parallel use requires an
/// external exclusive lock and a `Send`-able rebuild, which this crate does
/// not provide.
///
/// # Invariants
///
/// 1. `version` increments by exactly 1 on each notifying mutation.
/// 2. Under [`NotifyPolicy::OnChange`], `set(v)` where `v == current` is a
///    no-op.
/// 3. Subscribers are notified in registration order.
/// 4. Dead subscribers (dropped [`Subscription`] guards) are pruned lazily.
pub struct StateCell<T> {
    inner: Rc<RefCell<CellInner<T>>>,
}

// Manual Clone: shares the same Rc.
impl<T> Clone for StateCell<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for StateCell<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("StateCell")
            .field("value", &inner.value)
            .field("version", &inner.version)
            .field("policy", &inner.policy)
            .field("subscriber_count", &inner.subscribers.len())
            .finish()
    }
}

impl<T: Clone + PartialEq + 'static> StateCell<T> {
    /// Create a new cell with the given initial value and the default
    /// [`NotifyPolicy::OnChange`] policy.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self::with_policy(value, NotifyPolicy::default())
    }

    /// Create a new cell whose initial value is computed lazily.
    ///
    /// `init` is invoked exactly once, here. Owners that re-run their
    /// creation path on every render keep the cell in a once-initialized
    /// slot (see the harness crate's `CellSlot`) so this constructor runs
    /// a single time per owner lifetime.
    #[must_use]
    pub fn new_with(init: impl FnOnce() -> T) -> Self {
        Self::with_policy(init(), NotifyPolicy::default())
    }

    /// Create a new cell with an explicit notification policy.
    ///
    /// The policy is fixed for the cell's lifetime.
    #[must_use]
    pub fn with_policy(value: T, policy: NotifyPolicy) -> Self {
        Self {
            inner: Rc::new(RefCell::new(CellInner {
                value,
                version: 0,
                policy,
                subscribers: Vec::new(),
                notifying: false,
                deferred: VecDeque::new(),
            })),
        }
    }

    /// Get a clone of the current value. No side effects.
    #[must_use]
    pub fn get(&self) -> T {
        self.inner.borrow().value.clone()
    }

    /// Access the current value by reference without cloning.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.borrow().value)
    }

    /// The cell's notification policy.
    #[must_use]
    pub fn policy(&self) -> NotifyPolicy {
        self.inner.borrow().policy
    }

    /// Current version number. Increments by 1 on each notifying mutation.
    /// Useful for dirty-checking in render loops.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    /// Number of registered subscriber entries, including dead ones not
    /// yet pruned.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }

    /// Replace the value. Whether subscribers are notified is decided by
    /// the cell's [`NotifyPolicy`].
    ///
    /// Safe to call from inside a subscriber callback: the mutation is
    /// deferred until the in-progress pass completes, then applied with its
    /// own full pass.
    pub fn set(&self, value: T) {
        self.apply(Mutation::Value(value));
    }

    /// Replace the value with the result of `f` applied to the current
    /// value. The current value is never handed out mutably; `f` returns a
    /// new value that replaces it wholesale.
    ///
    /// When called from inside a subscriber callback, `f` runs after the
    /// in-progress pass completes, against the value current at that point.
    pub fn update(&self, f: impl FnOnce(&T) -> T + 'static) {
        self.apply(Mutation::Updater(Box::new(f)));
    }

    /// Subscribe to value changes. The callback is invoked with a reference
    /// to the new value on each notification pass.
    ///
    /// Returns a [`Subscription`] guard. Dropping the guard unsubscribes
    /// the callback. The same observer may hold several guards at once;
    /// each is a distinct registry entry with its own lifetime.
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let strong: CallbackRc<T> = Rc::new(callback);
        let weak = Rc::downgrade(&strong);
        self.inner.borrow_mut().subscribers.push(weak);
        // Wrap in a holder that can be type-erased as `dyn Any`, since
        // `Rc<dyn Fn(&T)>` cannot directly coerce to `Rc<dyn Any>`.
        Subscription {
            _guard: Box::new(strong),
        }
    }

    /// Subscribe without a payload. The callback is invoked once per
    /// notification pass and is expected to re-read the cell (or a selector
    /// over it) itself.
    pub fn watch(&self, callback: impl Fn() + 'static) -> Subscription {
        self.subscribe(move |_| callback())
    }

    /// Apply a mutation now, or defer it if a pass is in progress. The
    /// outermost call drains the deferred queue, so nested mutations
    /// serialize strictly after the pass that spawned them.
    fn apply(&self, mutation: Mutation<T>) {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.notifying {
                trace!("mutation deferred behind in-progress notification pass");
                inner.deferred.push_back(mutation);
                return;
            }
            inner.notifying = true;
        }
        // Resets the in-pass flag on every exit path, unwind included: a
        // panicking callback must not leave the cell deferring forever.
        let _reset = NotifyReset { inner: &self.inner };
        let mut next = Some(mutation);
        while let Some(mutation) = next {
            if self.commit(mutation) {
                self.run_pass();
            }
            next = self.inner.borrow_mut().deferred.pop_front();
        }
    }

    /// Commit one mutation. Returns true when subscribers should be
    /// notified.
    fn commit(&self, mutation: Mutation<T>) -> bool {
        let next = match mutation {
            Mutation::Value(v) => v,
            Mutation::Updater(f) => {
                // Evaluate outside the borrow so the updater may read the
                // cell (get/with) without tripping RefCell.
                let current = self.inner.borrow().value.clone();
                f(&current)
            }
        };
        let mut inner = self.inner.borrow_mut();
        if inner.policy == NotifyPolicy::OnChange && inner.value == next {
            trace!(version = inner.version, "value unchanged, skipping pass");
            return false;
        }
        inner.value = next;
        inner.version += 1;
        trace!(version = inner.version, "value committed");
        true
    }

    /// Deliver one notification pass against a snapshot of live
    /// subscribers, pruning dead entries first.
    fn run_pass(&self) {
        let callbacks: Vec<CallbackRc<T>> = {
            let mut inner = self.inner.borrow_mut();
            inner.subscribers.retain(|w| w.strong_count() > 0);
            inner
                .subscribers
                .iter()
                .filter_map(|w| w.upgrade())
                .collect()
        };
        let value = self.inner.borrow().value.clone();
        trace!(subscribers = callbacks.len(), "notification pass");
        // Callbacks run with no borrow held; re-entrant reads, subscribes,
        // unsubscribes, and (deferred) mutations are all legal here.
        for cb in &callbacks {
            cb(&value);
        }
    }
}

/// Clears the in-pass state when the outermost `apply` exits, normally or
/// by unwind. Mutations still queued behind an abandoned pass are dropped.
struct NotifyReset<'a, T> {
    inner: &'a Rc<RefCell<CellInner<T>>>,
}

impl<T> Drop for NotifyReset<'_, T> {
    fn drop(&mut self) {
        let mut inner = self.inner.borrow_mut();
        inner.notifying = false;
        inner.deferred.clear();
    }
}

/// RAII guard for a subscriber callback.
///
/// Dropping the `Subscription` causes the callback to become unreachable:
/// the strong `Rc` is dropped, so the `Weak` in the cell's registry fails
/// to upgrade on the next pass. A callback captured in an already-running
/// pass snapshot still fires for that pass.
pub struct Subscription {
    /// Type-erased strong reference keeping the callback `Rc` alive.
    _guard: Box<dyn std::any::Any>,
}

impl Subscription {
    /// Deregister the callback. Equivalent to dropping the guard; provided
    /// for call sites where an explicit verb reads better than `drop`.
    pub fn unsubscribe(self) {}
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
