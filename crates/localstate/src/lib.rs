#![forbid(unsafe_code)]

//! Shared state cells with change notification for component UIs.
//!
//! This crate provides the change-tracking primitives that let many
//! independent views read and update one logical value without routing
//! updates through a common ancestor:
//!
//! - [`StateCell`]: A shared, version-tracked value wrapper with change
//!   notification via subscriber callbacks.
//! - [`Subscription`]: RAII guard that automatically unsubscribes on drop.
//! - [`Selector`]: An equality-gated projection over a cell that signals
//!   its observer only when the projected view actually changes.
//! - [`Reduce`]: Tagged-action state transitions dispatched through a cell.
//!
//! # Architecture
//!
//! `StateCell<T>` uses `Rc<RefCell<..>>` for single-threaded shared
//! ownership. Subscribers are stored as `Weak` function pointers and
//! cleaned up lazily during notification. Every notification pass runs
//! against a snapshot of live subscribers; mutations issued from inside a
//! callback are deferred until the pass completes.
//!
//! # Invariants
//!
//! 1. Version increments exactly once per mutation that notifies.
//! 2. Subscribers are notified in registration order.
//! 3. Under the default [`NotifyPolicy::OnChange`], setting a value equal
//!    to the current one is a no-op (no version bump, no notifications).
//! 4. Dropping a [`Subscription`] removes the callback before the next
//!    notification cycle.
//! 5. A mutation issued from inside a notification callback applies only
//!    after the in-progress pass completes, with its own full pass.

pub mod cell;
pub mod reducer;
pub mod selector;

pub use cell::{NotifyPolicy, StateCell, Subscription};
pub use reducer::Reduce;
pub use selector::Selector;
