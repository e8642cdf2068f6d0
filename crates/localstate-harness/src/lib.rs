#![forbid(unsafe_code)]

//! Host-binding fixtures for LocalState.
//!
//! The core crate treats the host UI framework as an external collaborator:
//! the host memoizes cell creation per owner, subscribes on mount,
//! unsubscribes on unmount, and re-renders when notified. This crate
//! provides an in-process stand-in for that collaborator so the whole
//! contract can be exercised deterministically in tests:
//!
//! - [`CellSlot`]: once-initialized, owner-scoped cell handle (the creation
//!   binding's memoization contract).
//! - [`Host`]: mounts views over cells or selectors, recording each
//!   re-render in an ordered log.

pub mod host;
pub mod slot;

pub use host::{Host, Mounted, RenderRecord};
pub use slot::CellSlot;
