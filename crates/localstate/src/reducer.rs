#![forbid(unsafe_code)]

//! Reducer-style dispatch over a [`StateCell`].
//!
//! Actions are caller-defined enums; `reduce` matches on them exhaustively,
//! so a reducer that forgets an action kind is a compile error rather than
//! a silent state corruption. Dispatch forwards through the cell's mutator,
//! inheriting its notification policy and re-entrancy serialization: a
//! dispatch issued from inside a notification callback applies after the
//! in-progress pass, against the value current at that point.

use crate::cell::StateCell;

/// A pure state transition: current value plus an action yields the next
/// value. Implementations must be total over their action enum (the
/// compiler enforces this through match exhaustiveness) and must not
/// observe or mutate anything but their inputs.
pub trait Reduce: Sized {
    /// The action vocabulary for this state type.
    type Action;

    /// Compute the next state. Never mutates in place.
    fn reduce(&self, action: Self::Action) -> Self;
}

impl<T> StateCell<T>
where
    T: Reduce + Clone + PartialEq + 'static,
    T::Action: 'static,
{
    /// Apply `action` through the state's [`Reduce`] implementation and
    /// commit the result under the cell's notification policy.
    pub fn dispatch(&self, action: T::Action) {
        self.update(move |value| value.reduce(action));
    }
}

impl<T: Clone + PartialEq + 'static> StateCell<T> {
    /// Apply an ad-hoc reducer function. Equivalent to
    /// `update(|v| reducer(v, action))`; useful when the reducer is not
    /// worth a trait impl.
    pub fn dispatch_with<A: 'static>(
        &self,
        reducer: impl FnOnce(&T, A) -> T + 'static,
        action: A,
    ) {
        self.update(move |value| reducer(value, action));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[derive(Clone, Copy, PartialEq, Debug)]
    struct Counter(i32);

    #[derive(Clone, Copy)]
    enum CounterAction {
        Increment,
        DblIncrement,
        Reset,
    }

    impl Reduce for Counter {
        type Action = CounterAction;

        fn reduce(&self, action: CounterAction) -> Self {
            match action {
                CounterAction::Increment => Counter(self.0 + 1),
                CounterAction::DblIncrement => Counter(self.0 + 2),
                CounterAction::Reset => Counter(0),
            }
        }
    }

    #[test]
    fn dispatch_applies_reducer() {
        let cell = StateCell::new(Counter(100));
        cell.dispatch(CounterAction::Increment);
        assert_eq!(cell.get(), Counter(101));
        cell.dispatch(CounterAction::DblIncrement);
        assert_eq!(cell.get(), Counter(103));
        cell.dispatch(CounterAction::Reset);
        assert_eq!(cell.get(), Counter(0));
    }

    #[test]
    fn dispatch_notifies_like_any_mutation() {
        let cell = StateCell::new(Counter(0));
        let count = Rc::new(Cell::new(0u32));
        let count_clone = Rc::clone(&count);
        let _sub = cell.subscribe(move |_| count_clone.set(count_clone.get() + 1));

        cell.dispatch(CounterAction::Increment);
        assert_eq!(count.get(), 1);

        // Identity transition under OnChange: no notification.
        cell.dispatch(CounterAction::Reset);
        cell.dispatch(CounterAction::Reset);
        assert_eq!(count.get(), 2);
        assert_eq!(cell.version(), 2);
    }

    #[test]
    fn dispatch_with_matches_update_equivalence() {
        let reducer = |c: &Counter, delta: i32| Counter(c.0 + delta);

        let via_dispatch = StateCell::new(Counter(5));
        let via_update = StateCell::new(Counter(5));

        for delta in [3, -2, 0, 7] {
            via_dispatch.dispatch_with(reducer, delta);
            via_update.update(move |c| reducer(c, delta));
        }

        assert_eq!(via_dispatch.get(), via_update.get());
        assert_eq!(via_dispatch.version(), via_update.version());
    }

    #[test]
    fn dispatch_from_callback_sees_settled_value() {
        let cell = StateCell::new(Counter(0));
        let cell_inner = cell.clone();
        let _sub = cell.subscribe(move |c| {
            if c.0 == 1 {
                // Deferred behind the outer pass; the reducer reads the
                // value current when it finally applies.
                cell_inner.dispatch(CounterAction::DblIncrement);
            }
        });

        cell.dispatch(CounterAction::Increment);
        assert_eq!(cell.get(), Counter(3));
        assert_eq!(cell.version(), 2);
    }
}
