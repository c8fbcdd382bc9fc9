//! Explicit publish/subscribe change notification.
//!
//! Every observable part of the model owns a [`ChangeStream`]. Subscribing
//! returns a [`Subscription`] guard that owns the listener; the stream only
//! keeps a weak slot, so dropping the guard unsubscribes and dead slots are
//! pruned on the next emit. Observers never keep the observed object alive
//! through the stream.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::types::PropertyValue;

type Listener<E> = dyn Fn(&E);

/// Single-threaded event stream.
///
/// # Examples
///
/// ```
/// use std::cell::Cell;
/// use std::rc::Rc;
/// use json_form_core::ChangeStream;
///
/// let stream = ChangeStream::<u32>::new();
/// let seen = Rc::new(Cell::new(0));
///
/// let sink = Rc::clone(&seen);
/// let subscription = stream.subscribe(move |n| sink.set(sink.get() + n));
/// stream.emit(&2);
/// assert_eq!(seen.get(), 2);
///
/// drop(subscription);
/// stream.emit(&5);
/// assert_eq!(seen.get(), 2);
/// ```
pub struct ChangeStream<E> {
    listeners: RefCell<Vec<Weak<Listener<E>>>>,
}

impl<E: 'static> ChangeStream<E> {
    pub fn new() -> Self {
        Self {
            listeners: RefCell::new(Vec::new()),
        }
    }

    /// Registers `listener` for as long as the returned guard lives.
    #[must_use = "dropping the subscription unsubscribes the listener"]
    pub fn subscribe(&self, listener: impl Fn(&E) + 'static) -> Subscription<E> {
        let listener: Rc<Listener<E>> = Rc::new(listener);
        self.listeners.borrow_mut().push(Rc::downgrade(&listener));
        Subscription {
            _listener: listener,
        }
    }

    /// Delivers `event` to every live listener, in subscription order.
    ///
    /// Listeners may subscribe or emit from inside the callback; they see
    /// the listener set as it was when this emit started.
    pub fn emit(&self, event: &E) {
        let live: Vec<Rc<Listener<E>>> = {
            let mut listeners = self.listeners.borrow_mut();
            listeners.retain(|slot| slot.strong_count() > 0);
            listeners.iter().filter_map(Weak::upgrade).collect()
        };
        for listener in live {
            listener(event);
        }
    }

    /// Number of live listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners
            .borrow()
            .iter()
            .filter(|slot| slot.strong_count() > 0)
            .count()
    }
}

impl<E: 'static> Default for ChangeStream<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for ChangeStream<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeStream")
            .field("slots", &self.listeners.borrow().len())
            .finish()
    }
}

/// Keeps a listener registered; dropping it unsubscribes.
pub struct Subscription<E> {
    _listener: Rc<Listener<E>>,
}

impl<E> fmt::Debug for Subscription<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

/// One write into an [`ObjectModel`](crate::ObjectModel).
///
/// Every mutation produces exactly one event, which carries enough to undo
/// it (see [`ObjectModel::revert`](crate::ObjectModel::revert)).
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEvent {
    pub property: String,
    pub old_value: PropertyValue,
    pub new_value: PropertyValue,
}

/// Notification raised by a [`PropertyModel`](crate::PropertyModel).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyChange {
    /// `value()` may return something different now.
    Value,
    /// `has_value()` may return something different now.
    HasValue,
}

/// Structural change of a [`TokenList`](crate::TokenList).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListChange {
    Inserted(usize),
    Removed(usize),
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    #[test]
    fn test_listeners_run_in_subscription_order() {
        let stream = ChangeStream::<&'static str>::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let first_log = Rc::clone(&log);
        let _first = stream.subscribe(move |e| first_log.borrow_mut().push(format!("a:{e}")));
        let second_log = Rc::clone(&log);
        let _second = stream.subscribe(move |e| second_log.borrow_mut().push(format!("b:{e}")));

        stream.emit(&"x");
        assert_eq!(*log.borrow(), ["a:x", "b:x"]);
    }

    #[test]
    fn test_dropped_subscriptions_are_pruned() {
        let stream = ChangeStream::<()>::new();
        let a = stream.subscribe(|_| {});
        let b = stream.subscribe(|_| {});
        assert_eq!(stream.listener_count(), 2);

        drop(a);
        assert_eq!(stream.listener_count(), 1);
        stream.emit(&());
        assert_eq!(stream.listeners.borrow().len(), 1);
        drop(b);
        assert_eq!(stream.listener_count(), 0);
    }

    #[test]
    fn test_listener_may_subscribe_during_emit() {
        let stream = Rc::new(ChangeStream::<u8>::new());
        let held = Rc::new(RefCell::new(Vec::new()));

        let inner_stream = Rc::clone(&stream);
        let inner_held = Rc::clone(&held);
        let _outer = stream.subscribe(move |_| {
            let guard = inner_stream.subscribe(|_| {});
            inner_held.borrow_mut().push(guard);
        });

        stream.emit(&1);
        assert_eq!(stream.listener_count(), 2);
    }
}
