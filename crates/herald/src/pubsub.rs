//! Statically typed publisher/subscriber.
//!
//! A parallel to [`Emitter`](crate::Emitter) without type erasure: the
//! publisher keeps direct weak back-references to its subscribers and calls
//! them through their own type, usually a trait object.
//!
//! ```rust
//! use herald::pubsub::{Publisher, Subscription};
//! use std::cell::{Cell, RefCell};
//! use std::rc::Rc;
//!
//! trait Greeter {
//!     fn greet(&self);
//! }
//!
//! #[derive(Default)]
//! struct Counter { greeted: Cell<u32>, link: RefCell<Option<Subscription<dyn Greeter>>> }
//!
//! impl Greeter for Counter {
//!     fn greet(&self) { self.greeted.set(self.greeted.get() + 1); }
//! }
//!
//! let publisher: Publisher<dyn Greeter> = Publisher::new();
//! let counter = Rc::new(Counter::default());
//! let as_greeter: Rc<dyn Greeter> = counter.clone();
//! *counter.link.borrow_mut() = publisher.subscribe(&as_greeter);
//! drop(as_greeter);
//!
//! publisher.notify(|s| s.greet());
//! assert_eq!(counter.greeted.get(), 1);
//!
//! drop(counter);
//! assert!(publisher.is_empty());
//! ```

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

/// One subscribe call. `token` tells it apart from later subscriptions of
/// the same subscriber.
struct Entry<S: ?Sized> {
    token: u64,
    subscriber: Weak<S>,
}

impl<S: ?Sized> Entry<S> {
    fn is(&self, subscriber: *const S) -> bool {
        std::ptr::addr_eq(self.subscriber.as_ptr(), subscriber)
    }
}

struct Subscribers<S: ?Sized> {
    entries: RefCell<Vec<Entry<S>>>,
    last_token: Cell<u64>,
}

impl<S: ?Sized> Subscribers<S> {
    fn holds(&self, token: u64) -> bool {
        self.entries.borrow().iter().any(|entry| entry.token == token)
    }
}

/// Fans calls out to subscribers, in the order they subscribed.
pub struct Publisher<S: ?Sized> {
    subscribers: Rc<Subscribers<S>>,
}

impl<S: ?Sized> Publisher<S> {
    /// Creates a publisher with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            subscribers: Rc::new(Subscribers { entries: RefCell::new(Vec::new()), last_token: Cell::new(0) }),
        }
    }

    /// Adds `subscriber` after the existing ones.
    ///
    /// Returns `None` if it is already subscribed. The returned
    /// [`Subscription`] belongs to the subscriber: dropping it unsubscribes.
    pub fn subscribe(&self, subscriber: &Rc<S>) -> Option<Subscription<S>> {
        let mut entries = self.subscribers.entries.borrow_mut();
        if entries.iter().any(|entry| entry.is(Rc::as_ptr(subscriber))) {
            return None;
        }
        let token = self.subscribers.last_token.get() + 1;
        self.subscribers.last_token.set(token);
        entries.push(Entry { token, subscriber: Rc::downgrade(subscriber) });
        Some(Subscription { publisher: Rc::downgrade(&self.subscribers), token })
    }

    /// Removes `subscriber`. Returns whether it was subscribed.
    pub fn unsubscribe(&self, subscriber: &Rc<S>) -> bool {
        let mut entries = self.subscribers.entries.borrow_mut();
        let before = entries.len();
        entries.retain(|entry| !entry.is(Rc::as_ptr(subscriber)));
        entries.len() != before
    }

    /// Calls `f` on every live subscriber, returning how many were called.
    ///
    /// Works on a snapshot: subscribers added or removed by `f` take effect
    /// on the next call.
    pub fn notify(&self, mut f: impl FnMut(&S)) -> usize {
        let snapshot = self.subscribers();
        for subscriber in &snapshot {
            f(subscriber);
        }
        snapshot.len()
    }

    /// Live subscribers, in subscription order.
    #[must_use]
    pub fn subscribers(&self) -> Vec<Rc<S>> {
        self.subscribers.entries.borrow().iter().filter_map(|entry| entry.subscriber.upgrade()).collect()
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.prune();
        self.subscribers.entries.borrow().len()
    }

    /// Whether no live subscriber remains.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn prune(&self) {
        self.subscribers.entries.borrow_mut().retain(|entry| entry.subscriber.strong_count() > 0);
    }
}

impl<S: ?Sized> Default for Publisher<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: ?Sized> fmt::Debug for Publisher<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Publisher").field("subscribers", &self.subscribers.entries.borrow().len()).finish()
    }
}

/// A subscriber's link back to its publisher.
///
/// Tied to the one subscribe call that produced it: after an unsubscribe
/// and a fresh subscribe, the old subscription no longer touches the new
/// entry.
pub struct Subscription<S: ?Sized> {
    publisher: Weak<Subscribers<S>>,
    token: u64,
}

impl<S: ?Sized> Subscription<S> {
    /// Whether the publisher still exists and still holds this subscription.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.publisher.upgrade().is_some_and(|subscribers| subscribers.holds(self.token))
    }
}

impl<S: ?Sized> Drop for Subscription<S> {
    fn drop(&mut self) {
        if let Some(subscribers) = self.publisher.upgrade() {
            subscribers.entries.borrow_mut().retain(|entry| entry.token != self.token);
        }
    }
}

impl<S: ?Sized> fmt::Debug for Subscription<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("attached", &self.is_attached()).finish()
    }
}
