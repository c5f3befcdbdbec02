//! Channel Module - Typed synchronous notification channel
//!
//! The one pub/sub primitive shared by every service:
//! - Content changes (`ContentStore`)
//! - Edit-mode changes (`EditMode`)
//! - Key events (`InputSource`)
//!
//! Delivery is synchronous and in registration order. There is no
//! de-duplication: every `emit` reaches every listener.
//!
//! # Example
//!
//! ```ignore
//! use inline_cms::state::Channel;
//!
//! let channel: Channel<bool> = Channel::new();
//! let sub = channel.subscribe(|value| println!("now {value}"));
//! channel.emit(&true);
//! sub.unsubscribe();
//! ```

use std::cell::RefCell;
use std::rc::{Rc, Weak};

// =============================================================================
// SUBSCRIPTION
// =============================================================================

/// Unsubscribe token returned by every `subscribe`.
///
/// Dropping the token does NOT unsubscribe. A listener whose token is lost
/// stays registered for the lifetime of the channel.
#[must_use = "dropping a Subscription leaks the registration; call unsubscribe()"]
pub struct Subscription {
    cleanup: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Wrap a cleanup closure.
    pub fn new(cleanup: impl FnOnce() + 'static) -> Self {
        Self {
            cleanup: Some(Box::new(cleanup)),
        }
    }

    /// A token with nothing to clean up.
    pub fn empty() -> Self {
        Self { cleanup: None }
    }

    /// Remove the listener this token was issued for.
    pub fn unsubscribe(mut self) {
        if let Some(cleanup) = self.cleanup.take() {
            cleanup();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("live", &self.cleanup.is_some())
            .finish()
    }
}

// =============================================================================
// CHANNEL
// =============================================================================

/// Listener stored in a channel.
pub type Listener<T> = Rc<dyn Fn(&T)>;

struct ListenerList<T> {
    listeners: Vec<(usize, Listener<T>)>,
    next_id: usize,
}

impl<T> ListenerList<T> {
    fn new() -> Self {
        Self {
            listeners: Vec::new(),
            next_id: 0,
        }
    }
}

/// Cloneable handle to a shared listener list.
pub struct Channel<T> {
    inner: Rc<RefCell<ListenerList<T>>>,
}

impl<T: 'static> Channel<T> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(ListenerList::new())),
        }
    }

    /// Register a listener. It receives every subsequent `emit`.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&T) + 'static,
    {
        let id = {
            let mut list = self.inner.borrow_mut();
            let id = list.next_id;
            list.next_id += 1;
            list.listeners.push((id, Rc::new(listener)));
            id
        };

        let weak: Weak<RefCell<ListenerList<T>>> = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner
                    .borrow_mut()
                    .listeners
                    .retain(|(listener_id, _)| *listener_id != id);
            }
        })
    }

    /// Deliver `value` to every listener registered right now.
    ///
    /// Works from a snapshot, so listeners may subscribe, unsubscribe or
    /// emit again while being notified.
    pub fn emit(&self, value: &T) {
        let snapshot: Vec<Listener<T>> = self
            .inner
            .borrow()
            .listeners
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();

        for listener in snapshot {
            listener(value);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    /// Drop every listener.
    pub fn clear(&self) {
        self.inner.borrow_mut().listeners.clear();
    }
}

impl<T: 'static> Default for Channel<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Channel<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
