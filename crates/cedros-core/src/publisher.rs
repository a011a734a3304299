//! Explicit state publisher with deterministic subscribe/unsubscribe
//!
//! Consumers subscribe with a callback and hold the returned [`Subscription`].
//! Dropping it (or calling [`Subscription::unsubscribe`]) detaches the callback
//! synchronously; no notification reaches a detached subscriber.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

type Listener<T> = Rc<dyn Fn(&T)>;

struct Registry<T> {
    next_id: u64,
    current: T,
    listeners: Vec<(u64, Listener<T>)>,
}

/// Single-threaded publisher of the latest `T`
pub struct StatePublisher<T> {
    registry: Rc<RefCell<Registry<T>>>,
}

impl<T> Clone for StatePublisher<T> {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for StatePublisher<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.registry.borrow();
        f.debug_struct("StatePublisher")
            .field("current", &registry.current)
            .field("subscribers", &registry.listeners.len())
            .finish()
    }
}

impl<T: Clone + 'static> StatePublisher<T> {
    pub fn new(initial: T) -> Self {
        Self {
            registry: Rc::new(RefCell::new(Registry {
                next_id: 0,
                current: initial,
                listeners: Vec::new(),
            })),
        }
    }

    /// Latest published value
    pub fn current(&self) -> T {
        self.registry.borrow().current.clone()
    }

    /// Attach a listener. It is not called with the current value.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&T) + 'static,
    {
        let id = {
            let mut registry = self.registry.borrow_mut();
            registry.next_id += 1;
            let id = registry.next_id;
            registry.listeners.push((id, Rc::new(listener)));
            id
        };

        let weak: Weak<RefCell<Registry<T>>> = Rc::downgrade(&self.registry);
        Subscription {
            detach: Some(Box::new(move || {
                if let Some(registry) = weak.upgrade() {
                    let removed = {
                        let mut registry = registry.borrow_mut();
                        registry
                            .listeners
                            .iter()
                            .position(|(lid, _)| *lid == id)
                            .map(|pos| registry.listeners.remove(pos))
                    };
                    drop(removed);
                }
            })),
        }
    }

    /// Store `value` and notify listeners in subscription order
    ///
    /// A listener detached by an earlier listener of the same publish is
    /// skipped.
    pub fn publish(&self, value: T) {
        let snapshot: Vec<(u64, Listener<T>)> = {
            let mut registry = self.registry.borrow_mut();
            registry.current = value.clone();
            registry.listeners.clone()
        };
        for (id, listener) in snapshot {
            let still_attached = self
                .registry
                .borrow()
                .listeners
                .iter()
                .any(|(lid, _)| *lid == id);
            if still_attached {
                listener(&value);
            }
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.registry.borrow().listeners.len()
    }

    /// Detach every listener
    pub fn clear(&self) {
        let removed = std::mem::take(&mut self.registry.borrow_mut().listeners);
        drop(removed);
    }
}

/// RAII guard for a publisher listener
pub struct Subscription {
    detach: Option<Box<dyn FnOnce()>>,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("attached", &self.detach.is_some())
            .finish()
    }
}

impl Subscription {
    /// Detach now instead of on drop
    pub fn unsubscribe(mut self) {
        self.detach_now();
    }

    fn detach_now(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.detach_now();
    }
}
