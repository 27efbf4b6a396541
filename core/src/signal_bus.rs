//! Process-wide broadcast signals connecting the booking core to sibling
//! components.
//!
//! The [`SignalBus`] is a typed publish/subscribe mechanism with deliberately
//! narrow semantics:
//!
//! - Delivery is **synchronous**: `publish` invokes every subscriber before
//!   returning.
//! - Subscribers are invoked in **registration order**.
//! - Fire-and-forget: there is no queueing, no replay, and no delivery to
//!   subscribers registered after a signal was emitted.
//!
//! The signal type is a closed enum owned by the feature crate, so the set of
//! messages crossing the component boundary is statically checkable.
//!
//! # Example
//!
//! ```
//! use ggwp_core::signal_bus::SignalBus;
//!
//! #[derive(Clone, Debug, PartialEq)]
//! enum Signal {
//!     Ping,
//! }
//!
//! let bus = SignalBus::new();
//! let id = bus.subscribe(|signal: &Signal| {
//!     assert_eq!(*signal, Signal::Ping);
//! });
//! bus.publish(&Signal::Ping);
//! bus.unsubscribe(id);
//! ```

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identifier handed back by [`SignalBus::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

type Subscriber<S> = Box<dyn Fn(&S) + Send + Sync>;

/// A synchronous, in-process publish/subscribe bus for a single signal type.
///
/// Subscriber callbacks run on the publishing thread while the bus lock is
/// held, so they must not call back into the same bus. Callbacks that need to
/// do async work should hand off to a task (see the booking bridge).
pub struct SignalBus<S> {
    subscribers: Mutex<Vec<(SubscriberId, Subscriber<S>)>>,
    next_id: AtomicU64,
}

impl<S> SignalBus<S> {
    /// Create an empty bus
    #[must_use]
    pub fn new() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(0),
        }
    }

    /// Register a subscriber; it receives every signal published afterwards
    ///
    /// Returns an id that can be passed to [`SignalBus::unsubscribe`].
    pub fn subscribe<F>(&self, callback: F) -> SubscriberId
    where
        F: Fn(&S) + Send + Sync + 'static,
    {
        let id = SubscriberId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.subscribers
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push((id, Box::new(callback)));
        id
    }

    /// Remove a subscriber; signals published afterwards are not delivered
    pub fn unsubscribe(&self, id: SubscriberId) {
        self.subscribers
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .retain(|(sub_id, _)| *sub_id != id);
    }

    /// Deliver a signal to every current subscriber, in registration order
    pub fn publish(&self, signal: &S) {
        let subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        tracing::trace!(count = subscribers.len(), "delivering signal");
        for (_, callback) in subscribers.iter() {
            callback(signal);
        }
    }

    /// Number of currently registered subscribers
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }
}

impl<S> Default for SignalBus<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> std::fmt::Debug for SignalBus<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
