//! Signal-bus bridge.
//!
//! The pricing cards live outside the booking form and announce tier
//! choices on the signal bus. This module wires that inbound signal into
//! the store so a card click and a direct form click take the same path
//! through the reducer.

use std::sync::Arc;

use ggwp_core::{SignalBus, SubscriberId};
use ggwp_runtime::Store;

use crate::reducer::{BookingAction, BookingEnvironment, BookingReducer};
use crate::types::{BookingState, Signal};

/// The fully-typed store for the booking form
pub type BookingStore = Store<BookingState, BookingAction, BookingEnvironment, BookingReducer>;

/// Forwards inbound `TierSelected` signals to the store
///
/// Bus callbacks are synchronous; the send is spawned onto the current
/// tokio runtime, so this must be called from within one. Other signal
/// variants are not for us and pass through untouched.
///
/// Returns the subscriber id so the caller can unwire on teardown.
///
/// # Panics
///
/// Panics if called outside a tokio runtime.
pub fn wire_signals(bus: &SignalBus<Signal>, store: BookingStore) -> SubscriberId {
    let handle = tokio::runtime::Handle::current();

    bus.subscribe(move |signal| {
        if let Signal::TierSelected(tier_id) = signal {
            let store = store.clone();
            let tier_id = tier_id.clone();
            handle.spawn(async move {
                if let Err(error) = store.send(BookingAction::SelectTier { tier_id }).await {
                    tracing::debug!(%error, "Tier signal dropped");
                }
            });
        }
    })
}

/// Convenience: builds a store from an environment's catalog defaults and
/// wires it to the environment's bus in one step
///
/// # Panics
///
/// Panics if called outside a tokio runtime.
#[must_use]
pub fn connected_store(env: BookingEnvironment) -> (BookingStore, SubscriberId) {
    let bus = Arc::clone(&env.bus);
    let initial = BookingState::initial(&env.catalog);
    let store = Store::new(initial, BookingReducer::new(), env);
    let subscriber = wire_signals(&bus, store.clone());
    (store, subscriber)
}
