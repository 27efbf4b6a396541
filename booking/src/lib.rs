//! Gaming-lounge booking core.
//!
//! A composable-architecture implementation of the GG Well Played session
//! booking flow:
//!
//! - Catalogs of tiers, durations, seats, and time slots
//! - Derived pricing (`ceil(base_rate * multiplier)`)
//! - A selection reducer with a three-stage submission pipeline
//! - Append-only booking persistence over a single-slot key/value store
//! - WhatsApp deep-link handoff after a booking persists
//! - A typed signal bus bridging the form to the rest of the site
//!
//! # Quick Start
//!
//! ```no_run
//! use booking::bridge::connected_store;
//! use booking::catalog::Catalog;
//! use booking::handoff::LoggingOpener;
//! use booking::reducer::{BookingAction, BookingEnvironment};
//! use booking::repository::{MemoryKvStore, SlotRepository};
//! use booking::types::Signal;
//! use ggwp_core::SignalBus;
//! use ggwp_core::environment::SystemClock;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let env = BookingEnvironment::new(
//!     Arc::new(SystemClock),
//!     Arc::new(Catalog::standard()),
//!     Arc::new(SlotRepository::new(MemoryKvStore::new())),
//!     Arc::new(SignalBus::<Signal>::new()),
//!     Arc::new(LoggingOpener),
//! );
//!
//! let (store, _subscriber) = connected_store(env);
//!
//! store.send(BookingAction::UpdateName { value: "Arjun".into() }).await?;
//! store.send(BookingAction::Submit).await?;
//! # Ok(())
//! # }
//! ```

pub mod bridge;
pub mod catalog;
pub mod handoff;
pub mod pricing;
pub mod reducer;
pub mod repository;
pub mod types;

pub use bridge::{BookingStore, connected_store, wire_signals};
pub use catalog::Catalog;
pub use reducer::{BookingAction, BookingEnvironment, BookingReducer};
pub use types::{BookingRecord, BookingState, Signal, SubmissionStatus};
