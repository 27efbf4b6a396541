//! End-to-end booking pipeline tests through the Store.
//!
//! These run the real reducer, runtime, repository, bus, and handoff
//! together, with short pipeline delays so the full
//! Idle -> Processing -> Redirecting -> Idle cycle completes in
//! milliseconds.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use booking::bridge::{BookingStore, connected_store};
use booking::catalog::Catalog;
use booking::handoff::HandoffOpener;
use booking::reducer::{BookingAction, BookingEnvironment};
use booking::repository::{
    BookingRepository, KvStore, MemoryKvStore, SlotRepository, StorageError,
};
use booking::types::{SeatId, Signal, SubmissionStatus, TierId};
use ggwp_core::SignalBus;
use ggwp_core::environment::SystemClock;

struct RecordingOpener {
    urls: Mutex<Vec<String>>,
}

impl RecordingOpener {
    fn new() -> Self {
        Self {
            urls: Mutex::new(Vec::new()),
        }
    }

    fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }
}

impl HandoffOpener for RecordingOpener {
    fn open(&self, url: &str) {
        self.urls.lock().unwrap().push(url.to_string());
    }
}

struct Harness {
    store: BookingStore,
    bus: Arc<SignalBus<Signal>>,
    repository: Arc<dyn BookingRepository>,
    opener: Arc<RecordingOpener>,
    signals: Arc<Mutex<Vec<Signal>>>,
}

fn harness_with_repository(repository: Arc<dyn BookingRepository>) -> Harness {
    let bus = Arc::new(SignalBus::new());
    let opener = Arc::new(RecordingOpener::new());

    let signals = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&signals);
    bus.subscribe(move |signal: &Signal| {
        sink.lock().unwrap().push(signal.clone());
    });

    let env = BookingEnvironment::new(
        Arc::new(SystemClock),
        Arc::new(Catalog::standard()),
        Arc::clone(&repository),
        Arc::clone(&bus),
        Arc::clone(&opener) as Arc<dyn HandoffOpener>,
    )
    .with_delays(Duration::from_millis(10), Duration::from_millis(10));

    let (store, _subscriber) = connected_store(env);

    Harness {
        store,
        bus,
        repository,
        opener,
        signals,
    }
}

fn harness() -> Harness {
    harness_with_repository(Arc::new(SlotRepository::new(MemoryKvStore::new())))
}

async fn fill_form(store: &BookingStore) {
    for action in [
        BookingAction::SelectSeat {
            seat_id: SeatId::new("PC-05"),
        },
        BookingAction::UpdateName {
            value: "Arjun".to_string(),
        },
        BookingAction::UpdatePhone {
            value: "9123456780".to_string(),
        },
        BookingAction::UpdateDate {
            value: "2025-03-15".to_string(),
        },
        BookingAction::UpdateTime {
            value: "7:00 PM".to_string(),
        },
    ] {
        store.send(action).await.expect("send");
    }
}

/// Polls state until `predicate` holds or two seconds elapse.
async fn wait_for_state<F>(store: &BookingStore, predicate: F)
where
    F: Fn(&booking::BookingState) -> bool,
{
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    loop {
        if store.state(&predicate).await {
            return;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out waiting for state condition"
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

#[tokio::test]
async fn full_pipeline_persists_record_and_resets_form() {
    let h = harness();
    fill_form(&h.store).await;

    h.store.send(BookingAction::Submit).await.expect("submit");

    let status = h.store.state(|s| s.status).await;
    assert_eq!(status, SubmissionStatus::Processing);

    // Pipeline runs Processing -> Redirecting -> Idle on its own
    wait_for_state(&h.store, |s| {
        s.status == SubmissionStatus::Idle && s.customer_name.is_empty()
    })
    .await;

    let records = h.repository.load_all().expect("load");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].customer_name, "Arjun");
    assert_eq!(records[0].date, "2025-03-15 7:00 PM");
    assert_eq!(records[0].platform, "Standard PC");
    assert_eq!(records[0].price, 150);
    assert_eq!(records[0].status, "CONFIRMED");

    // Form reset to defaults
    let state = h.store.state(Clone::clone).await;
    assert!(state.seat_id.is_none());
    assert!(state.phone_number.is_empty());

    // One handoff, to the business number, carrying the seat
    let urls = h.opener.urls();
    assert_eq!(urls.len(), 1);
    assert!(urls[0].starts_with("https://wa.me/918888237925?text="));
    assert!(urls[0].contains("PC-05"));

    // One collection-changed signal
    let signals = h.signals.lock().unwrap().clone();
    assert_eq!(signals, vec![Signal::BookingUpdated]);
}

#[tokio::test]
async fn persistence_failure_aborts_without_handoff() {
    struct FailingStore;

    impl KvStore for FailingStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Ok(None)
        }

        fn put(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Backend("disk full".to_string()))
        }
    }

    let h = harness_with_repository(Arc::new(SlotRepository::new(FailingStore)));
    fill_form(&h.store).await;

    h.store.send(BookingAction::Submit).await.expect("submit");

    wait_for_state(&h.store, |s| s.last_error.is_some()).await;

    let state = h.store.state(Clone::clone).await;
    assert_eq!(state.status, SubmissionStatus::Idle);
    // Fields retained so the customer can retry
    assert_eq!(state.customer_name, "Arjun");
    assert_eq!(state.seat_id, Some(SeatId::new("PC-05")));

    // No handoff, no collection-changed signal
    assert!(h.opener.urls().is_empty());
    assert!(h.signals.lock().unwrap().is_empty());
}

#[tokio::test]
async fn double_submit_produces_one_record() {
    let h = harness();
    fill_form(&h.store).await;

    h.store.send(BookingAction::Submit).await.expect("submit");
    // Second submit lands while Processing and must be a no-op
    h.store.send(BookingAction::Submit).await.expect("submit");

    wait_for_state(&h.store, |s| {
        s.status == SubmissionStatus::Idle && s.customer_name.is_empty()
    })
    .await;

    let records = h.repository.load_all().expect("load");
    assert_eq!(records.len(), 1);
    assert_eq!(h.opener.urls().len(), 1);
}

#[tokio::test]
async fn edits_during_processing_do_not_reach_the_record() {
    let h = harness();
    fill_form(&h.store).await;

    h.store.send(BookingAction::Submit).await.expect("submit");
    h.store
        .send(BookingAction::UpdateName {
            value: "Intruder".to_string(),
        })
        .await
        .expect("send");

    wait_for_state(&h.store, |s| s.status == SubmissionStatus::Idle).await;

    let records = h.repository.load_all().expect("load");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].customer_name, "Arjun");
}

#[tokio::test]
async fn tier_signal_from_the_bus_updates_the_store() {
    let h = harness();

    h.bus.publish(&Signal::TierSelected(TierId::new("ps4")));

    // The bridge spawns the send; give it a beat
    wait_for_state(&h.store, |s| s.tier_id == TierId::new("ps4")).await;

    let price = h.store.state(|s| s.total_price).await;
    assert_eq!(price, 300);
}

#[tokio::test]
async fn unrelated_signals_leave_the_store_alone() {
    let h = harness();

    h.bus.publish(&Signal::ToggleAdminDashboard);
    h.bus.publish(&Signal::BookingUpdated);
    tokio::time::sleep(Duration::from_millis(20)).await;

    let state = h.store.state(Clone::clone).await;
    assert_eq!(state.tier_id, TierId::new("mid"));
    assert_eq!(state.status, SubmissionStatus::Idle);
}
