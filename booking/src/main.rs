//! CLI demo for the booking core.
//!
//! Walks a full booking through the pipeline: pick a seat from the floor
//! plan, fill in the form, submit, and watch the record land in the
//! repository with the WhatsApp handoff link logged.

use std::sync::Arc;
use std::time::Duration;

use booking::bridge::connected_store;
use booking::catalog::Catalog;
use booking::handoff::LoggingOpener;
use booking::reducer::{BookingAction, BookingEnvironment};
use booking::repository::{BookingRepository, FileKvStore, SlotRepository};
use booking::types::{SeatId, Signal, TierId};
use ggwp_core::SignalBus;
use ggwp_core::environment::SystemClock;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    println!("=== GG Well Played Booking Demo ===\n");

    let catalog = Arc::new(Catalog::standard());
    let bus = Arc::new(SignalBus::<Signal>::new());
    let repository = Arc::new(SlotRepository::new(FileKvStore::new("./bookings")?));

    let env = BookingEnvironment::new(
        Arc::new(SystemClock),
        Arc::clone(&catalog),
        Arc::clone(&repository) as Arc<dyn BookingRepository>,
        Arc::clone(&bus),
        Arc::new(LoggingOpener),
    )
    .with_delays(Duration::from_millis(400), Duration::from_millis(300));

    let (store, _subscriber) = connected_store(env);

    // The floor plan
    println!("Floor plan:");
    for seat in catalog.seats() {
        let marker = if seat.is_disabled() { "x" } else { " " };
        println!("  [{marker}] {} ({}) - {}", seat.id, seat.label, seat.specs);
    }

    // A pricing card announces a tier choice over the bus
    println!("\nSelecting the Elite PC tier from the pricing cards...");
    bus.publish(&Signal::TierSelected(TierId::new("high")));
    tokio::time::sleep(Duration::from_millis(50)).await;

    let price = store.state(|s| s.total_price).await;
    println!("Price after tier selection: \u{20B9}{price}");

    // Picking a seat overrides the tier to the seat's own
    println!("\nPicking seat PC-05 (standard row)...");
    store
        .send(BookingAction::SelectSeat {
            seat_id: SeatId::new("PC-05"),
        })
        .await?;

    let (tier, price) = store.state(|s| (s.tier_id.clone(), s.total_price)).await;
    println!("Tier is now {tier}, price \u{20B9}{price}");

    // Fill in the form and submit
    store
        .send(BookingAction::UpdateName {
            value: "Arjun".to_string(),
        })
        .await?;
    store
        .send(BookingAction::UpdatePhone {
            value: "9123456780".to_string(),
        })
        .await?;
    store
        .send(BookingAction::UpdateDate {
            value: "2025-03-15".to_string(),
        })
        .await?;
    store
        .send(BookingAction::UpdateTime {
            value: catalog
                .time_slots()
                .first()
                .cloned()
                .unwrap_or_else(|| "9:30 AM".to_string()),
        })
        .await?;

    println!("\nSubmitting...");
    store.send(BookingAction::Submit).await?;

    // Watch the pipeline run to completion
    loop {
        let status = store.state(|s| s.status).await;
        println!("  status: {status:?}");
        if status == booking::SubmissionStatus::Idle {
            break;
        }
        tokio::time::sleep(Duration::from_millis(200)).await;
    }

    // The record is in the repository
    println!("\nBookings on file:");
    for record in repository.load_all()? {
        println!(
            "  {} | {} | {} | {} | \u{20B9}{}",
            record.id, record.customer_name, record.date, record.platform, record.price
        );
    }

    store.shutdown(Duration::from_secs(2)).await?;
    println!("\nDone.");
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "booking=info,ggwp_runtime=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}
