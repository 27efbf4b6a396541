//! WhatsApp handoff.
//!
//! After a booking persists, the customer is handed to the lounge's
//! WhatsApp line with a pre-filled message. The core only builds the deep
//! link and hands it to an injected opener; it has no visibility into
//! whether the external channel was actually reached.

use crate::types::{BookingRecord, SeatId};

/// The lounge's WhatsApp business number
pub const WHATSAPP_NUMBER: &str = "918888237925";

/// Builds the pre-filled handoff message
///
/// The record carries the combined date string; the separate `date` and
/// `time` values are the raw form fields captured at submission.
#[must_use]
pub fn handoff_message(record: &BookingRecord, seat_id: &SeatId, date: &str, time: &str) -> String {
    format!(
        "*NEW BOOKING REQUEST*\n\
         ------------------\n\
         \u{1F464} Name: {name}\n\
         \u{1F4F1} Phone: {phone}\n\
         \u{1F4C5} Date: {date}\n\
         \u{23F0} Time: {time}\n\
         \u{1F3AE} Seat: {seat}\n\
         \u{2699}\u{FE0F} Rig: {rig}\n\
         \u{23F1}\u{FE0F} Duration: {duration}\n\
         \u{1F4B0} Total: \u{20B9}{price}",
        name = record.customer_name,
        phone = record.phone_number,
        seat = seat_id,
        rig = record.platform,
        duration = record.duration,
        price = record.price,
    )
}

/// Builds the `wa.me` deep link for a message
#[must_use]
pub fn handoff_url(message: &str) -> String {
    format!(
        "https://wa.me/{WHATSAPP_NUMBER}?text={}",
        urlencoding::encode(message)
    )
}

/// Destination for the handoff deep link
///
/// Fire-and-forget: opening has no result. A host with a real browser
/// window opens it; headless hosts log it.
pub trait HandoffOpener: Send + Sync {
    /// Opens (or otherwise surfaces) the deep link
    fn open(&self, url: &str);
}

/// Opener that logs the link instead of opening it
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingOpener;

impl HandoffOpener for LoggingOpener {
    fn open(&self, url: &str) {
        tracing::info!(url, "Handoff link ready");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BookingId, BookingRecord};

    fn sample_record() -> BookingRecord {
        BookingRecord {
            id: BookingId::from_timestamp_ms(1_700_000_654_321),
            customer_name: "Arjun".to_string(),
            phone_number: "9123456780".to_string(),
            date: "2025-03-15 7:00 PM".to_string(),
            platform: "Elite PC".to_string(),
            duration: "6 Hours".to_string(),
            price: 385,
            timestamp: 1_700_000_654_321,
            status: "CONFIRMED".to_string(),
        }
    }

    #[test]
    fn message_carries_every_booking_detail() {
        let message = handoff_message(
            &sample_record(),
            &SeatId::new("PC-03"),
            "2025-03-15",
            "7:00 PM",
        );

        assert!(message.starts_with("*NEW BOOKING REQUEST*\n------------------\n"));
        assert!(message.contains("Name: Arjun"));
        assert!(message.contains("Phone: 9123456780"));
        assert!(message.contains("Date: 2025-03-15"));
        assert!(message.contains("Time: 7:00 PM"));
        assert!(message.contains("Seat: PC-03"));
        assert!(message.contains("Rig: Elite PC"));
        assert!(message.contains("Duration: 6 Hours"));
        assert!(message.contains("Total: \u{20B9}385"));
    }

    #[test]
    fn url_targets_the_business_number_with_encoded_text() {
        let url = handoff_url("hello there*");

        assert!(url.starts_with("https://wa.me/918888237925?text="));
        // Spaces and asterisks must be percent-encoded
        assert!(url.ends_with("hello%20there%2A"));
        assert!(!url.contains(' '));
    }

    #[test]
    fn full_message_url_encodes_newlines() {
        let message = handoff_message(
            &sample_record(),
            &SeatId::new("PC-03"),
            "2025-03-15",
            "7:00 PM",
        );
        let url = handoff_url(&message);

        assert!(url.contains("%0A"));
        assert!(!url.contains('\n'));
    }
}
