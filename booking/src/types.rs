//! Domain types for the booking core.
//!
//! Identifiers are newtypes, catalog entries are plain data, and the
//! selection state is a single struct the reducer mutates. The persisted
//! record serializes with camelCase field names to stay compatible with the
//! layout already written by earlier deployments.

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::pricing;

/// Identifier for a pricing tier (`"mid"`, `"high"`, `"ps4"`)
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TierId(String);

impl TierId {
    /// Creates a `TierId` from any string-like value
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TierId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier for a session duration option, keyed by hour count
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DurationId(pub u8);

impl std::fmt::Display for DurationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier for a physical seat (`"PC-01"` .. `"PS-03"`)
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeatId(String);

impl SeatId {
    /// Creates a `SeatId` from any string-like value
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SeatId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier for a persisted booking
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookingId(String);

impl BookingId {
    /// Derives a booking id from an epoch-millisecond timestamp
    ///
    /// The id is `BK-` followed by the last six digits of the timestamp,
    /// zero-padded. Two submissions inside the same millisecond (or exactly
    /// 1_000_000 ms apart) collide; callers that need uniqueness must layer
    /// it on top.
    #[must_use]
    pub fn from_timestamp_ms(timestamp_ms: i64) -> Self {
        Self(format!("BK-{:06}", timestamp_ms.rem_euclid(1_000_000)))
    }

    /// Returns the identifier as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BookingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of hardware behind a tier or seat
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceKind {
    /// Gaming PC
    Pc,
    /// Console station
    Console,
}

/// A pricing tier: a class of hardware with an hourly base rate
#[derive(Clone, Debug, PartialEq)]
pub struct Tier {
    /// Stable identifier
    pub id: TierId,
    /// Display name (`"Standard PC"`)
    pub name: String,
    /// Hardware kind
    pub device: DeviceKind,
    /// Hourly base rate in whole currency units
    pub base_rate: u32,
    /// Short display label (`"Mid-End 144Hz"`)
    pub label: String,
    /// Accent colour for display surfaces (`"#9D00FF"`)
    pub accent: String,
}

/// A bookable session length with its price multiplier
///
/// Multipliers are not proportional to hours; longer sessions are
/// discounted (6 hours bills as 5.5).
#[derive(Clone, Debug, PartialEq)]
pub struct DurationOption {
    /// Stable identifier (hour count)
    pub id: DurationId,
    /// Session length in hours
    pub hours: u8,
    /// Compact button label (`"1H"`)
    pub label: String,
    /// Full display label (`"1 Hour"`)
    pub full_label: String,
    /// Price multiplier applied to the tier base rate
    pub multiplier: f64,
    /// Whether this option is flagged as the best value
    pub best_value: bool,
}

/// Availability of a seat
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeatStatus {
    /// Free to book
    Available,
    /// Currently in use
    Occupied,
    /// Out of service
    Maintenance,
}

/// A physical seat on the floor plan
#[derive(Clone, Debug, PartialEq)]
pub struct Seat {
    /// Stable identifier
    pub id: SeatId,
    /// Human label shown on the map (`"VIP-1"`)
    pub label: String,
    /// Hardware kind
    pub device: DeviceKind,
    /// Tier this seat belongs to
    pub tier_id: TierId,
    /// Current availability
    pub status: SeatStatus,
    /// Grid column (layout only)
    pub x: u8,
    /// Grid row (layout only)
    pub y: u8,
    /// Rotation in degrees (layout only)
    pub rotation: i16,
    /// Free-text hardware description (`"RTX 4090 | i9-14900K | 360Hz"`)
    pub specs: String,
}

impl Seat {
    /// Whether the seat cannot be selected
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.status != SeatStatus::Available
    }
}

/// Submission pipeline stage
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SubmissionStatus {
    /// Accepting edits and submissions
    #[default]
    Idle,
    /// Simulated payment-gateway delay in progress
    Processing,
    /// Booking persisted, handoff fired, waiting to reset
    Redirecting,
}

/// Mutable selection state driven by the booking reducer
#[derive(Clone, Debug, PartialEq)]
pub struct BookingState {
    /// Customer display name (raw, unvalidated)
    pub customer_name: String,
    /// Customer phone number (raw, unvalidated)
    pub phone_number: String,
    /// Chosen calendar date (raw, unvalidated)
    pub date: String,
    /// Chosen time slot (one of the catalog slots)
    pub time: String,
    /// Currently selected tier
    pub tier_id: TierId,
    /// Currently selected duration
    pub duration_id: DurationId,
    /// Currently selected seat, if any
    pub seat_id: Option<SeatId>,
    /// Price derived from tier and duration, recomputed on every change
    pub total_price: u32,
    /// Where the submission pipeline stands
    pub status: SubmissionStatus,
    /// Last validation or persistence error (if any)
    pub last_error: Option<String>,
}

impl BookingState {
    /// Default selection: first tier, three-hour session, no seat
    ///
    /// A catalog missing its first tier or the three-hour option yields a
    /// zero price rather than an error; the standard catalog has both.
    #[must_use]
    pub fn initial(catalog: &Catalog) -> Self {
        let tier = catalog.tiers().first();
        let tier_id = tier.map_or_else(|| TierId::new("mid"), |t| t.id.clone());
        let duration_id = DurationId(3);

        let total_price = match (tier, catalog.duration(&duration_id)) {
            (Some(tier), Some(duration)) => pricing::compute_price(tier, duration),
            _ => 0,
        };

        Self {
            customer_name: String::new(),
            phone_number: String::new(),
            date: String::new(),
            time: String::new(),
            tier_id,
            duration_id,
            seat_id: None,
            total_price,
            status: SubmissionStatus::Idle,
            last_error: None,
        }
    }

    /// Clears the mutable fields back to the post-reset defaults
    ///
    /// Tier, duration, and price keep their current values; the original
    /// form only blanks the text fields and the seat.
    pub fn reset_fields(&mut self) {
        self.customer_name.clear();
        self.phone_number.clear();
        self.date.clear();
        self.time.clear();
        self.seat_id = None;
        self.status = SubmissionStatus::Idle;
        self.last_error = None;
    }
}

/// Immutable record of a completed submission
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRecord {
    /// Timestamp-derived identifier (`BK-XXXXXX`)
    pub id: BookingId,
    /// Customer display name
    pub customer_name: String,
    /// Customer phone number
    pub phone_number: String,
    /// Combined `"<date> <time>"` string
    pub date: String,
    /// Tier display name at submission time
    pub platform: String,
    /// Duration full label at submission time
    pub duration: String,
    /// Total price in whole currency units
    pub price: u32,
    /// Submission time in epoch milliseconds
    pub timestamp: i64,
    /// Lifecycle status, asserted `"CONFIRMED"` at creation
    pub status: String,
}

/// Cross-component signals carried by the signal bus
///
/// This is the full, closed set. Anything else two components need to say
/// to each other goes through the store, not the bus.
#[derive(Clone, Debug, PartialEq)]
pub enum Signal {
    /// A tier was chosen outside the booking form (pricing cards)
    TierSelected(TierId),
    /// The persisted booking collection changed
    BookingUpdated,
    /// Request to show or hide the admin dashboard
    ToggleAdminDashboard,
}
