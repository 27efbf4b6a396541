//! Tier, duration, seat, and time-slot catalogs.
//!
//! The catalog is an explicit constructor-built value injected through the
//! environment. No module globals: tests build their own, and a future
//! server-fed catalog is a drop-in replacement.

use crate::types::{
    DeviceKind, DurationId, DurationOption, Seat, SeatId, SeatStatus, Tier, TierId,
};

/// Opening time in minutes from midnight (09:30)
const OPENING_MINUTE: u32 = 9 * 60 + 30;
/// Closing time in minutes from midnight (22:00), inclusive
const CLOSING_MINUTE: u32 = 22 * 60;
/// Slot step in minutes
const SLOT_STEP: u32 = 30;

/// The full set of bookable tiers, durations, seats, and time slots
#[derive(Clone, Debug)]
pub struct Catalog {
    tiers: Vec<Tier>,
    durations: Vec<DurationOption>,
    seats: Vec<Seat>,
    time_slots: Vec<String>,
}

impl Catalog {
    /// Builds a catalog from explicit parts
    ///
    /// Time slots are generated once at construction.
    #[must_use]
    pub fn new(tiers: Vec<Tier>, durations: Vec<DurationOption>, seats: Vec<Seat>) -> Self {
        Self {
            tiers,
            durations,
            seats,
            time_slots: generate_time_slots(OPENING_MINUTE, CLOSING_MINUTE, SLOT_STEP),
        }
    }

    /// The production floor plan: three tiers, four durations, fifteen seats
    #[must_use]
    pub fn standard() -> Self {
        Self::new(standard_tiers(), standard_durations(), standard_seats())
    }

    /// All tiers, in display order
    #[must_use]
    pub fn tiers(&self) -> &[Tier] {
        &self.tiers
    }

    /// All duration options, in display order
    #[must_use]
    pub fn durations(&self) -> &[DurationOption] {
        &self.durations
    }

    /// All seats, in floor-plan order
    #[must_use]
    pub fn seats(&self) -> &[Seat] {
        &self.seats
    }

    /// Bookable time slots, half-hour steps from opening to closing
    #[must_use]
    pub fn time_slots(&self) -> &[String] {
        &self.time_slots
    }

    /// Looks up a tier by id
    #[must_use]
    pub fn tier(&self, id: &TierId) -> Option<&Tier> {
        self.tiers.iter().find(|t| &t.id == id)
    }

    /// Looks up a duration option by id
    #[must_use]
    pub fn duration(&self, id: &DurationId) -> Option<&DurationOption> {
        self.durations.iter().find(|d| &d.id == id)
    }

    /// Looks up a seat by id
    #[must_use]
    pub fn seat(&self, id: &SeatId) -> Option<&Seat> {
        self.seats.iter().find(|s| &s.id == id)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}

/// Generates display time slots between two minutes-from-midnight bounds
///
/// Both bounds are inclusive. Labels use a 12-hour clock with AM/PM and no
/// leading zero on the hour (`"9:30 AM"`, `"10:00 PM"`). Deterministic for
/// a given input.
#[must_use]
pub fn generate_time_slots(start_minute: u32, end_minute: u32, step: u32) -> Vec<String> {
    if step == 0 {
        return Vec::new();
    }

    let mut slots = Vec::new();
    let mut minute = start_minute;
    while minute <= end_minute {
        slots.push(format_slot(minute));
        minute += step;
    }
    slots
}

fn format_slot(minute_of_day: u32) -> String {
    let hour24 = (minute_of_day / 60) % 24;
    let minute = minute_of_day % 60;

    let period = if hour24 >= 12 { "PM" } else { "AM" };
    let hour12 = match hour24 % 12 {
        0 => 12,
        h => h,
    };

    format!("{hour12}:{minute:02} {period}")
}

fn standard_tiers() -> Vec<Tier> {
    vec![
        Tier {
            id: TierId::new("mid"),
            name: "Standard PC".to_string(),
            device: DeviceKind::Pc,
            base_rate: 50,
            label: "Mid-End 144Hz".to_string(),
            accent: "#9D00FF".to_string(),
        },
        Tier {
            id: TierId::new("high"),
            name: "Elite PC".to_string(),
            device: DeviceKind::Pc,
            base_rate: 70,
            label: "High-End 240Hz".to_string(),
            accent: "#00D9FF".to_string(),
        },
        Tier {
            id: TierId::new("ps4"),
            name: "PS5 Console".to_string(),
            device: DeviceKind::Console,
            base_rate: 100,
            label: "Console PS5".to_string(),
            accent: "#FF006E".to_string(),
        },
    ]
}

fn standard_durations() -> Vec<DurationOption> {
    vec![
        DurationOption {
            id: DurationId(1),
            hours: 1,
            label: "1H".to_string(),
            full_label: "1 Hour".to_string(),
            multiplier: 1.0,
            best_value: false,
        },
        DurationOption {
            id: DurationId(3),
            hours: 3,
            label: "3H".to_string(),
            full_label: "3 Hours".to_string(),
            multiplier: 3.0,
            best_value: false,
        },
        DurationOption {
            id: DurationId(6),
            hours: 6,
            label: "6H".to_string(),
            full_label: "6 Hours".to_string(),
            multiplier: 5.5,
            best_value: true,
        },
        DurationOption {
            id: DurationId(8),
            hours: 8,
            label: "8H".to_string(),
            full_label: "8 Hours".to_string(),
            multiplier: 7.0,
            best_value: false,
        },
    ]
}

#[allow(clippy::too_many_lines)] // Floor-plan data, one entry per seat
fn standard_seats() -> Vec<Seat> {
    #[allow(clippy::too_many_arguments)]
    fn seat(
        id: &str,
        label: &str,
        device: DeviceKind,
        tier: &str,
        status: SeatStatus,
        x: u8,
        y: u8,
        rotation: i16,
        specs: &str,
    ) -> Seat {
        Seat {
            id: SeatId::new(id),
            label: label.to_string(),
            device,
            tier_id: TierId::new(tier),
            status,
            x,
            y,
            rotation,
            specs: specs.to_string(),
        }
    }

    use DeviceKind::{Console, Pc};
    use SeatStatus::{Available, Maintenance, Occupied};

    vec![
        // PC arena, VIP row
        seat("PC-01", "VIP-1", Pc, "high", Available, 2, 2, 0, "RTX 4090 | i9-14900K | 360Hz"),
        seat("PC-02", "VIP-2", Pc, "high", Occupied, 3, 2, 0, "RTX 4090 | i9-14900K | 360Hz"),
        seat("PC-03", "VIP-3", Pc, "high", Available, 4, 2, 0, "RTX 4080 | i7-13700K | 240Hz"),
        seat("PC-04", "VIP-4", Pc, "high", Available, 5, 2, 0, "RTX 4080 | i7-13700K | 240Hz"),
        // PC arena, standard rows
        seat("PC-05", "STD-1", Pc, "mid", Available, 2, 5, 180, "RTX 3070 | i5-13600 | 165Hz"),
        seat("PC-06", "STD-2", Pc, "mid", Available, 3, 5, 180, "RTX 3070 | i5-13600 | 165Hz"),
        seat("PC-07", "STD-3", Pc, "mid", Available, 4, 5, 180, "RTX 3060 | i5-12400 | 144Hz"),
        seat("PC-08", "STD-4", Pc, "mid", Maintenance, 5, 5, 180, "RTX 3060 | i5-12400 | 144Hz"),
        seat("PC-09", "STD-5", Pc, "mid", Available, 2, 6, 0, "RTX 3060 | i5-12400 | 144Hz"),
        seat("PC-10", "STD-6", Pc, "mid", Occupied, 3, 6, 0, "RTX 3060 | i5-12400 | 144Hz"),
        seat("PC-11", "STD-7", Pc, "mid", Available, 4, 6, 0, "RTX 3060 | i5-12400 | 144Hz"),
        seat("PC-12", "STD-8", Pc, "mid", Available, 5, 6, 0, "RTX 3060 | i5-12400 | 144Hz"),
        // Console lounge
        seat("PS-01", "PS5-A", Console, "ps4", Available, 10, 2, -90, "PS5 Pro | 4K OLED TV"),
        seat("PS-02", "PS5-B", Console, "ps4", Occupied, 10, 4, -90, "PS5 Slim | 4K HDR TV"),
        seat("PS-03", "PS5-C", Console, "ps4", Available, 10, 6, -90, "Xbox Series X | 120Hz TV"),
    ]
}
