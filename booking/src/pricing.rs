//! Session pricing.
//!
//! Price is derived, never stored: the reducer recomputes on every tier or
//! duration change so the amount visible at submit time is never stale.

use crate::types::{DurationOption, Tier};

/// Computes the session price: `ceil(base_rate * multiplier)`
///
/// Catalog rates and multipliers are small, so the result always fits a
/// `u32`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn compute_price(tier: &Tier, duration: &DurationOption) -> u32 {
    (f64::from(tier.base_rate) * duration.multiplier).ceil() as u32
}
