//! Position and unit translation
//!
//! AirPlay expresses start positions as a fraction of the media
//! duration in [0, 1]; media backends take percentages in [0, 100].
//! Position reports from a backend are nullable and stay nullable
//! until a response is formatted, so "no media" remains distinguishable
//! from a genuine position of zero inside the protocol layer.

use crate::backend::PlayerPosition;

/// Convert a wire start-position fraction to a backend percentage
///
/// No clamping is applied: clients send well-formed fractions, and an
/// out-of-range seek is the backend's to reject.
#[must_use]
pub fn fraction_to_percentage(fraction: f64) -> f64 {
    fraction * 100.0
}

/// Normalize a nullable position pair for formatting
///
/// An unknown or zero position collapses the pair to `(0, 0)`, which
/// clients read as "nothing playing". Returns `(position, duration)`
/// in seconds.
#[must_use]
pub fn normalize_pair(pair: &PlayerPosition) -> (f64, f64) {
    match pair.position {
        Some(position) if position != 0.0 => (position, pair.duration.unwrap_or(0.0)),
        _ => (0.0, 0.0),
    }
}
