// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Telemetry normalization into canonical units.
//!
//! Never fails: absent, negative or non-finite values degrade to zero and
//! missing strings to fixed placeholders.

use crate::models::{ActivityRecord, NormalizedActivity};
use crate::time_utils::format_hms;

const UNKNOWN_TYPE: &str = "Unknown";
const NO_DESCRIPTION: &str = "No description";

/// Raw distances at or above this are taken to be meters.
const METERS_THRESHOLD: f64 = 100.0;

/// Normalize raw telemetry.
pub fn normalize(record: &ActivityRecord) -> NormalizedActivity {
    let moving_secs = non_negative(record.moving_time).floor() as u64;
    let speed_kmh = non_negative(record.average_speed) * 3.6;

    NormalizedActivity {
        distance_km: round_to(distance_km(non_negative(record.distance)), 2),
        duration: format_hms(moving_secs),
        activity_type: first_non_empty(&[&record.sport_type, &record.activity_type])
            .unwrap_or(UNKNOWN_TYPE)
            .to_string(),
        elevation_m: non_negative(record.total_elevation_gain).round() as u64,
        avg_speed_kmh: round_to(speed_kmh, 1),
        description: first_non_empty(&[&record.description, &record.name])
            .unwrap_or(NO_DESCRIPTION)
            .to_string(),
    }
}

/// Convert a raw distance to kilometers.
///
/// Producers disagree on units: the activity detail endpoint reports meters,
/// while some list views hand over values already converted to kilometers.
/// Anything at or above 100 is treated as meters. A genuine sub-100 m
/// activity or a 100+ km ride given in kilometers is misread; replace this
/// once the unit is carried with the value.
pub fn distance_km(raw: f64) -> f64 {
    if raw >= METERS_THRESHOLD {
        raw / 1000.0
    } else {
        raw
    }
}

fn non_negative(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v.is_finite() && v > 0.0 => v,
        _ => 0.0,
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

fn first_non_empty<'a>(candidates: &[&'a Option<String>]) -> Option<&'a str> {
    candidates
        .iter()
        .copied()
        .filter_map(Option::as_deref)
        .map(str::trim)
        .find(|s| !s.is_empty())
}
