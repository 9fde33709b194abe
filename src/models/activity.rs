// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Strava activity telemetry, raw and normalized.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Raw activity telemetry as delivered by Strava (or pre-fetched by a caller).
///
/// Every field is optional on the wire. Units are not trustworthy:
/// `distance` is meters from the detail endpoint but some callers pass
/// kilometers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityRecord {
    /// Strava activity ID
    pub id: u64,
    /// Activity name/title
    pub name: Option<String>,
    /// Free-text description
    pub description: Option<String>,
    /// Distance (meters, or kilometers from some callers)
    pub distance: Option<f64>,
    /// Moving time in seconds
    pub moving_time: Option<f64>,
    /// Legacy activity type (Ride, Run, ...)
    #[serde(rename = "type")]
    pub activity_type: Option<String>,
    /// Sport type (more specific than `type`: TrailRun, GravelRide, ...)
    pub sport_type: Option<String>,
    /// Elevation gain in meters
    pub total_elevation_gain: Option<f64>,
    /// Average speed in m/s
    pub average_speed: Option<f64>,
    /// Start date/time (ISO 8601)
    pub start_date: Option<String>,
}

/// Telemetry in canonical units, ready for prompts and overlays.
///
/// All numbers are non-negative and already rounded to display precision.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct NormalizedActivity {
    /// Distance in kilometers, two decimals
    pub distance_km: f64,
    /// Moving time as "Hh Mm Ss"
    pub duration: String,
    /// Sport type, "Unknown" when absent
    pub activity_type: String,
    /// Elevation gain in whole meters
    pub elevation_m: u64,
    /// Average speed in km/h, one decimal
    pub avg_speed_kmh: f64,
    /// Description, name, or "No description"
    pub description: String,
}

impl NormalizedActivity {
    /// Distance formatted with two decimals, e.g. `"12.00"`.
    pub fn distance_label(&self) -> String {
        format!("{:.2}", self.distance_km)
    }

    /// Average speed formatted with one decimal, e.g. `"12.0"`.
    pub fn avg_speed_label(&self) -> String {
        format!("{:.1}", self.avg_speed_kmh)
    }
}
