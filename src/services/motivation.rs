// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Canned duck motivation shown next to each activity.

use crate::models::NormalizedActivity;
use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Motivation {
    pub message: String,
    pub meme_text: String,
}

impl Motivation {
    fn new(message: &str, meme_text: &str) -> Self {
        Self {
            message: message.to_string(),
            meme_text: meme_text.to_string(),
        }
    }
}

const FAST_KMH: f64 = 20.0;
const LONG_KM: f64 = 10.0;
const HILLY_M: u64 = 100;

/// Pick a message; speed beats distance beats climbing.
pub fn duck_motivation(activity: &NormalizedActivity) -> Motivation {
    if activity.avg_speed_kmh > FAST_KMH {
        Motivation::new(
            "ZOOM ZOOM! You're faster than a duck being chased by a bread truck! 🦆💨",
            "Speed demon duck approves!",
        )
    } else if activity.distance_km > LONG_KM {
        Motivation::new(
            "Look at you go! Even mother duck is proud of this long journey! 🦆👏",
            "Long distance duck salutes you!",
        )
    } else if activity.elevation_m > HILLY_M {
        Motivation::new(
            "Hills? More like THRILLS! You're climbing higher than a duck in an elevator! 🦆⛰️",
            "Mountain duck energy!",
        )
    } else {
        Motivation::new(
            "Remember: Even a duck paddles like crazy under the surface! Keep going! 🦆💪",
            "Determined duck believes in you!",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn activity(distance_km: f64, avg_speed_kmh: f64, elevation_m: u64) -> NormalizedActivity {
        NormalizedActivity {
            distance_km,
            duration: "0h 0m 0s".to_string(),
            activity_type: "Ride".to_string(),
            elevation_m,
            avg_speed_kmh,
            description: "No description".to_string(),
        }
    }

    #[test]
    fn test_speed_wins() {
        let m = duck_motivation(&activity(50.0, 25.0, 500));
        assert_eq!(m.meme_text, "Speed demon duck approves!");
    }

    #[test]
    fn test_distance_then_elevation() {
        assert_eq!(
            duck_motivation(&activity(12.0, 10.0, 500)).meme_text,
            "Long distance duck salutes you!"
        );
        assert_eq!(
            duck_motivation(&activity(5.0, 10.0, 150)).meme_text,
            "Mountain duck energy!"
        );
    }

    #[test]
    fn test_fallback_message() {
        assert_eq!(
            duck_motivation(&activity(0.0, 0.0, 0)).meme_text,
            "Determined duck believes in you!"
        );
    }
}
