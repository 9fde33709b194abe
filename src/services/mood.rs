// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout mood classification.

use crate::models::{MoodLabel, NormalizedActivity};
use crate::services::llm::{complete_within, CompletionPreset, CompletionRequest, TextCompletion};
use std::sync::Arc;
use std::time::Duration;

const MOOD_INSTRUCTION: &str = "You are an expert at analyzing workout data and determining \
the appropriate emotional state. You should respond with ONLY ONE of these words: \
tired, excited, proud, energetic, or default.";

/// Maps a workout to one of the fixed moods. Never fails.
#[derive(Clone)]
pub struct MoodClassifier {
    llm: Arc<dyn TextCompletion>,
    timeout: Duration,
}

impl MoodClassifier {
    pub fn new(llm: Arc<dyn TextCompletion>, timeout: Duration) -> Self {
        Self { llm, timeout }
    }

    /// Classify an activity. Errors, timeouts and stray replies all resolve
    /// to [`MoodLabel::Default`].
    pub async fn classify(&self, activity: &NormalizedActivity) -> MoodLabel {
        let request =
            CompletionRequest::new(MOOD_INSTRUCTION, mood_prompt(activity), CompletionPreset::MOOD);

        match complete_within(self.llm.as_ref(), request, self.timeout).await {
            Ok(reply) => {
                let mood = MoodLabel::from_response(&reply);
                if mood == MoodLabel::Default && reply.trim().to_lowercase() != "default" {
                    tracing::debug!(reply = %reply, "Unrecognized mood reply, using default");
                }
                tracing::info!(mood = %mood, "Selected mood");
                mood
            }
            Err(e) => {
                tracing::warn!(error = %e, "Mood classification failed, using default");
                MoodLabel::Default
            }
        }
    }
}

fn mood_prompt(activity: &NormalizedActivity) -> String {
    format!(
        "Based on this workout data, what would be the most appropriate emotional state?\n\
         Distance: {}km\n\
         Time: {}\n\
         Type: {}\n\
         Elevation Gain: {}m\n\
         Average Speed: {}km/h",
        activity.distance_label(),
        activity.duration,
        activity.activity_type,
        activity.elevation_m,
        activity.avg_speed_label(),
    )
}
