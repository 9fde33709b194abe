// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Meme caption generation.
//!
//! Unlike mood classification, a failed caption call fails the whole run:
//! the caption is the part of the meme people actually read.

use crate::error::{AppError, Result};
use crate::models::NormalizedActivity;
use crate::services::llm::{complete_within, CompletionPreset, CompletionRequest, TextCompletion};
use std::sync::Arc;
use std::time::Duration;

const CAPTION_INSTRUCTION: &str = "You are a witty meme generator that creates funny, \
sarcastic, and trending captions for duck photos based on workout data. Keep it to one or \
two short sentences. Feel free to round the numbers. Take the athlete's own description of \
the activity into account when it says something interesting.";

/// Generates captions with the caption preset.
#[derive(Clone)]
pub struct CaptionGenerator {
    llm: Arc<dyn TextCompletion>,
    timeout: Duration,
    max_tokens: u32,
    max_chars: usize,
}

impl CaptionGenerator {
    pub fn new(
        llm: Arc<dyn TextCompletion>,
        timeout: Duration,
        max_tokens: u32,
        max_chars: usize,
    ) -> Self {
        Self {
            llm,
            timeout,
            max_tokens,
            max_chars,
        }
    }

    pub async fn generate(&self, activity: &NormalizedActivity) -> Result<String> {
        let request = CompletionRequest::new(
            CAPTION_INSTRUCTION,
            caption_prompt(activity),
            CompletionPreset::caption(self.max_tokens),
        );

        let raw = complete_within(self.llm.as_ref(), request, self.timeout)
            .await
            .map_err(|e| AppError::CaptionGeneration(e.to_string()))?;

        let caption = clamp_chars(strip_quotes(&raw), self.max_chars);
        tracing::info!(chars = caption.chars().count(), "Caption generated");
        Ok(caption)
    }
}

fn caption_prompt(activity: &NormalizedActivity) -> String {
    format!(
        "Create a funny, sarcastic meme caption for a duck photo based on this workout data:\n\
         Distance: {}km\n\
         Time: {}\n\
         Type: {}\n\
         Elevation Gain: {}m\n\
         Average Speed: {}km/h\n\
         Description: {}",
        activity.distance_label(),
        activity.duration,
        activity.activity_type,
        activity.elevation_m,
        activity.avg_speed_label(),
        activity.description,
    )
}

/// Trim whitespace and one pair of wrapping quote marks.
fn strip_quotes(raw: &str) -> &str {
    let trimmed = raw.trim();
    for (open, close) in [('"', '"'), ('“', '”'), ('\'', '\'')] {
        if let Some(inner) = trimmed
            .strip_prefix(open)
            .and_then(|s| s.strip_suffix(close))
        {
            return inner.trim();
        }
    }
    trimmed
}

/// Cut to at most `max_chars` characters, backing off to a word boundary.
fn clamp_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let cut: String = text.chars().take(max_chars).collect();
    match cut.rfind(char::is_whitespace) {
        Some(idx) if idx > 0 => cut[..idx].trim_end().to_string(),
        _ => cut,
    }
}
