// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Mood labels that drive photo selection.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of moods a workout can be classified into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoodLabel {
    Tired,
    Excited,
    Proud,
    Energetic,
    #[default]
    Default,
}

impl MoodLabel {
    pub const ALL: [MoodLabel; 5] = [
        MoodLabel::Tired,
        MoodLabel::Excited,
        MoodLabel::Proud,
        MoodLabel::Energetic,
        MoodLabel::Default,
    ];

    /// The token the classifier is asked to answer with.
    pub fn as_str(&self) -> &'static str {
        match self {
            MoodLabel::Tired => "tired",
            MoodLabel::Excited => "excited",
            MoodLabel::Proud => "proud",
            MoodLabel::Energetic => "energetic",
            MoodLabel::Default => "default",
        }
    }

    /// Resolve a model reply to a label.
    ///
    /// The reply is trimmed and lower-cased; trailing sentence punctuation is
    /// tolerated. Anything else resolves to [`MoodLabel::Default`].
    pub fn from_response(response: &str) -> Self {
        let token = response
            .trim()
            .trim_end_matches(['.', '!', '"', '\''])
            .trim_start_matches(['"', '\''])
            .to_lowercase();

        Self::ALL
            .into_iter()
            .find(|mood| mood.as_str() == token)
            .unwrap_or_default()
    }
}

impl fmt::Display for MoodLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
