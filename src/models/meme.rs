// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Generated meme artifacts and upload outcomes.

use crate::error::UploadError;
use crate::models::MoodLabel;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// MIME type of every encoded artifact.
pub const ARTIFACT_CONTENT_TYPE: &str = "image/jpeg";

/// The composed image produced by one pipeline run.
#[derive(Debug, Clone)]
pub struct MemeArtifact {
    /// Source Strava activity ID
    pub activity_id: u64,
    /// Encoded JPEG bytes
    pub image: Vec<u8>,
    /// When this artifact was composed
    pub generated_at: DateTime<Utc>,
    /// Mood the photo was chosen for
    pub mood: MoodLabel,
    /// Caption drawn onto the photo
    pub caption: String,
}

impl MemeArtifact {
    /// Encode the image as a `data:` URL for embedding in JSON responses.
    pub fn data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            ARTIFACT_CONTENT_TYPE,
            BASE64.encode(&self.image)
        )
    }

    /// File name used when the artifact is downloaded or uploaded.
    pub fn file_name(&self) -> String {
        format!("duck_meme_{}.jpg", self.activity_id)
    }
}

/// Result of publishing an artifact back to its activity.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UploadOutcome {
    /// Strava accepted the upload; the confirmation body is passed through.
    Uploaded { confirmation: serde_json::Value },
    /// The upload did not happen or was rejected.
    Failed { error: UploadError },
}

impl UploadOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, UploadOutcome::Uploaded { .. })
    }

    pub fn error(&self) -> Option<&UploadError> {
        match self {
            UploadOutcome::Failed { error } => Some(error),
            UploadOutcome::Uploaded { .. } => None,
        }
    }
}
