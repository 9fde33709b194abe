// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod activity;
pub mod meme;
pub mod mood;

pub use activity::{ActivityRecord, NormalizedActivity};
pub use meme::{MemeArtifact, UploadOutcome};
pub use mood::MoodLabel;
