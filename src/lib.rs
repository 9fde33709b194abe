// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Duck memes: turn Strava workouts into captioned duck photos
//!
//! This crate provides the backend API that classifies a workout's mood,
//! writes a caption, composes it onto a duck photo and optionally posts the
//! result back to the activity.

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use services::{ArtifactCache, MemePipeline};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub pipeline: MemePipeline,
    /// Generated memes for this process, keyed by activity ID
    pub memes: ArtifactCache,
}
