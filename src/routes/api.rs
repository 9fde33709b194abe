// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for activities and memes.

use crate::error::{AppError, Result};
use crate::middleware::auth::RequestCredential;
use crate::models::meme::ARTIFACT_CONTENT_TYPE;
use crate::models::{ActivityRecord, NormalizedActivity, UploadOutcome};
use crate::services::motivation::{duck_motivation, Motivation};
use crate::services::normalizer::normalize;
use crate::services::pipeline::{ActivityRef, MemeOptions, MemeRun};
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// API routes. The credential middleware is applied in routes/mod.rs.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/activities", get(get_activities))
        .route("/api/activities/latest/meme", post(generate_latest_meme))
        .route(
            "/api/activities/{id}/meme",
            post(generate_meme).get(download_meme),
        )
        .route("/api/memes/batch", post(generate_batch))
}

// ─── Activities ──────────────────────────────────────────────

#[derive(Deserialize)]
struct ActivitiesQuery {
    #[serde(default = "default_per_page")]
    per_page: u32,
}

fn default_per_page() -> u32 {
    10
}

const MAX_PER_PAGE: u32 = 50;

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ActivitiesResponse {
    pub activities: Vec<ActivitySummary>,
}

#[derive(Serialize, Debug)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ActivitySummary {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub id: u64,
    pub name: String,
    pub start_date: Option<String>,
    pub stats: NormalizedActivity,
    pub motivation: Motivation,
    /// A meme for this activity is cached and can be downloaded
    pub meme_available: bool,
}

/// Recent activities with stats and a word from the duck.
async fn get_activities(
    State(state): State<Arc<AppState>>,
    Extension(credential): Extension<RequestCredential>,
    Query(params): Query<ActivitiesQuery>,
) -> Result<Json<ActivitiesResponse>> {
    if params.per_page < 1 {
        return Err(AppError::BadRequest(
            "per_page must be greater than 0".to_string(),
        ));
    }
    let per_page = params.per_page.min(MAX_PER_PAGE);
    tracing::debug!(per_page, "Fetching recent activities");

    let records = state
        .pipeline
        .recent_activities(&credential, per_page)
        .await?;

    let activities = records
        .into_iter()
        .map(|record| {
            let stats = normalize(&record);
            ActivitySummary {
                id: record.id,
                name: record.name.unwrap_or_else(|| "Untitled".to_string()),
                start_date: record.start_date,
                motivation: duck_motivation(&stats),
                meme_available: state.memes.contains(record.id),
                stats,
            }
        })
        .collect();

    Ok(Json(ActivitiesResponse { activities }))
}

// ─── Meme Generation ─────────────────────────────────────────

/// Body for meme generation; every field may be omitted.
#[derive(Deserialize, Default)]
#[serde(default)]
struct GenerateMemeRequest {
    /// Overrides the configured auto-upload default
    auto_upload: Option<bool>,
    regenerate: bool,
    /// Telemetry the caller already has; skips the Strava fetch
    activity: Option<ActivityRecord>,
}

#[derive(Serialize, Debug)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MemeResponse {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub activity_id: u64,
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub mood: crate::models::MoodLabel,
    pub caption: String,
    pub generated_at: String,
    /// JPEG as a `data:` URL
    pub image: String,
    pub from_cache: bool,
    #[cfg_attr(feature = "binding-generation", ts(type = "unknown"))]
    pub upload: Option<UploadOutcome>,
}

impl From<MemeRun> for MemeResponse {
    fn from(run: MemeRun) -> Self {
        let artifact = run.artifact;
        Self {
            activity_id: artifact.activity_id,
            mood: artifact.mood,
            caption: artifact.caption.clone(),
            generated_at: format_utc_rfc3339(artifact.generated_at),
            image: artifact.data_url(),
            from_cache: run.from_cache,
            upload: run.upload,
        }
    }
}

fn meme_options(state: &AppState, auto_upload: Option<bool>, regenerate: bool) -> MemeOptions {
    MemeOptions {
        auto_upload: auto_upload.unwrap_or(state.config.auto_upload),
        regenerate,
    }
}

/// Generate (or fetch the cached) meme for an activity.
async fn generate_meme(
    State(state): State<Arc<AppState>>,
    Extension(credential): Extension<RequestCredential>,
    Path(activity_id): Path<u64>,
    Json(body): Json<GenerateMemeRequest>,
) -> Result<Json<MemeResponse>> {
    let activity = match body.activity {
        Some(record) => ActivityRef::prefetched(activity_id, record),
        None => ActivityRef::fetch(activity_id),
    };
    let options = meme_options(&state, body.auto_upload, body.regenerate);

    let run = state
        .pipeline
        .generate_meme(activity, options, &credential, &state.memes)
        .await?;

    Ok(Json(run.into()))
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct LatestMemeRequest {
    auto_upload: Option<bool>,
    regenerate: bool,
}

/// Generate the meme for the athlete's most recent activity.
async fn generate_latest_meme(
    State(state): State<Arc<AppState>>,
    Extension(credential): Extension<RequestCredential>,
    Json(body): Json<LatestMemeRequest>,
) -> Result<Json<MemeResponse>> {
    let options = meme_options(&state, body.auto_upload, body.regenerate);

    let run = state
        .pipeline
        .generate_latest(options, &credential, &state.memes)
        .await?;

    Ok(Json(run.into()))
}

/// Download a generated meme as a JPEG file.
async fn download_meme(
    State(state): State<Arc<AppState>>,
    Path(activity_id): Path<u64>,
) -> Result<Response> {
    let artifact = state.memes.get(activity_id).ok_or_else(|| {
        AppError::NotFound(format!("No meme generated for activity {}", activity_id))
    })?;

    let disposition = format!("attachment; filename=\"{}\"", artifact.file_name());
    Ok((
        [
            (header::CONTENT_TYPE, ARTIFACT_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        artifact.image.clone(),
    )
        .into_response())
}

// ─── Batch ───────────────────────────────────────────────────

const MAX_BATCH: usize = 20;

#[derive(Deserialize)]
struct BatchRequest {
    activity_ids: Vec<u64>,
    #[serde(default)]
    auto_upload: Option<bool>,
    #[serde(default)]
    regenerate: bool,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct BatchResponse {
    pub results: Vec<BatchItem>,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct BatchItem {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub activity_id: u64,
    pub meme: Option<MemeResponse>,
    pub error: Option<String>,
}

/// Generate memes for several activities.
///
/// Per-activity failures are reported in the item, not as a request error.
async fn generate_batch(
    State(state): State<Arc<AppState>>,
    Extension(credential): Extension<RequestCredential>,
    Json(body): Json<BatchRequest>,
) -> Result<Json<BatchResponse>> {
    let mut activity_ids = body.activity_ids;
    activity_ids.sort_unstable();
    activity_ids.dedup();

    if activity_ids.is_empty() {
        return Err(AppError::BadRequest(
            "activity_ids must not be empty".to_string(),
        ));
    }
    if activity_ids.len() > MAX_BATCH {
        return Err(AppError::BadRequest(format!(
            "At most {} activities per batch",
            MAX_BATCH
        )));
    }

    let options = meme_options(&state, body.auto_upload, body.regenerate);
    let results = state
        .pipeline
        .generate_batch(activity_ids, options, &credential, &state.memes)
        .await
        .into_iter()
        .map(|(activity_id, run)| match run {
            Ok(run) => BatchItem {
                activity_id,
                meme: Some(run.into()),
                error: None,
            },
            Err(e) => BatchItem {
                activity_id,
                meme: None,
                error: Some(e.to_string()),
            },
        })
        .collect();

    Ok(Json(BatchResponse { results }))
}
