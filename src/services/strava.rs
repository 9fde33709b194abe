// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava API client for fetching activities and publishing memes.
//!
//! Handles:
//! - Activity fetching (detail and recent list)
//! - Token scope introspection
//! - Multipart meme uploads
//! - Rate limit and rejected-token detection

use crate::error::AppError;
use crate::models::ActivityRecord;
use async_trait::async_trait;
use reqwest::multipart;
use serde::Deserialize;
use std::time::Duration;

/// Scope required to publish to an activity.
pub const WRITE_SCOPE: &str = "activity:write";

/// The Strava operations the pipeline depends on.
#[async_trait]
pub trait ActivityApi: Send + Sync {
    /// Get a detailed activity by ID.
    async fn get_activity(
        &self,
        access_token: &str,
        activity_id: u64,
    ) -> Result<ActivityRecord, AppError>;

    /// List the athlete's activities, newest first.
    async fn list_activities(
        &self,
        access_token: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<ActivityRecord>, AppError>;

    /// Scopes granted to the access token.
    async fn granted_scopes(&self, access_token: &str) -> Result<Vec<String>, AppError>;

    /// Upload an encoded image for an activity; returns Strava's confirmation body.
    async fn upload_image(
        &self,
        access_token: &str,
        activity_id: u64,
        file_name: &str,
        image: Vec<u8>,
    ) -> Result<serde_json::Value, AppError>;
}

/// Strava API client.
#[derive(Clone)]
pub struct StravaClient {
    http: reqwest::Client,
    base_url: String,
    introspection_url: String,
}

impl StravaClient {
    /// Create a new Strava client.
    pub fn new(
        base_url: String,
        introspection_url: String,
        timeout_secs: u64,
    ) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            introspection_url,
        })
    }

    /// Generic GET request with JSON response.
    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        access_token: &str,
        query: &[(&str, String)],
    ) -> Result<T, AppError> {
        let response = self
            .http
            .get(url)
            .bearer_auth(access_token)
            .query(query)
            .send()
            .await
            .map_err(|e| request_error(e, "Request failed"))?;

        check_response_json(response).await
    }
}

#[async_trait]
impl ActivityApi for StravaClient {
    async fn get_activity(
        &self,
        access_token: &str,
        activity_id: u64,
    ) -> Result<ActivityRecord, AppError> {
        let url = format!("{}/activities/{}", self.base_url, activity_id);
        self.get_json(&url, access_token, &[]).await
    }

    async fn list_activities(
        &self,
        access_token: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<ActivityRecord>, AppError> {
        let url = format!("{}/athlete/activities", self.base_url);
        self.get_json(
            &url,
            access_token,
            &[("page", page.to_string()), ("per_page", per_page.to_string())],
        )
        .await
    }

    async fn granted_scopes(&self, access_token: &str) -> Result<Vec<String>, AppError> {
        let response = self
            .http
            .post(&self.introspection_url)
            .form(&[("token", access_token)])
            .send()
            .await
            .map_err(|e| request_error(e, "Introspection request failed"))?;

        let introspection: Introspection = check_response_json(response).await?;
        if !introspection.active {
            return Ok(Vec::new());
        }
        Ok(parse_scopes(introspection.scope.as_deref().unwrap_or_default()))
    }

    async fn upload_image(
        &self,
        access_token: &str,
        activity_id: u64,
        file_name: &str,
        image: Vec<u8>,
    ) -> Result<serde_json::Value, AppError> {
        let url = format!("{}/uploads", self.base_url);

        let file = multipart::Part::bytes(image)
            .file_name(file_name.to_string())
            .mime_str(crate::models::meme::ARTIFACT_CONTENT_TYPE)
            .map_err(|e| AppError::strava_other(e.to_string()))?;
        let form = multipart::Form::new()
            .part("file", file)
            .text("activity_id", activity_id.to_string())
            .text("data_type", "jpg");

        let response = self
            .http
            .post(&url)
            .bearer_auth(access_token)
            .multipart(form)
            .send()
            .await
            .map_err(|e| request_error(e, "Upload request failed"))?;

        let confirmation: serde_json::Value = check_response_json(response).await?;
        tracing::info!(activity_id, "Meme uploaded to Strava");
        Ok(confirmation)
    }
}

/// RFC 7662 introspection response (only the fields we read).
#[derive(Debug, Deserialize)]
struct Introspection {
    #[serde(default)]
    active: bool,
    #[serde(default)]
    scope: Option<String>,
}

/// Split a scope string. Strava joins scopes with commas, OAuth servers
/// generally with spaces; accept both.
pub fn parse_scopes(raw: &str) -> Vec<String> {
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Classify a reqwest error from `send()`. Only connect failures and
/// timeouts count as unreachable; other errors may have reached Strava.
fn request_error(e: reqwest::Error, context: &str) -> AppError {
    let message = format!("{}: {}", context, e);
    if e.is_connect() || e.is_timeout() {
        AppError::strava_unreachable(message)
    } else if let Some(status) = e.status() {
        AppError::strava_status(status.as_u16(), message)
    } else {
        AppError::strava_other(message)
    }
}

/// Map a non-success status and its body to an error.
fn status_error(status: reqwest::StatusCode, body: &str) -> AppError {
    match status.as_u16() {
        429 => {
            tracing::warn!("Strava rate limit hit (429)");
            AppError::strava_status(429, AppError::STRAVA_RATE_LIMIT)
        }
        // Token may be expired or revoked
        401 => AppError::strava_status(401, AppError::STRAVA_TOKEN_ERROR),
        code => AppError::strava_status(code, format!("HTTP {}: {}", status, body)),
    }
}

/// Check response and parse JSON body.
async fn check_response_json<T: for<'de> Deserialize<'de>>(
    response: reqwest::Response,
) -> Result<T, AppError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(status_error(status, &body));
    }

    // 2xx decode failures are final
    response
        .json()
        .await
        .map_err(|e| AppError::strava_other(format!("JSON parse error: {}", e)))
}
