// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
///
/// Only run-fatal failures live here. Classifier and asset failures are
/// absorbed inside their services, and upload failures travel as
/// [`UploadError`] attached to an otherwise successful run.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Strava API error: {message}")]
    StravaApi {
        failure: StravaFailure,
        message: String,
    },

    #[error("Caption generation failed: {0}")]
    CaptionGeneration(String),

    #[error("Image composition failed: {0}")]
    Composition(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// How a Strava call failed, as observed on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StravaFailure {
    /// Strava (or the introspection endpoint) answered with this non-2xx status.
    Status(u16),
    /// No response: the connection could not be made or timed out.
    Unreachable,
    /// Anything else, including a 2xx body that failed to decode.
    Other,
}

impl AppError {
    /// Message for Strava 429 responses.
    pub const STRAVA_RATE_LIMIT: &'static str = "Rate limit exceeded";

    /// Message for Strava 401 responses.
    pub const STRAVA_TOKEN_ERROR: &'static str = "Token expired or invalid";

    /// Strava answered with a non-success status.
    pub fn strava_status(status: u16, message: impl Into<String>) -> Self {
        AppError::StravaApi {
            failure: StravaFailure::Status(status),
            message: message.into(),
        }
    }

    /// Strava could not be reached at all.
    pub fn strava_unreachable(message: impl Into<String>) -> Self {
        AppError::StravaApi {
            failure: StravaFailure::Unreachable,
            message: message.into(),
        }
    }

    pub fn strava_other(message: impl Into<String>) -> Self {
        AppError::StravaApi {
            failure: StravaFailure::Other,
            message: message.into(),
        }
    }

    /// The failure kind, for Strava errors.
    pub fn strava_failure(&self) -> Option<StravaFailure> {
        match self {
            AppError::StravaApi { failure, .. } => Some(*failure),
            _ => None,
        }
    }

    /// Whether Strava rejected the access token (HTTP 401).
    pub fn is_strava_token_error(&self) -> bool {
        self.strava_failure() == Some(StravaFailure::Status(401))
    }

    /// Whether this is a Strava error worth one more attempt:
    /// 429, any 5xx, or no response at all.
    pub fn is_strava_transient(&self) -> bool {
        match self.strava_failure() {
            Some(StravaFailure::Status(status)) => status == 429 || (500..=599).contains(&status),
            Some(StravaFailure::Unreachable) => true,
            Some(StravaFailure::Other) | None => false,
        }
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", None),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", Some(msg.clone())),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
            AppError::StravaApi { message, .. } => {
                (StatusCode::BAD_GATEWAY, "strava_error", Some(message.clone()))
            }
            AppError::CaptionGeneration(msg) => {
                tracing::warn!(error = %msg, "Caption generation failed");
                (StatusCode::BAD_GATEWAY, "caption_error", Some(msg.clone()))
            }
            AppError::Composition(msg) => {
                tracing::error!(error = %msg, "Composition error");
                (StatusCode::INTERNAL_SERVER_ERROR, "composition_error", None)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;

/// Why publishing an artifact back to Strava did not happen.
///
/// Never fatal to a run: the artifact is still returned with this attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UploadError {
    #[error("No access credential available")]
    MissingCredential,

    #[error("Credential lacks write permission (granted: {granted:?})")]
    InsufficientScope { granted: Vec<String> },

    #[error("Activity unreachable: {reason}")]
    ActivityUnreachable { reason: String },

    #[error("Upload failed: {reason}")]
    Transport { reason: String },
}

impl UploadError {
    /// The user has to reconnect Strava (or grant more scope) before retrying.
    pub fn needs_reauthentication(&self) -> bool {
        matches!(
            self,
            UploadError::MissingCredential | UploadError::InsufficientScope { .. }
        )
    }

    /// Retrying the network call could succeed without user action.
    pub fn is_retryable(&self) -> bool {
        matches!(self, UploadError::Transport { .. })
    }
}
