// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::http::StatusCode;
use axum::response::IntoResponse;
use duck_memes::error::{AppError, StravaFailure, UploadError};

#[test]
fn test_token_error_is_only_401() {
    assert!(AppError::strava_status(401, AppError::STRAVA_TOKEN_ERROR).is_strava_token_error());
    assert!(AppError::strava_status(401, "").is_strava_token_error());

    // Message text never decides the classification
    let cases = [
        AppError::strava_status(429, AppError::STRAVA_RATE_LIMIT),
        AppError::strava_status(403, r#"HTTP 403 Forbidden: {"message":"Authorization Error"}"#),
        AppError::strava_status(
            500,
            r#"HTTP 500 Internal Server Error: {"message":"invalid token cache"}"#,
        ),
        AppError::strava_unreachable(
            "Introspection request failed: error sending request for url \
             (https://sso.example.com/realms/duck/protocol/openid-connect/token/introspect)",
        ),
        AppError::strava_other("JSON parse error: invalid type: string, expected u64"),
        AppError::CaptionGeneration("token limit".to_string()),
    ];
    for err in cases {
        assert!(!err.is_strava_token_error(), "{}", err);
    }
}

#[test]
fn test_is_strava_transient() {
    let retryable = [
        AppError::strava_status(429, AppError::STRAVA_RATE_LIMIT),
        AppError::strava_status(502, "HTTP 502 Bad Gateway: "),
        AppError::strava_status(
            503,
            r#"HTTP 503 Service Unavailable: {"message":"upstream returned invalid response"}"#,
        ),
        AppError::strava_unreachable("Upload request failed: operation timed out"),
        AppError::strava_unreachable(
            "Upload request failed: error sending request for url \
             (https://www.strava.com/api/v3/uploads?access_token=redacted)",
        ),
    ];
    for err in retryable {
        assert!(err.is_strava_transient(), "{}", err);
    }

    let final_errors = [
        AppError::strava_status(401, AppError::STRAVA_TOKEN_ERROR),
        AppError::strava_status(404, "HTTP 404 Not Found: "),
        AppError::strava_other("JSON parse error: expected value at line 1 column 1"),
        AppError::Composition("bad jpeg".to_string()),
    ];
    for err in final_errors {
        assert!(!err.is_strava_transient(), "{}", err);
    }
}

#[test]
fn test_strava_failure_kind_and_display() {
    let err = AppError::strava_status(404, "HTTP 404 Not Found: Record Not Found");
    assert_eq!(err.strava_failure(), Some(StravaFailure::Status(404)));
    assert_eq!(
        err.to_string(),
        "Strava API error: HTTP 404 Not Found: Record Not Found"
    );
    assert_eq!(AppError::Unauthorized.strava_failure(), None);
}

#[test]
fn test_status_codes() {
    let cases = [
        (AppError::Unauthorized, StatusCode::UNAUTHORIZED),
        (AppError::NotFound("x".into()), StatusCode::NOT_FOUND),
        (AppError::BadRequest("x".into()), StatusCode::BAD_REQUEST),
        (AppError::strava_status(500, "x"), StatusCode::BAD_GATEWAY),
        (AppError::CaptionGeneration("x".into()), StatusCode::BAD_GATEWAY),
        (
            AppError::Composition("x".into()),
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
        (
            AppError::Internal(anyhow::anyhow!("x")),
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
    ];

    for (err, status) in cases {
        assert_eq!(err.into_response().status(), status);
    }
}

#[test]
fn test_upload_error_classification() {
    assert!(UploadError::MissingCredential.needs_reauthentication());
    assert!(UploadError::InsufficientScope { granted: vec![] }.needs_reauthentication());
    assert!(!UploadError::ActivityUnreachable {
        reason: "gone".into()
    }
    .is_retryable());
    assert!(UploadError::Transport {
        reason: "reset".into()
    }
    .is_retryable());
}
