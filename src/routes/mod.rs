// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTTP route handlers.

pub mod api;

use crate::middleware::{auth::attach_credential, security::add_security_headers};
use crate::AppState;
use axum::extract::State;
use axum::http::{header, request::Parts, HeaderValue, Method};
use axum::{middleware, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub cached_memes: usize,
}

async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        cached_memes: state.memes.len(),
    })
}

/// Browser origins allowed to call the API: the configured frontend, plus
/// plain-http localhost on any port for development.
pub fn is_allowed_origin(frontend_url: &str, origin: &str) -> bool {
    if origin == frontend_url.trim_end_matches('/') {
        return true;
    }
    let Some(host_port) = origin.strip_prefix("http://") else {
        return false;
    };
    let host = host_port.split_once(':').map_or(host_port, |(host, _)| host);
    matches!(host, "localhost" | "127.0.0.1")
}

fn cors_layer(frontend_url: String) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _: &Parts| {
                origin
                    .to_str()
                    .is_ok_and(|origin| is_allowed_origin(&frontend_url, origin))
            },
        ))
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
}

/// Build the complete router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    // Credential is optional at this layer; handlers decide whether they need it
    let api_routes = api::routes().route_layer(middleware::from_fn(attach_credential));

    Router::new()
        .route("/health", get(health_check))
        .merge(api_routes)
        .layer(middleware::from_fn(add_security_headers))
        .layer(cors_layer(state.config.frontend_url.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRONTEND: &str = "https://ducks.example.com";

    #[test]
    fn test_frontend_origin_allowed() {
        assert!(is_allowed_origin(FRONTEND, "https://ducks.example.com"));
        assert!(is_allowed_origin("https://ducks.example.com/", FRONTEND));
    }

    #[test]
    fn test_local_dev_origins_allowed() {
        assert!(is_allowed_origin(FRONTEND, "http://localhost"));
        assert!(is_allowed_origin(FRONTEND, "http://localhost:5173"));
        assert!(is_allowed_origin(FRONTEND, "http://127.0.0.1:8080"));
    }

    #[test]
    fn test_lookalike_origins_rejected() {
        assert!(!is_allowed_origin(FRONTEND, "http://localhost.evil.example"));
        assert!(!is_allowed_origin(FRONTEND, "http://127.0.0.1.nip.io"));
        assert!(!is_allowed_origin(FRONTEND, "https://localhost:5173"));
        assert!(!is_allowed_origin(FRONTEND, "https://ducks.example.com.evil"));
        assert!(!is_allowed_origin(FRONTEND, ""));
    }
}
