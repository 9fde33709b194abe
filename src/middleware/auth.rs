// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava credential extraction.
//!
//! The token is not validated here. Routes that need Strava access fail
//! with 401 from the pipeline; routes that work from caller-supplied
//! telemetry run without one.

use crate::services::credentials::{Credential, CredentialProvider};
use axum::{extract::Request, http::header, middleware::Next, response::Response};
use axum_extra::extract::cookie::CookieJar;

/// Cookie holding the Strava access token.
pub const TOKEN_COOKIE: &str = "strava_token";

/// Credential carried by the current request, if any.
#[derive(Debug, Clone, Default)]
pub struct RequestCredential(pub Option<Credential>);

impl CredentialProvider for RequestCredential {
    fn credential(&self) -> Option<Credential> {
        self.0.clone()
    }
}

/// Attach the request's credential (cookie first, then bearer header).
pub async fn attach_credential(jar: CookieJar, mut request: Request, next: Next) -> Response {
    let token = match jar.get(TOKEN_COOKIE) {
        Some(cookie) => Credential::new(cookie.value()),
        None => request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .and_then(Credential::new),
    };

    request.extensions_mut().insert(RequestCredential(token));
    next.run(request).await
}
