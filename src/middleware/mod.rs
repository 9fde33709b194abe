// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Middleware modules (credentials, security headers).

pub mod auth;
pub mod security;

pub use auth::{attach_credential, RequestCredential};
