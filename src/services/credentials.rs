// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Access credentials handed in by the caller.
//!
//! The pipeline never stores tokens. Every call receives a
//! [`CredentialProvider`]; where the token came from (cookie, header, a
//! token service) is the caller's business.

use std::fmt;

/// Opaque Strava bearer token.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wrap a token; blank tokens count as no credential.
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into().trim().to_string();
        (!token.is_empty()).then_some(Self(token))
    }

    pub fn access_token(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Supplies the credential for one pipeline call.
pub trait CredentialProvider: Send + Sync {
    fn credential(&self) -> Option<Credential>;
}

/// A credential fixed for the lifetime of one request.
#[derive(Debug, Clone, Default)]
pub struct StaticCredential(pub Option<Credential>);

impl StaticCredential {
    pub fn none() -> Self {
        Self(None)
    }

    pub fn bearer(token: impl Into<String>) -> Self {
        Self(Credential::new(token))
    }
}

impl CredentialProvider for StaticCredential {
    fn credential(&self) -> Option<Credential> {
        self.0.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_token_is_no_credential() {
        assert!(Credential::new("   ").is_none());
        assert!(StaticCredential::bearer("").credential().is_none());
    }

    #[test]
    fn test_debug_redacts_token() {
        let cred = Credential::new("secret-token").unwrap();
        assert_eq!(format!("{:?}", cred), "Credential(***)");
        assert_eq!(cred.access_token(), "secret-token");
    }
}
