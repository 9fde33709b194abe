// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Publishing memes back to their Strava activity.
//!
//! Preconditions are checked strictly in order, stopping at the first
//! failure, and nothing is sent to the upload endpoint unless all pass:
//! 1. A credential is present
//! 2. The credential carries `activity:write` (asked of the introspection endpoint)
//! 3. The target activity is reachable with that credential

use crate::error::{AppError, UploadError};
use crate::models::{MemeArtifact, UploadOutcome};
use crate::services::credentials::CredentialProvider;
use crate::services::strava::{ActivityApi, WRITE_SCOPE};
use std::sync::Arc;

/// Permission-gated uploader.
#[derive(Clone)]
pub struct UploadAdapter {
    strava: Arc<dyn ActivityApi>,
    retry_once: bool,
}

impl UploadAdapter {
    /// With `retry_once`, a transient publish failure (rate limit, 5xx,
    /// connection error) is retried exactly once.
    pub fn new(strava: Arc<dyn ActivityApi>, retry_once: bool) -> Self {
        Self { strava, retry_once }
    }

    /// Upload an artifact. Never fails; failures come back as
    /// [`UploadOutcome::Failed`].
    pub async fn upload(
        &self,
        artifact: &MemeArtifact,
        activity_id: u64,
        credentials: &dyn CredentialProvider,
    ) -> UploadOutcome {
        match self.try_upload(artifact, activity_id, credentials).await {
            Ok(confirmation) => UploadOutcome::Uploaded { confirmation },
            Err(error) => {
                tracing::warn!(
                    activity_id,
                    error = %error,
                    needs_reauth = error.needs_reauthentication(),
                    "Meme upload skipped"
                );
                UploadOutcome::Failed { error }
            }
        }
    }

    async fn try_upload(
        &self,
        artifact: &MemeArtifact,
        activity_id: u64,
        credentials: &dyn CredentialProvider,
    ) -> Result<serde_json::Value, UploadError> {
        // 1. Credential present
        let credential = credentials
            .credential()
            .ok_or(UploadError::MissingCredential)?;
        let token = credential.access_token();

        // 2. Write scope granted
        let granted = self.strava.granted_scopes(token).await.map_err(|e| {
            if e.is_strava_token_error() {
                UploadError::InsufficientScope {
                    granted: Vec::new(),
                }
            } else {
                UploadError::Transport {
                    reason: e.to_string(),
                }
            }
        })?;
        if !granted.iter().any(|s| s == WRITE_SCOPE) {
            return Err(UploadError::InsufficientScope { granted });
        }

        // 3. Activity reachable
        self.strava
            .get_activity(token, activity_id)
            .await
            .map_err(|e| UploadError::ActivityUnreachable {
                reason: e.to_string(),
            })?;

        match self.publish(token, artifact, activity_id).await {
            Ok(confirmation) => Ok(confirmation),
            Err(e) if self.retry_once && e.is_strava_transient() => {
                tracing::warn!(activity_id, error = %e, "Upload failed, retrying once");
                self.publish(token, artifact, activity_id)
                    .await
                    .map_err(transport)
            }
            Err(e) => Err(transport(e)),
        }
    }

    async fn publish(
        &self,
        token: &str,
        artifact: &MemeArtifact,
        activity_id: u64,
    ) -> Result<serde_json::Value, AppError> {
        self.strava
            .upload_image(
                token,
                activity_id,
                &artifact.file_name(),
                artifact.image.clone(),
            )
            .await
    }
}

fn transport(e: AppError) -> UploadError {
    UploadError::Transport {
        reason: e.to_string(),
    }
}
