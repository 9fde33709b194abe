// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Meme pipeline orchestration.
//!
//! One run: normalize the activity, classify mood and write the caption
//! concurrently, pick a photo for the mood, compose, store the artifact,
//! then optionally upload it. Any failure before the artifact exists fails
//! the run; upload failures are reported alongside the artifact.

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::{ActivityRecord, MemeArtifact, UploadOutcome};
use crate::services::cache::ArtifactCache;
use crate::services::caption::CaptionGenerator;
use crate::services::composer::ImageComposer;
use crate::services::credentials::CredentialProvider;
use crate::services::llm::TextCompletion;
use crate::services::mood::MoodClassifier;
use crate::services::normalizer;
use crate::services::photo::{AssetStore, PhotoSelector};
use crate::services::strava::ActivityApi;
use crate::services::upload::UploadAdapter;
use chrono::Utc;
use futures_util::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Duration;

/// Maximum concurrent runs in a batch.
const MAX_CONCURRENT_RUNS: usize = 4;

/// The activity a run is for.
#[derive(Debug, Clone)]
pub struct ActivityRef {
    pub id: u64,
    /// Telemetry the caller already has; fetched with the credential if absent
    pub telemetry: Option<ActivityRecord>,
}

impl ActivityRef {
    pub fn fetch(id: u64) -> Self {
        Self {
            id,
            telemetry: None,
        }
    }

    pub fn prefetched(id: u64, record: ActivityRecord) -> Self {
        Self {
            id,
            telemetry: Some(record),
        }
    }
}

/// Per-call options.
#[derive(Debug, Clone, Copy, Default)]
pub struct MemeOptions {
    pub auto_upload: bool,
    /// Ignore a cached artifact and generate a fresh one
    pub regenerate: bool,
}

/// Result of one run.
#[derive(Debug, Clone)]
pub struct MemeRun {
    pub artifact: Arc<MemeArtifact>,
    /// Set only when an upload was attempted
    pub upload: Option<UploadOutcome>,
    pub from_cache: bool,
}

/// Pipeline tunables taken from [`Config`].
#[derive(Debug, Clone, Copy)]
pub struct PipelineSettings {
    pub llm_timeout: Duration,
    pub caption_max_tokens: u32,
    pub caption_max_chars: usize,
    pub upload_retry_once: bool,
}

impl PipelineSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            llm_timeout: Duration::from_secs(config.llm_timeout_secs),
            caption_max_tokens: config.caption_max_tokens,
            caption_max_chars: config.caption_max_chars,
            upload_retry_once: config.upload_retry_once,
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Runs the meme pipeline.
#[derive(Clone)]
pub struct MemePipeline {
    strava: Arc<dyn ActivityApi>,
    classifier: MoodClassifier,
    captions: CaptionGenerator,
    photos: PhotoSelector,
    composer: ImageComposer,
    uploader: UploadAdapter,
}

impl MemePipeline {
    pub fn new(
        strava: Arc<dyn ActivityApi>,
        llm: Arc<dyn TextCompletion>,
        assets: Arc<dyn AssetStore>,
        composer: ImageComposer,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            classifier: MoodClassifier::new(llm.clone(), settings.llm_timeout),
            captions: CaptionGenerator::new(
                llm,
                settings.llm_timeout,
                settings.caption_max_tokens,
                settings.caption_max_chars,
            ),
            photos: PhotoSelector::new(assets),
            composer,
            uploader: UploadAdapter::new(strava.clone(), settings.upload_retry_once),
            strava,
        }
    }

    /// Generate (or reuse) the meme for one activity.
    pub async fn generate_meme(
        &self,
        activity: ActivityRef,
        options: MemeOptions,
        credentials: &dyn CredentialProvider,
        cache: &ArtifactCache,
    ) -> Result<MemeRun> {
        let activity_id = activity.id;

        if !options.regenerate {
            if let Some(artifact) = cache.get(activity_id) {
                tracing::debug!(activity_id, "Using cached meme");
                return Ok(MemeRun {
                    artifact,
                    upload: None,
                    from_cache: true,
                });
            }
        }

        let ticket = cache.begin(activity_id);
        tracing::info!(activity_id, seq = ticket.seq(), "Generating meme");

        let record = match activity.telemetry {
            Some(record) => record,
            None => self.fetch_activity(activity_id, credentials).await?,
        };
        let normalized = normalizer::normalize(&record);

        let (mood, caption) = tokio::join!(
            self.classifier.classify(&normalized),
            self.captions.generate(&normalized)
        );
        let caption = caption?;

        let photo = self.photos.select(mood).await;
        let photo_bytes = self
            .photos
            .load(&photo)
            .await
            .map_err(|e| AppError::Composition(e.to_string()))?;

        let composer = self.composer.clone();
        let stats = normalized.clone();
        let text = caption.clone();
        let image = tokio::task::spawn_blocking(move || composer.compose(&photo_bytes, &text, &stats))
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Composition task failed: {}", e)))?
            .map_err(|e| AppError::Composition(e.to_string()))?;

        let artifact = Arc::new(MemeArtifact {
            activity_id,
            image,
            generated_at: Utc::now(),
            mood,
            caption,
        });

        if !cache.commit(&ticket, artifact.clone()) {
            tracing::info!(
                activity_id,
                seq = ticket.seq(),
                "Newer run already stored a meme, skipping store and upload"
            );
            return Ok(MemeRun {
                artifact,
                upload: None,
                from_cache: false,
            });
        }

        tracing::info!(
            activity_id,
            mood = %artifact.mood,
            photo = photo.path,
            bytes = artifact.image.len(),
            "Meme generated"
        );

        let upload = if options.auto_upload {
            Some(
                self.uploader
                    .upload(&artifact, activity_id, credentials)
                    .await,
            )
        } else {
            None
        };

        Ok(MemeRun {
            artifact,
            upload,
            from_cache: false,
        })
    }

    /// Generate memes for several activities, a few at a time.
    ///
    /// Results come back in completion order, one per requested ID.
    pub async fn generate_batch(
        &self,
        activity_ids: Vec<u64>,
        options: MemeOptions,
        credentials: &dyn CredentialProvider,
        cache: &ArtifactCache,
    ) -> Vec<(u64, Result<MemeRun>)> {
        stream::iter(activity_ids)
            .map(|activity_id| async move {
                let run = self
                    .generate_meme(ActivityRef::fetch(activity_id), options, credentials, cache)
                    .await;
                if let Err(e) = &run {
                    tracing::warn!(activity_id, error = %e, "Batch meme run failed");
                }
                (activity_id, run)
            })
            .buffer_unordered(MAX_CONCURRENT_RUNS)
            .collect()
            .await
    }

    /// Generate the meme for the athlete's most recent activity.
    pub async fn generate_latest(
        &self,
        options: MemeOptions,
        credentials: &dyn CredentialProvider,
        cache: &ArtifactCache,
    ) -> Result<MemeRun> {
        let latest = self
            .recent_activities(credentials, 1)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound("No activities yet".to_string()))?;

        self.generate_meme(
            ActivityRef::prefetched(latest.id, latest),
            options,
            credentials,
            cache,
        )
        .await
    }

    /// The athlete's most recent activities, newest first.
    pub async fn recent_activities(
        &self,
        credentials: &dyn CredentialProvider,
        per_page: u32,
    ) -> Result<Vec<ActivityRecord>> {
        let credential = credentials.credential().ok_or(AppError::Unauthorized)?;
        self.strava
            .list_activities(credential.access_token(), 1, per_page)
            .await
    }

    async fn fetch_activity(
        &self,
        activity_id: u64,
        credentials: &dyn CredentialProvider,
    ) -> Result<ActivityRecord> {
        let credential = credentials.credential().ok_or(AppError::Unauthorized)?;
        self.strava
            .get_activity(credential.access_token(), activity_id)
            .await
    }
}
