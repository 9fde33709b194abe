// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use duck_memes::config::Config;
use duck_memes::error::{AppError, StravaFailure};
use duck_memes::models::ActivityRecord;
use duck_memes::routes::create_router;
use duck_memes::services::composer::TextRasterizer;
use duck_memes::services::llm::{CompletionPreset, CompletionRequest, LlmError, TextCompletion};
use duck_memes::services::{
    ArtifactCache, FsAssetStore, ImageComposer, Layout, MemePipeline, PipelineSettings,
};
use duck_memes::AppState;
use image::{Rgba, RgbaImage};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Every photo the selector can ask for.
#[allow(dead_code)]
pub const ALL_PHOTOS: [&str; 5] = [
    "duck/duck23.jpeg",
    "duck/duck76.jpeg",
    "duck/duck87.jpeg",
    "duck/duck88.jpeg",
    "duck/duck89.jpeg",
];

// ─── Text completion ─────────────────────────────────────────

/// Scripted completion client. Mood and caption calls are told apart by
/// their preset. `{n}` in the caption is replaced by the 1-based call number.
pub struct StubCompletion {
    mood_reply: String,
    caption_reply: Option<String>,
    caption_delays: Vec<Duration>,
    pub mood_calls: AtomicUsize,
    pub caption_calls: AtomicUsize,
}

#[allow(dead_code)]
impl StubCompletion {
    pub fn new(mood_reply: &str, caption_reply: &str) -> Self {
        Self {
            mood_reply: mood_reply.to_string(),
            caption_reply: Some(caption_reply.to_string()),
            caption_delays: Vec::new(),
            mood_calls: AtomicUsize::new(0),
            caption_calls: AtomicUsize::new(0),
        }
    }

    /// Caption calls fail with a transport error.
    pub fn failing_captions(mut self) -> Self {
        self.caption_reply = None;
        self
    }

    /// Delay the n-th caption call by `delays[n]`.
    pub fn with_caption_delays(mut self, delays: Vec<Duration>) -> Self {
        self.caption_delays = delays;
        self
    }

    pub fn mood_calls(&self) -> usize {
        self.mood_calls.load(Ordering::SeqCst)
    }

    pub fn caption_calls(&self) -> usize {
        self.caption_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextCompletion for StubCompletion {
    async fn complete(&self, request: CompletionRequest) -> Result<String, LlmError> {
        if request.preset == CompletionPreset::MOOD {
            self.mood_calls.fetch_add(1, Ordering::SeqCst);
            return Ok(self.mood_reply.clone());
        }

        let n = self.caption_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.caption_delays.get(n) {
            tokio::time::sleep(*delay).await;
        }
        match &self.caption_reply {
            Some(caption) => Ok(caption.replace("{n}", &(n + 1).to_string())),
            None => Err(LlmError::Http("connection refused".to_string())),
        }
    }
}

// ─── Strava ──────────────────────────────────────────────────

/// What reqwest reports when the introspection endpoint refuses the connection.
#[allow(dead_code)]
pub const INTROSPECTION_UNREACHABLE: &str = "Introspection request failed: error sending request \
     for url (https://sso.example.com/realms/duck/protocol/openid-connect/token/introspect)";

/// How the fake answers scope introspection.
#[allow(dead_code)]
pub enum ScopeReply {
    Granted(Vec<&'static str>),
    TokenRejected,
    Unreachable,
}

/// In-memory Strava with call counters.
pub struct FakeStrava {
    activities: Vec<ActivityRecord>,
    scopes: ScopeReply,
    upload_failure: (StravaFailure, String),
    upload_failures_left: AtomicUsize,
    pub get_calls: AtomicUsize,
    pub list_calls: AtomicUsize,
    pub scope_calls: AtomicUsize,
    pub upload_calls: AtomicUsize,
}

#[allow(dead_code)]
impl FakeStrava {
    /// Knows `activities` (newest first) and grants read + write.
    pub fn with_activities(activities: Vec<ActivityRecord>) -> Self {
        Self {
            activities,
            scopes: ScopeReply::Granted(vec!["read", "activity:read_all", "activity:write"]),
            upload_failure: (StravaFailure::Other, String::new()),
            upload_failures_left: AtomicUsize::new(0),
            get_calls: AtomicUsize::new(0),
            list_calls: AtomicUsize::new(0),
            scope_calls: AtomicUsize::new(0),
            upload_calls: AtomicUsize::new(0),
        }
    }

    pub fn scopes(mut self, scopes: ScopeReply) -> Self {
        self.scopes = scopes;
        self
    }

    /// The next `count` uploads fail with the given failure kind and message.
    #[allow(dead_code)]
    pub fn failing_uploads(self, count: usize, failure: StravaFailure, message: &str) -> Self {
        Self {
            upload_failure: (failure, message.to_string()),
            upload_failures_left: AtomicUsize::new(count),
            ..self
        }
    }

    pub fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn scope_calls(&self) -> usize {
        self.scope_calls.load(Ordering::SeqCst)
    }

    pub fn upload_calls(&self) -> usize {
        self.upload_calls.load(Ordering::SeqCst)
    }

    /// Calls of any kind.
    pub fn total_calls(&self) -> usize {
        self.get_calls() + self.list_calls() + self.scope_calls() + self.upload_calls()
    }
}

#[async_trait]
impl duck_memes::services::ActivityApi for FakeStrava {
    async fn get_activity(
        &self,
        _access_token: &str,
        activity_id: u64,
    ) -> Result<ActivityRecord, AppError> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        self.activities
            .iter()
            .find(|a| a.id == activity_id)
            .cloned()
            .ok_or_else(|| AppError::strava_status(404, "HTTP 404 Not Found: Record Not Found"))
    }

    async fn list_activities(
        &self,
        _access_token: &str,
        _page: u32,
        per_page: u32,
    ) -> Result<Vec<ActivityRecord>, AppError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .activities
            .iter()
            .take(per_page as usize)
            .cloned()
            .collect())
    }

    async fn granted_scopes(&self, _access_token: &str) -> Result<Vec<String>, AppError> {
        self.scope_calls.fetch_add(1, Ordering::SeqCst);
        match &self.scopes {
            ScopeReply::Granted(scopes) => Ok(scopes.iter().map(|s| s.to_string()).collect()),
            ScopeReply::TokenRejected => {
                Err(AppError::strava_status(401, AppError::STRAVA_TOKEN_ERROR))
            }
            ScopeReply::Unreachable => Err(AppError::strava_unreachable(INTROSPECTION_UNREACHABLE)),
        }
    }

    async fn upload_image(
        &self,
        _access_token: &str,
        activity_id: u64,
        file_name: &str,
        _image: Vec<u8>,
    ) -> Result<serde_json::Value, AppError> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);
        let failing = self
            .upload_failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if failing {
            let (failure, message) = &self.upload_failure;
            return Err(AppError::StravaApi {
                failure: *failure,
                message: message.clone(),
            });
        }
        Ok(serde_json::json!({
            "id": 987654,
            "activity_id": activity_id,
            "external_id": file_name,
            "status": "Your image is being processed."
        }))
    }
}

/// Scenario A telemetry: 12 km run, one hour, 150 m climbing.
#[allow(dead_code)]
pub fn sample_activity(id: u64) -> ActivityRecord {
    ActivityRecord {
        id,
        name: Some("Morning Run".to_string()),
        description: None,
        distance: Some(12000.0),
        moving_time: Some(3600.0),
        activity_type: Some("Run".to_string()),
        sport_type: Some("Run".to_string()),
        total_elevation_gain: Some(150.0),
        average_speed: Some(3.33),
        start_date: Some("2024-06-01T07:00:00Z".to_string()),
    }
}

// ─── Composition ─────────────────────────────────────────────

/// Font-free rasterizer: every character is a solid block of
/// `size / 2` by `size` pixels.
pub struct BlockRasterizer;

impl TextRasterizer for BlockRasterizer {
    fn measure(&self, text: &str, size: f32) -> (u32, u32) {
        let width = (size / 2.0) as u32 * text.chars().count() as u32;
        (width, size as u32)
    }

    fn draw(&self, canvas: &mut RgbaImage, text: &str, x: i32, y: i32, size: f32, color: Rgba<u8>) {
        let (w, h) = self.measure(text, size);
        for dy in 0..h as i32 {
            for dx in 0..w as i32 {
                let (px, py) = (x + dx, y + dy);
                if px >= 0 && py >= 0 && (px as u32) < canvas.width() && (py as u32) < canvas.height()
                {
                    canvas.put_pixel(px as u32, py as u32, color);
                }
            }
        }
    }
}

#[allow(dead_code)]
pub fn test_composer() -> ImageComposer {
    ImageComposer::new(
        Arc::new(BlockRasterizer),
        Arc::new(BlockRasterizer),
        Layout::default(),
    )
}

/// Write a solid-color 320x240 JPEG photo.
#[allow(dead_code)]
pub fn write_photo(root: &Path, relative: &str, shade: u8) {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    let photo = image::RgbImage::from_pixel(320, 240, image::Rgb([shade, 120, 255 - shade]));
    photo.save(&path).unwrap();
}

/// Asset directory holding `photos`, each a distinct color.
#[allow(dead_code)]
pub fn asset_dir(photos: &[&str]) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (i, photo) in photos.iter().enumerate() {
        write_photo(dir.path(), photo, (i as u8 + 1) * 40);
    }
    dir
}

// ─── Pipeline ────────────────────────────────────────────────

/// A pipeline wired to fakes, plus handles to inspect them.
#[allow(dead_code)]
pub struct Harness {
    pub pipeline: MemePipeline,
    pub llm: Arc<StubCompletion>,
    pub strava: Arc<FakeStrava>,
    pub composer: ImageComposer,
    pub cache: ArtifactCache,
    pub assets: tempfile::TempDir,
}

#[allow(dead_code)]
impl Harness {
    pub fn new(llm: StubCompletion, strava: FakeStrava) -> Self {
        Self::build(llm, strava, &ALL_PHOTOS, PipelineSettings::default())
    }

    pub fn build(
        llm: StubCompletion,
        strava: FakeStrava,
        photos: &[&str],
        settings: PipelineSettings,
    ) -> Self {
        let llm = Arc::new(llm);
        let strava = Arc::new(strava);
        let assets = asset_dir(photos);
        let composer = test_composer();

        let pipeline = MemePipeline::new(
            strava.clone(),
            llm.clone(),
            Arc::new(FsAssetStore::new(assets.path())),
            composer.clone(),
            settings,
        );

        Self {
            pipeline,
            llm,
            strava,
            composer,
            cache: ArtifactCache::new(),
            assets,
        }
    }

    /// The photo's bytes as stored in the asset directory.
    pub fn photo(&self, relative: &str) -> Vec<u8> {
        std::fs::read(self.assets.path().join(relative)).unwrap()
    }

    /// Router sharing this harness's pipeline and cache.
    pub fn app(&self, config: Config) -> (axum::Router, Arc<AppState>) {
        let state = Arc::new(AppState {
            config,
            pipeline: self.pipeline.clone(),
            memes: self.cache.clone(),
        });
        (create_router(state.clone()), state)
    }
}
