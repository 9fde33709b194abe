// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Duck Memes API Server
//!
//! Turns Strava workouts into captioned duck photos and optionally posts
//! them back to the activity.

use duck_memes::{
    config::Config,
    services::{
        ArtifactCache, FontRasterizer, FsAssetStore, ImageComposer, Layout, MemePipeline,
        OpenAiClient, OpenAiConfig, PipelineSettings, StravaClient,
    },
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Duck Memes API");

    // Text generation
    let llm = Arc::new(
        OpenAiClient::new(OpenAiConfig {
            endpoint: config.openai_api_url.clone(),
            api_key: config.openai_api_key.clone(),
            model: config.openai_model.clone(),
            timeout_secs: config.llm_timeout_secs,
        })
        .expect("Failed to initialize completion client"),
    );
    tracing::info!(model = %config.openai_model, "Completion client initialized");

    // Strava
    let strava = Arc::new(
        StravaClient::new(
            config.strava_api_url.clone(),
            config.token_introspection_url.clone(),
            config.strava_timeout_secs,
        )
        .expect("Failed to initialize Strava client"),
    );

    // Fonts and photos
    tracing::info!(
        font = %config.font_path.display(),
        caption_font = %config.caption_font_path.display(),
        "Loading fonts"
    );
    let text = Arc::new(FontRasterizer::from_file(&config.font_path).expect("Failed to load font"));
    let caption_text = Arc::new(
        FontRasterizer::from_file(&config.caption_font_path).expect("Failed to load caption font"),
    );
    let composer = ImageComposer::new(
        text,
        caption_text,
        Layout {
            jpeg_quality: config.jpeg_quality,
            ..Layout::default()
        },
    );
    let assets = Arc::new(FsAssetStore::new(config.asset_dir.clone()));
    tracing::info!(asset_dir = %config.asset_dir.display(), "Photo assets configured");

    let pipeline = MemePipeline::new(
        strava,
        llm,
        assets,
        composer,
        PipelineSettings::from_config(&config),
    );

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        pipeline,
        memes: ArtifactCache::with_capacity_limit(config.meme_cache_capacity),
    });

    // Build router
    let app = duck_memes::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("duck_memes=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
