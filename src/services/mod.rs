// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod cache;
pub mod caption;
pub mod composer;
pub mod credentials;
pub mod llm;
pub mod mood;
pub mod motivation;
pub mod normalizer;
pub mod photo;
pub mod pipeline;
pub mod strava;
pub mod upload;

pub use cache::ArtifactCache;
pub use caption::CaptionGenerator;
pub use composer::{FontRasterizer, ImageComposer, Layout, TextRasterizer};
pub use credentials::{Credential, CredentialProvider, StaticCredential};
pub use llm::{OpenAiClient, OpenAiConfig, TextCompletion};
pub use mood::MoodClassifier;
pub use photo::{AssetStore, FsAssetStore, PhotoSelector};
pub use pipeline::{ActivityRef, MemeOptions, MemePipeline, MemeRun, PipelineSettings};
pub use strava::{ActivityApi, StravaClient};
pub use upload::UploadAdapter;
