// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Duck photo selection and the asset store behind it.

use crate::models::MoodLabel;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Photo used when a mood's own photo is missing.
pub const DEFAULT_PHOTO: &str = "duck/duck76.jpeg";

/// Static mood → photo table, relative to the asset root.
pub fn photo_for(mood: MoodLabel) -> &'static str {
    match mood {
        MoodLabel::Tired => "duck/duck23.jpeg",
        MoodLabel::Excited => "duck/duck87.jpeg",
        MoodLabel::Proud => "duck/duck88.jpeg",
        MoodLabel::Energetic => "duck/duck89.jpeg",
        MoodLabel::Default => DEFAULT_PHOTO,
    }
}

/// Read access to the photo assets.
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Lightweight existence check.
    async fn exists(&self, path: &str) -> bool;

    /// Read the raw bytes of an asset.
    async fn read(&self, path: &str) -> Result<Vec<u8>, AssetError>;
}

/// Asset store errors.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("Failed to read asset {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("Asset path escapes the asset root: {0}")]
    InvalidPath(String),
}

/// Assets on the local filesystem under one root directory.
#[derive(Debug, Clone)]
pub struct FsAssetStore {
    root: PathBuf,
}

impl FsAssetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, AssetError> {
        let relative = Path::new(path);
        let escapes = relative.components().any(|c| {
            !matches!(c, std::path::Component::Normal(_) | std::path::Component::CurDir)
        });
        if escapes {
            return Err(AssetError::InvalidPath(path.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl AssetStore for FsAssetStore {
    async fn exists(&self, path: &str) -> bool {
        match self.resolve(path) {
            Ok(full) => tokio::fs::try_exists(&full).await.unwrap_or(false),
            Err(_) => false,
        }
    }

    async fn read(&self, path: &str) -> Result<Vec<u8>, AssetError> {
        let full = self.resolve(path)?;
        tokio::fs::read(&full).await.map_err(|e| AssetError::Io {
            path: path.to_string(),
            reason: e.to_string(),
        })
    }
}

/// A photo chosen for a mood.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoAsset {
    /// Mood the photo was requested for
    pub mood: MoodLabel,
    /// Asset path relative to the store root
    pub path: &'static str,
    /// Whether `path` passed the existence check
    pub verified: bool,
}

/// Picks the photo for a mood, demoting to the default photo when missing.
#[derive(Clone)]
pub struct PhotoSelector {
    assets: Arc<dyn AssetStore>,
}

impl PhotoSelector {
    pub fn new(assets: Arc<dyn AssetStore>) -> Self {
        Self { assets }
    }

    pub async fn select(&self, mood: MoodLabel) -> PhotoAsset {
        let path = photo_for(mood);
        if self.assets.exists(path).await {
            tracing::debug!(mood = %mood, path, "Selected photo");
            return PhotoAsset {
                mood,
                path,
                verified: true,
            };
        }

        tracing::warn!(
            mood = %mood,
            missing = path,
            fallback = DEFAULT_PHOTO,
            "Photo not found, using default"
        );
        let verified = path != DEFAULT_PHOTO && self.assets.exists(DEFAULT_PHOTO).await;
        PhotoAsset {
            mood,
            path: DEFAULT_PHOTO,
            verified,
        }
    }

    /// Load the bytes of a selected photo.
    pub async fn load(&self, photo: &PhotoAsset) -> Result<Vec<u8>, AssetError> {
        self.assets.read(photo.path).await
    }
}
