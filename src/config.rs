// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Loaded once at startup. The auto-upload policy lives here as a default
//! that each request may override; nothing in the pipeline reads process
//! state directly.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Text generation ---
    /// API key for the OpenAI-compatible completion endpoint
    pub openai_api_key: String,
    /// Chat completions endpoint URL
    pub openai_api_url: String,
    /// Model name sent with every completion request
    pub openai_model: String,
    /// Timeout applied to each completion call
    pub llm_timeout_secs: u64,
    /// Output token cap for captions
    pub caption_max_tokens: u32,
    /// Character budget for captions after trimming
    pub caption_max_chars: usize,

    // --- Strava ---
    /// Strava API base URL
    pub strava_api_url: String,
    /// Token introspection endpoint of the auth service (RFC 7662 shape)
    pub token_introspection_url: String,
    /// Timeout applied to each Strava call
    pub strava_timeout_secs: u64,

    // --- Composition ---
    /// Root directory holding the duck photos
    pub asset_dir: PathBuf,
    /// Font used for the stat block and attribution
    pub font_path: PathBuf,
    /// Font used for the caption (bold)
    pub caption_font_path: PathBuf,
    /// JPEG quality factor (1-100)
    pub jpeg_quality: u8,

    // --- Policy ---
    /// Default for publishing memes back to the activity
    pub auto_upload: bool,
    /// Retry a failed upload call once when the failure is transient
    pub upload_retry_once: bool,
    /// Most memes kept in memory before the oldest-started run's is dropped
    pub meme_cache_capacity: usize,

    // --- Server ---
    /// Frontend URL for CORS
    pub frontend_url: String,
    /// Server port
    pub port: u16,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            openai_api_key: "test_openai_key".to_string(),
            openai_api_url: "http://localhost:9999/v1/chat/completions".to_string(),
            openai_model: "gpt-3.5-turbo".to_string(),
            llm_timeout_secs: 5,
            caption_max_tokens: 60,
            caption_max_chars: 280,
            strava_api_url: "http://localhost:9998/api/v3".to_string(),
            token_introspection_url: "http://localhost:9997/oauth/introspect".to_string(),
            strava_timeout_secs: 5,
            asset_dir: PathBuf::from("assets"),
            font_path: PathBuf::from("assets/fonts/DejaVuSans.ttf"),
            caption_font_path: PathBuf::from("assets/fonts/DejaVuSans-Bold.ttf"),
            jpeg_quality: 92,
            auto_upload: false,
            upload_retry_once: false,
            meme_cache_capacity: 500,
            frontend_url: "http://localhost:5173".to_string(),
            port: 8080,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is honored for local development.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let font_path =
            PathBuf::from(env_or("FONT_PATH", "assets/fonts/DejaVuSans.ttf"));
        let caption_font_path = env::var("CAPTION_FONT_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| font_path.clone());

        let jpeg_quality: u8 = parse_env("JPEG_QUALITY", 92)?;
        if !(1..=100).contains(&jpeg_quality) {
            return Err(ConfigError::Invalid("JPEG_QUALITY", jpeg_quality.to_string()));
        }

        Ok(Self {
            openai_api_key: env::var("OPENAI_API_KEY")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("OPENAI_API_KEY"))?,
            openai_api_url: env_or(
                "OPENAI_API_URL",
                "https://api.openai.com/v1/chat/completions",
            ),
            openai_model: env_or("OPENAI_MODEL", "gpt-3.5-turbo"),
            llm_timeout_secs: parse_env("LLM_TIMEOUT_SECS", 20)?,
            caption_max_tokens: parse_env("CAPTION_MAX_TOKENS", 60)?,
            caption_max_chars: parse_env("CAPTION_MAX_CHARS", 280)?,

            strava_api_url: env_or("STRAVA_API_URL", "https://www.strava.com/api/v3"),
            token_introspection_url: env::var("TOKEN_INTROSPECTION_URL")
                .map_err(|_| ConfigError::Missing("TOKEN_INTROSPECTION_URL"))?,
            strava_timeout_secs: parse_env("STRAVA_TIMEOUT_SECS", 15)?,

            asset_dir: PathBuf::from(env_or("ASSET_DIR", "assets")),
            font_path,
            caption_font_path,
            jpeg_quality,

            auto_upload: parse_env("AUTO_UPLOAD", false)?,
            upload_retry_once: parse_env("UPLOAD_RETRY_ONCE", false)?,
            meme_cache_capacity: parse_env("MEME_CACHE_CAPACITY", 500)?,

            frontend_url: env_or("FRONTEND_URL", "http://localhost:5173"),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
        })
    }
}

fn env_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

/// Parse an optional variable, rejecting values that are set but malformed.
fn parse_env<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(name, raw)),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),
}
