// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Text completion capability (OpenAI-compatible chat completions).
//!
//! Both the mood classifier and the caption generator go through the one
//! [`TextCompletion`] trait; they differ only in prompts and
//! [`CompletionPreset`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Sampling parameters for one kind of call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionPreset {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl CompletionPreset {
    /// Near-deterministic, one-word answers.
    pub const MOOD: CompletionPreset = CompletionPreset {
        temperature: 0.2,
        max_tokens: 10,
    };

    /// Playful captions; `max_tokens` comes from configuration.
    pub fn caption(max_tokens: u32) -> Self {
        Self {
            temperature: 0.8,
            max_tokens,
        }
    }
}

/// Role-tagged chat message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system",
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user",
            content: content.into(),
        }
    }
}

/// One completion request: instruction + prompt + preset.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    pub preset: CompletionPreset,
}

impl CompletionRequest {
    pub fn new(system: impl Into<String>, user: impl Into<String>, preset: CompletionPreset) -> Self {
        Self {
            messages: vec![ChatMessage::system(system), ChatMessage::user(user)],
            preset,
        }
    }

    /// Content of the system message, if any.
    pub fn system(&self) -> Option<&str> {
        self.messages
            .iter()
            .find(|m| m.role == "system")
            .map(|m| m.content.as_str())
    }
}

/// Text completion errors
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("http error: {0}")]
    Http(String),
    #[error("response error: {0}")]
    Response(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

/// Single-shot text completion.
#[async_trait]
pub trait TextCompletion: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<String, LlmError>;
}

/// Run a completion under a hard deadline, whatever the client's own timeout.
pub async fn complete_within(
    client: &dyn TextCompletion,
    request: CompletionRequest,
    timeout: Duration,
) -> Result<String, LlmError> {
    match tokio::time::timeout(timeout, client.complete(request)).await {
        Ok(result) => result,
        Err(_) => Err(LlmError::Timeout(timeout)),
    }
}

/// HTTP client config (OpenAI-compatible)
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub endpoint: String,
    pub api_key: String,
    pub model: String,
    pub timeout_secs: u64,
}

/// HTTP completion client using an OpenAI-compatible API.
pub struct OpenAiClient {
    http: reqwest::Client,
    config: OpenAiConfig,
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LlmError::Http(e.to_string()))?;
        Ok(Self { http, config })
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl TextCompletion for OpenAiClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String, LlmError> {
        let body = ChatRequest {
            model: &self.config.model,
            messages: &request.messages,
            temperature: request.preset.temperature,
            max_tokens: request.preset.max_tokens,
        };

        let response = self
            .http
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout(Duration::from_secs(self.config.timeout_secs))
                } else {
                    LlmError::Http(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(LlmError::Response(format!("HTTP {}: {}", status, text)));
        }

        let text = response
            .text()
            .await
            .map_err(|e| LlmError::Http(e.to_string()))?;
        parse_completion(&text)
    }
}

/// Extract the first choice's text from a chat completion body.
fn parse_completion(body: &str) -> Result<String, LlmError> {
    let parsed: ChatResponse =
        serde_json::from_str(body).map_err(|e| LlmError::Serialization(e.to_string()))?;

    parsed
        .choices
        .into_iter()
        .next()
        .map(|c| c.message.content.unwrap_or_default())
        .ok_or_else(|| LlmError::Response("Missing choices".to_string()))
}
