//! LLM provider trait, request types and a scripted mock.

use std::sync::Mutex;

use async_trait::async_trait;
use thiserror::Error;

/// Errors from LLM provider calls.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Provider '{0}' unavailable")]
    Unavailable(String),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Response parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        LlmError::Transport(e.to_string())
    }
}

pub type LlmResult<T> = Result<T, LlmError>;

/// An image sent alongside the prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct InlineImage {
    /// MIME type (e.g. `image/jpeg`)
    pub mime_type: String,
    /// Raw image bytes
    pub data: Vec<u8>,
}

/// A single generation request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LlmRequest {
    pub prompt: String,
    pub image: Option<InlineImage>,
}

impl LlmRequest {
    /// Text-only request.
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            image: None,
        }
    }

    /// Text plus image request.
    pub fn with_image(prompt: impl Into<String>, image: InlineImage) -> Self {
        Self {
            prompt: prompt.into(),
            image: Some(image),
        }
    }
}

/// A generative model backend.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate a completion for the request.
    async fn generate(&self, request: &LlmRequest) -> LlmResult<String>;
    /// Human-readable provider name (e.g. "gemini").
    fn name(&self) -> &str;
}

/// Mock provider for testing. Returns a configurable response and records
/// every request it receives.
pub struct MockProvider {
    response: Result<String, String>,
    requests: Mutex<Vec<LlmRequest>>,
}

impl MockProvider {
    /// Always answer with `response`.
    pub fn new(response: &str) -> Self {
        Self {
            response: Ok(response.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Always fail with an unavailable error carrying `reason`.
    pub fn failing(reason: &str) -> Self {
        Self {
            response: Err(reason.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Requests seen so far.
    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    async fn generate(&self, request: &LlmRequest) -> LlmResult<String> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        self.response.clone().map_err(LlmError::Unavailable)
    }

    fn name(&self) -> &str {
        "mock"
    }
}
