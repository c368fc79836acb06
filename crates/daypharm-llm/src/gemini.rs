//! Google Gemini API provider.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use serde_json::{json, Value};

use crate::provider::{LlmError, LlmProvider, LlmRequest, LlmResult};

/// Public Gemini endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Models tried in order; later ones are used when earlier ones are missing.
pub const DEFAULT_MODELS: &[&str] = &["gemini-2.5-pro", "gemini-1.5-flash"];

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

pub struct GeminiProvider {
    api_key: String,
    models: Vec<String>,
    base_url: String,
    client: reqwest::Client,
}

impl GeminiProvider {
    /// Create a provider for the given key and model preference list.
    pub fn new(
        api_key: &str,
        models: Vec<String>,
        base_url: &str,
        timeout: Duration,
    ) -> LlmResult<Self> {
        if models.is_empty() {
            return Err(LlmError::Unavailable("gemini: no model configured".into()));
        }
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            api_key: api_key.to_string(),
            models,
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Provider against the public endpoint with default models.
    pub fn with_key(api_key: &str) -> LlmResult<Self> {
        Self::new(
            api_key,
            DEFAULT_MODELS.iter().map(|m| m.to_string()).collect(),
            DEFAULT_BASE_URL,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }

    /// Models in preference order.
    pub fn models(&self) -> &[String] {
        &self.models
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, model)
    }

    /// Build the `generateContent` body.
    pub fn build_body(request: &LlmRequest) -> Value {
        let mut parts = vec![json!({ "text": request.prompt })];
        if let Some(image) = &request.image {
            parts.push(json!({
                "inline_data": {
                    "mime_type": image.mime_type,
                    "data": base64::engine::general_purpose::STANDARD.encode(&image.data),
                }
            }));
        }
        json!({ "contents": [{ "parts": parts }] })
    }

    /// Pull the first candidate's text out of a response.
    pub fn parse_response(json: &Value) -> LlmResult<String> {
        json.pointer("/candidates/0/content/parts/0/text")
            .and_then(|v| v.as_str())
            .map(|s| s.trim().to_string())
            .ok_or_else(|| {
                let reason = json
                    .pointer("/promptFeedback/blockReason")
                    .and_then(|v| v.as_str())
                    .unwrap_or("missing candidates[0].content.parts[0].text");
                LlmError::Parse(reason.to_string())
            })
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    async fn generate(&self, request: &LlmRequest) -> LlmResult<String> {
        let body = Self::build_body(request);

        for model in &self.models {
            let response = self
                .client
                .post(self.endpoint(model))
                .header("x-goog-api-key", &self.api_key)
                .json(&body)
                .send()
                .await
                .map_err(|e| {
                    if e.is_timeout() {
                        LlmError::Transport(format!("gemini: request timed out ({})", model))
                    } else {
                        LlmError::Unavailable(format!("gemini: {}", e))
                    }
                })?;

            let status = response.status();
            if status == reqwest::StatusCode::NOT_FOUND {
                tracing::warn!(model = %model, "Gemini model not available, trying next");
                continue;
            }
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(LlmError::Http {
                    status: status.as_u16(),
                    body,
                });
            }

            let json: Value = response.json().await?;
            tracing::debug!(model = %model, "Gemini generation complete");
            return Self::parse_response(&json);
        }

        Err(LlmError::Unavailable(format!(
            "gemini: none of the models {:?} is available",
            self.models
        )))
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::InlineImage;

    #[test]
    fn test_gemini_provider_new() {
        let p = GeminiProvider::with_key("key-123").unwrap();
        assert_eq!(p.name(), "gemini");
        assert_eq!(p.models(), &["gemini-2.5-pro", "gemini-1.5-flash"]);
        assert_eq!(
            p.endpoint("gemini-2.5-pro"),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-pro:generateContent"
        );
    }

    #[test]
    fn test_gemini_requires_a_model() {
        let result = GeminiProvider::new("k", vec![], DEFAULT_BASE_URL, Duration::from_secs(1));
        assert!(matches!(result, Err(LlmError::Unavailable(_))));
    }

    #[test]
    fn test_gemini_trims_trailing_slash() {
        let p = GeminiProvider::new(
            "k",
            vec!["m".into()],
            "http://localhost:8080/",
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(p.endpoint("m"), "http://localhost:8080/v1beta/models/m:generateContent");
    }

    #[test]
    fn test_build_body_with_image() {
        let request = LlmRequest::with_image(
            "read this",
            InlineImage {
                mime_type: "image/jpeg".into(),
                data: b"abc".to_vec(),
            },
        );
        let body = GeminiProvider::build_body(&request);

        assert_eq!(body.pointer("/contents/0/parts/0/text").unwrap(), "read this");
        assert_eq!(
            body.pointer("/contents/0/parts/1/inline_data/mime_type").unwrap(),
            "image/jpeg"
        );
        assert_eq!(body.pointer("/contents/0/parts/1/inline_data/data").unwrap(), "YWJj");
    }

    #[test]
    fn test_build_body_text_only() {
        let body = GeminiProvider::build_body(&LlmRequest::text("hi"));
        assert_eq!(body["contents"][0]["parts"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_parse_response() {
        let raw = json!({
            "candidates": [{
                "content": {"parts": [{"text": "  복용 안내  "}]}
            }]
        });
        assert_eq!(GeminiProvider::parse_response(&raw).unwrap(), "복용 안내");
    }

    #[test]
    fn test_parse_blocked_response() {
        let raw = json!({ "promptFeedback": { "blockReason": "SAFETY" } });
        let err = GeminiProvider::parse_response(&raw).unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
    }
}
