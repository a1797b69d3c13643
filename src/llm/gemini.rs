// src/llm/gemini.rs

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use super::LanguageModel;
use crate::error::LlmError;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Google Gemini REST client. Temperature is pinned to zero so tool
/// selection stays as deterministic as the model allows.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiClient {
    pub fn new(http: reqwest::Client, api_key: String) -> Self {
        Self {
            http,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }
}

#[async_trait]
impl LanguageModel for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );
        let payload = json!({
            "contents": [{"parts": [{"text": prompt}]}],
            "generationConfig": {"temperature": 0.0}
        });

        let response = self
            .http
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| LlmError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Request(format!(
                "Gemini returned HTTP {}: {}",
                status.as_u16(),
                body
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| LlmError::Request(e.to_string()))?;

        let text = body["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .map(str::to_string)
            .ok_or(LlmError::EmptyResponse)?;

        debug!(chars = text.len(), "gemini reply received");
        Ok(text)
    }
}
