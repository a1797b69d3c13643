// src/llm/mod.rs

//! Seam for the non-deterministic reasoning collaborator.
//!
//! The model is a capability injected into the resolver and synthesizer,
//! not a component of the core: everything downstream treats its output as
//! untrusted text and validates accordingly.

pub mod gemini;

pub use gemini::GeminiClient;

use async_trait::async_trait;

use crate::error::LlmError;

#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Sends a single prompt and returns the model's raw text reply.
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;
}

/// Strips markdown code fences the model tends to wrap JSON replies in.
pub fn strip_code_fences(text: &str) -> &str {
    let mut trimmed = text.trim();
    if let Some(rest) = trimmed.strip_prefix("```json") {
        trimmed = rest;
    } else if let Some(rest) = trimmed.strip_prefix("```") {
        trimmed = rest;
    }
    if let Some(rest) = trimmed.strip_suffix("```") {
        trimmed = rest;
    }
    trimmed.trim()
}
