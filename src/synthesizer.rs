// src/synthesizer.rs

//! Final answer synthesis. Every query ends here, success or failure, and
//! always yields a textual answer: if the language model is unreachable the
//! fallbacks are deterministic strings built from the envelope.

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::error;

use crate::envelope::ResultEnvelope;
use crate::llm::LanguageModel;
use crate::prompts;
use crate::resolver::ResolvedAction;

const ERROR_FALLBACK: &str =
    "An error occurred with the data provider. Please check your parameters and try again.";

#[derive(Clone)]
pub struct Synthesizer {
    llm: Arc<dyn LanguageModel>,
}

impl Synthesizer {
    pub fn new(llm: Arc<dyn LanguageModel>) -> Self {
        Self { llm }
    }

    pub async fn synthesize(
        &self,
        query: &str,
        network: &str,
        action: &ResolvedAction,
        envelope: &ResultEnvelope,
    ) -> String {
        if envelope.is_success() {
            self.answer_from_data(query, network, action, envelope).await
        } else {
            self.explain_error(query, action, envelope).await
        }
    }

    async fn answer_from_data(
        &self,
        query: &str,
        network: &str,
        action: &ResolvedAction,
        envelope: &ResultEnvelope,
    ) -> String {
        let data = envelope.raw_data.clone().unwrap_or(Value::Null);
        let source = match action {
            ResolvedAction::ToolCall { tool_name, .. } => tool_name.as_str(),
            ResolvedAction::WebSearch { .. } => "internet_search",
            ResolvedAction::NoAction { .. } => "none",
        };
        let prompt = prompts::final_answer_prompt(query, network, source, &data);
        match self.llm.generate(&prompt).await {
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                error!("answer synthesis failed: {e}");
                let mut summary = serde_json::to_string(&data).unwrap_or_default();
                if summary.len() > 2_000 {
                    summary.truncate(2_000);
                    summary.push_str("...");
                }
                format!("Could not generate a natural language summary. Raw data: {summary}")
            }
        }
    }

    async fn explain_error(
        &self,
        query: &str,
        action: &ResolvedAction,
        envelope: &ResultEnvelope,
    ) -> String {
        let message = envelope
            .error_detail
            .as_ref()
            .map(|detail| detail.message.clone())
            .unwrap_or_else(|| "unknown error".to_string());
        let (tool_name, parameters) = match action {
            ResolvedAction::ToolCall {
                tool_name,
                parameters,
            } => (tool_name.clone(), Value::Object(parameters.clone())),
            ResolvedAction::WebSearch { search_query } => {
                ("internet_search".to_string(), json!({"search_query": search_query}))
            }
            ResolvedAction::NoAction { .. } => ("none".to_string(), json!({})),
        };
        let prompt = prompts::error_explanation_prompt(query, &tool_name, &parameters, &message);
        match self.llm.generate(&prompt).await {
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                error!("error explanation synthesis failed: {e}");
                ERROR_FALLBACK.to_string()
            }
        }
    }
}
