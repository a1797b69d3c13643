// src/data_sources/search.rs

use reqwest::Client;
use serde_json::{json, Value};
use tracing::warn;

const DEFAULT_BASE_URL: &str = "https://api.tavily.com";
const MAX_RESULTS: u32 = 3;

/// Web-search client (Tavily). Search is the degradation target of the
/// whole pipeline, so it never fails: a missing credential or a transport
/// error produces a placeholder payload instead of an error envelope.
#[derive(Clone)]
pub struct SearchClient {
    http: Client,
    api_key: Option<String>,
    base_url: String,
}

impl SearchClient {
    pub fn new(http: Client, api_key: Option<String>) -> Self {
        Self {
            http,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    pub async fn search(&self, search_query: &str) -> Value {
        let Some(api_key) = &self.api_key else {
            return placeholder(search_query, "search client is not configured");
        };

        let payload = json!({
            "api_key": api_key,
            "query": search_query,
            "search_depth": "advanced",
            "max_results": MAX_RESULTS,
            "include_answer": true,
        });

        let response = self
            .http
            .post(format!("{}/search", self.base_url))
            .json(&payload)
            .send()
            .await;

        let body: Value = match response {
            Ok(resp) if resp.status().is_success() => match resp.json().await {
                Ok(body) => body,
                Err(e) => {
                    warn!("search response decode failed: {e}");
                    return placeholder(search_query, &format!("search failed: {e}"));
                }
            },
            Ok(resp) => {
                warn!("search returned HTTP {}", resp.status());
                return placeholder(
                    search_query,
                    &format!("search returned HTTP {}", resp.status().as_u16()),
                );
            }
            Err(e) => {
                warn!("search request failed: {e}");
                return placeholder(search_query, &format!("search failed: {e}"));
            }
        };

        json!({
            "search_provider": "Tavily",
            "query_used": search_query,
            "answer_summary": body.get("answer").cloned().unwrap_or(Value::Null),
            "results": body.get("results").cloned().unwrap_or_else(|| json!([])),
        })
    }
}

fn placeholder(search_query: &str, note: &str) -> Value {
    json!({
        "search_provider": "Placeholder",
        "query_used": search_query,
        "results": [{
            "title": "Placeholder Search Result",
            "url": "",
            "content": note,
        }],
    })
}
