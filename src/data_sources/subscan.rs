// src/data_sources/subscan.rs

use reqwest::Client;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::catalog::HttpMethod;
use crate::error::BackendError;

const BACKEND: &str = "subscan";

/// Client for the Subscan indexer HTTP API. Network scoping happens through
/// the per-network base URL the caller passes in; the client itself is
/// stateless beyond the shared connection pool and API key.
#[derive(Clone)]
pub struct SubscanClient {
    http: Client,
    api_key: Option<String>,
}

impl SubscanClient {
    pub fn new(http: Client, api_key: Option<String>) -> Self {
        if api_key.is_none() {
            warn!("SUBSCAN_API_KEY not set; Subscan calls may be rate limited or fail");
        }
        Self { http, api_key }
    }

    /// Issues one API call. POST tools send parameters as a JSON body, GET
    /// tools as query-string pairs. Non-2xx statuses and Subscan-level
    /// error codes both surface as `BackendError` with the upstream message
    /// kept verbatim; nothing is retried.
    pub async fn call(
        &self,
        base_url: &str,
        path: &str,
        method: HttpMethod,
        params: &Map<String, Value>,
    ) -> Result<Value, BackendError> {
        let url = format!("{}{}", base_url.trim_end_matches('/'), path);
        debug!(%url, ?method, "calling subscan");

        let mut request = match method {
            HttpMethod::Post => self.http.post(&url).json(params),
            HttpMethod::Get => {
                let pairs: Vec<(String, String)> = params
                    .iter()
                    .map(|(k, v)| (k.clone(), query_value(v)))
                    .collect();
                self.http.get(&url).query(&pairs)
            }
        };
        if let Some(key) = &self.api_key {
            request = request.header("X-API-Key", key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| BackendError::transport(BACKEND, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| BackendError::transport(BACKEND, e))?;

        if !status.is_success() {
            let message = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
                .unwrap_or(body);
            return Err(BackendError::Status {
                backend: BACKEND,
                status: status.as_u16(),
                message,
            });
        }

        let data: Value = serde_json::from_str(&body).map_err(|e| BackendError::Decode {
            backend: BACKEND,
            message: e.to_string(),
        })?;

        // Subscan wraps everything in {code, message, data}; a non-zero code
        // is an application-level rejection even on HTTP 200.
        let code = data.get("code").and_then(Value::as_i64).unwrap_or(0);
        if code != 0 {
            let message = data
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("Unknown Subscan API error")
                .to_string();
            return Err(BackendError::Api {
                backend: BACKEND,
                code,
                message,
            });
        }

        Ok(data)
    }
}

fn query_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
