// src/dispatch.rs

//! Executes a resolved action against the right backend client and
//! normalizes the outcome into a `ResultEnvelope`.
//!
//! Which client serves a tool call is decided by the tool's catalog
//! namespace, never re-derived from the router. Backend failures are not
//! retried: they are almost always parameter rejections that would
//! reproduce identically, and retry-after-mutation is future work.

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{error, info};

use crate::catalog::{Backend, ToolCatalog, ToolDefinition};
use crate::data_sources::{SearchClient, StorageQuery, StorageRpc, SubscanClient};
use crate::envelope::{DebugTrace, ResultEnvelope};
use crate::error::BackendError;
use crate::networks::Networks;
use crate::resolver::ResolvedAction;

pub const NOT_SUPPORTED_MESSAGE: &str = "This query is not supported";

#[derive(Clone)]
pub struct Dispatcher {
    catalog: Arc<ToolCatalog>,
    networks: Networks,
    subscan: SubscanClient,
    assethub: Arc<dyn StorageRpc>,
    search: SearchClient,
}

impl Dispatcher {
    pub fn new(
        catalog: Arc<ToolCatalog>,
        networks: Networks,
        subscan: SubscanClient,
        assethub: Arc<dyn StorageRpc>,
        search: SearchClient,
    ) -> Self {
        Self {
            catalog,
            networks,
            subscan,
            assethub,
            search,
        }
    }

    pub async fn execute(
        &self,
        action: &ResolvedAction,
        network: &str,
        mut trace: DebugTrace,
    ) -> ResultEnvelope {
        match action {
            ResolvedAction::ToolCall {
                tool_name,
                parameters,
            } => {
                let Some(tool) = self.catalog.lookup(tool_name) else {
                    trace.record("dispatch.error", json!({"missing_tool": tool_name}));
                    return ResultEnvelope::error(
                        None,
                        format!("tool '{tool_name}' is not in the catalog"),
                        trace,
                    );
                };
                trace.record(
                    "dispatch.tool_call",
                    json!({
                        "tool": tool_name,
                        "backend": tool.backend,
                        "parameters": parameters,
                    }),
                );
                match tool.backend {
                    Backend::Subscan => self.call_subscan(tool, parameters, network, trace).await,
                    Backend::AssetHub => self.call_assethub(tool, parameters, trace).await,
                }
            }
            ResolvedAction::WebSearch { search_query } => {
                trace.record("dispatch.web_search", json!({"query": search_query}));
                let results = self.search.search(search_query).await;
                ResultEnvelope::success(results, trace)
            }
            ResolvedAction::NoAction { reason } => {
                trace.record("dispatch.no_action", json!({"reason": reason}));
                ResultEnvelope::error(
                    None,
                    format!("{NOT_SUPPORTED_MESSAGE}: {reason}"),
                    trace,
                )
            }
        }
    }

    async fn call_subscan(
        &self,
        tool: &ToolDefinition,
        parameters: &serde_json::Map<String, Value>,
        network: &str,
        mut trace: DebugTrace,
    ) -> ResultEnvelope {
        let Some(config) = self.networks.get(network) else {
            return ResultEnvelope::error(
                None,
                format!("network '{network}' is not supported"),
                trace,
            );
        };
        // Validated at catalog load for every subscan tool.
        let (Some(path), Some(method)) = (tool.api_path.as_deref(), tool.api_method) else {
            return ResultEnvelope::error(
                None,
                format!("tool '{}' has no endpoint definition", tool.name),
                trace,
            );
        };

        match self
            .subscan
            .call(&config.base_url, path, method, parameters)
            .await
        {
            Ok(data) => {
                info!(tool = %tool.name, %network, "subscan call succeeded");
                trace.record("dispatch.result", json!({"backend": "subscan", "status": "success"}));
                ResultEnvelope::success(data, trace)
            }
            Err(err) => backend_error_envelope("subscan", &tool.name, err, trace),
        }
    }

    async fn call_assethub(
        &self,
        tool: &ToolDefinition,
        parameters: &serde_json::Map<String, Value>,
        mut trace: DebugTrace,
    ) -> ResultEnvelope {
        // The generator emits key1, key2, ... in declaration order.
        let key_names = storage_key_order(&tool.parameters.required);
        let keys: Vec<Value> = key_names
            .iter()
            .filter_map(|name| parameters.get(name).cloned())
            .collect();

        let query = StorageQuery {
            pallet: tool.pallet_name.clone().unwrap_or_default(),
            storage_item: tool.storage_item_name.clone().unwrap_or_default(),
            keys,
            key_hashers: tool.key_hashers.clone().unwrap_or_default(),
            key_types: tool.key_types.clone().unwrap_or_default(),
            value_type: tool.value_type.clone(),
        };

        match self.assethub.query_storage(&query).await {
            Ok(data) => {
                info!(tool = %tool.name, "assethub query succeeded");
                trace.record("dispatch.result", json!({"backend": "assethub", "status": "success"}));
                ResultEnvelope::success(data, trace)
            }
            Err(err) => backend_error_envelope("assethub", &tool.name, err, trace),
        }
    }
}

/// Recovers key declaration order from `keyN` names. Numeric suffixes are
/// compared as numbers so `key10` stays after `key2`.
fn storage_key_order(required: &[String]) -> Vec<String> {
    let index = |name: &str| -> u32 {
        name.strip_prefix("key")
            .and_then(|suffix| suffix.parse().ok())
            .unwrap_or(u32::MAX)
    };
    let mut names = required.to_vec();
    names.sort_by(|a, b| index(a).cmp(&index(b)).then_with(|| a.cmp(b)));
    names
}

fn backend_error_envelope(
    backend: &str,
    tool: &str,
    err: BackendError,
    mut trace: DebugTrace,
) -> ResultEnvelope {
    error!(%backend, %tool, "backend call failed: {err}");
    trace.record(
        "dispatch.result",
        json!({"backend": backend, "status": "error", "message": err.to_string()}),
    );
    ResultEnvelope::error(err.status_code(), err.to_string(), trace)
}
