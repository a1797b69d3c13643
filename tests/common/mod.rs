//! Shared fixtures for the integration tests: a scripted language model,
//! an in-memory storage RPC, and an `AppState` wired against the mockito
//! server for Subscan traffic.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use polkaquery::catalog::{Backend, ToolCatalog, ToolDefinition};
use polkaquery::config::Config;
use polkaquery::data_sources::{SearchClient, StorageQuery, StorageRpc, SubscanClient};
use polkaquery::error::{BackendError, LlmError};
use polkaquery::llm::LanguageModel;
use polkaquery::networks::{NetworkConfig, Networks};
use polkaquery::AppState;

/// Language model that replays a fixed script of replies. Once the script
/// is exhausted every further call fails, which doubles as a guard that the
/// pipeline does not talk to the model more often than a test expects.
pub struct ScriptedModel {
    replies: Mutex<VecDeque<String>>,
    calls: AtomicUsize,
}

impl ScriptedModel {
    pub fn new(replies: Vec<&str>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().map(str::to_string).collect()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn generate(&self, _prompt: &str) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or(LlmError::EmptyResponse)
    }
}

/// Storage RPC stand-in that returns a canned value and counts calls.
pub struct StaticStorage {
    value: Value,
    calls: AtomicUsize,
}

impl StaticStorage {
    pub fn returning(value: Value) -> Self {
        Self {
            value,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for StaticStorage {
    fn default() -> Self {
        Self::returning(Value::Null)
    }
}

#[async_trait]
impl StorageRpc for StaticStorage {
    async fn query_storage(&self, query: &StorageQuery) -> Result<Value, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(json!({
            "pallet": query.pallet,
            "storage_item": query.storage_item,
            "key": "0x00",
            "value": self.value,
        }))
    }
}

fn subscan_def(value: Value) -> ToolDefinition {
    let mut def: ToolDefinition = serde_json::from_value(value).unwrap();
    def.backend = Backend::Subscan;
    def
}

fn assethub_def(value: Value) -> ToolDefinition {
    let mut def: ToolDefinition = serde_json::from_value(value).unwrap();
    def.backend = Backend::AssetHub;
    def
}

/// A catalog mirroring the shipped definitions, small enough to reason
/// about in assertions.
pub fn test_definitions() -> Vec<ToolDefinition> {
    vec![
        subscan_def(json!({
            "name": "account_balance",
            "description": "Fetch the current balance of an account.",
            "api_path": "/api/v2/scan/accounts",
            "api_method": "POST",
            "parameters": {
                "type": "object",
                "properties": {"address": {"type": "string"}},
                "required": ["address"]
            }
        })),
        subscan_def(json!({
            "name": "extrinsic_detail",
            "description": "Fetch the details of an extrinsic by hash.",
            "api_path": "/api/scan/extrinsic",
            "api_method": "POST",
            "parameters": {
                "type": "object",
                "properties": {"hash": {"type": "string"}},
                "required": ["hash"]
            }
        })),
        subscan_def(json!({
            "name": "blocks_list",
            "description": "List recent finalized blocks.",
            "api_path": "/api/scan/blocks",
            "api_method": "POST",
            "parameters": {
                "type": "object",
                "properties": {
                    "page": {"type": "integer", "minimum": 0, "default": 0},
                    "row": {"type": "integer", "minimum": 1, "maximum": 100, "default": 1}
                },
                "required": []
            }
        })),
        subscan_def(json!({
            "name": "account_balance_history",
            "description": "Fetch the historical balance of an account.",
            "api_path": "/api/scan/account/balance_history",
            "api_method": "POST",
            "parameters": {
                "type": "object",
                "properties": {
                    "address": {"type": "string"},
                    "granularity": {"type": "string", "enum": ["block", "daily"]},
                    "recent_block": {"type": "integer", "minimum": 1, "maximum": 10000}
                },
                "required": ["address"]
            }
        })),
        subscan_def(json!({
            "name": "staking_validators",
            "description": "List active validators of a relay chain.",
            "api_path": "/api/scan/staking/validators",
            "api_method": "POST",
            "networks": ["polkadot", "kusama", "westend"],
            "parameters": {
                "type": "object",
                "properties": {
                    "row": {"type": "integer", "minimum": 1, "maximum": 100, "default": 20}
                },
                "required": []
            }
        })),
        assethub_def(json!({
            "name": "assethub_assets_asset",
            "description": "Read the registry entry of an asset on AssetHub.",
            "pallet_name": "Assets",
            "storage_item_name": "Asset",
            "key_hashers": ["blake2_128_concat"],
            "key_types": ["u32"],
            "parameters": {
                "type": "object",
                "properties": {"key1": {"type": "integer"}},
                "required": ["key1"]
            }
        })),
    ]
}

/// Builds an `AppState` whose Subscan traffic goes to the mockito server
/// and whose web search degrades to the placeholder (no Tavily key).
pub fn test_state(llm: Arc<dyn LanguageModel>, storage: Arc<dyn StorageRpc>) -> AppState {
    let subscan_base = mockito::server_url();
    let mut entries = HashMap::new();
    for (name, decimals, symbol) in [
        ("polkadot", 10, "DOT"),
        ("kusama", 12, "KSM"),
        ("westend", 12, "WND"),
        ("statemint", 10, "DOT"),
    ] {
        entries.insert(
            name.to_string(),
            NetworkConfig {
                base_url: subscan_base.clone(),
                decimals,
                symbol: symbol.to_string(),
            },
        );
    }
    let networks = Networks::new(entries);
    let catalog = ToolCatalog::from_definitions(test_definitions()).unwrap();
    let http = reqwest::Client::new();

    AppState::new(
        Config::default(),
        networks,
        catalog,
        llm,
        SubscanClient::new(http.clone(), Some("test-key".to_string())),
        storage,
        SearchClient::new(http, None),
    )
}
