// src/data_sources/assethub.rs

//! Direct-RPC client for the AssetHub node.
//!
//! Serves the asset-registry data Subscan does not index. The seam is the
//! `StorageRpc` trait so tests and alternative transports can stand in for
//! the live node.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

use super::storage_key;
use crate::error::BackendError;

const BACKEND: &str = "assethub";

/// One storage lookup: pallet, storage item, and the already-validated key
/// arguments in declaration order, plus the hashing/decoding hints the tool
/// generator recorded from the runtime metadata.
#[derive(Debug, Clone)]
pub struct StorageQuery {
    pub pallet: String,
    pub storage_item: String,
    pub keys: Vec<Value>,
    pub key_hashers: Vec<String>,
    pub key_types: Vec<String>,
    pub value_type: Option<String>,
}

#[async_trait]
pub trait StorageRpc: Send + Sync {
    async fn query_storage(&self, query: &StorageQuery) -> Result<Value, BackendError>;
}

/// JSON-RPC implementation talking to a node's HTTP endpoint via
/// `state_getStorage`.
#[derive(Clone)]
pub struct HttpAssetHubClient {
    http: Client,
    url: String,
}

impl HttpAssetHubClient {
    pub fn new(http: Client, url: String) -> Self {
        Self { http, url }
    }
}

#[async_trait]
impl StorageRpc for HttpAssetHubClient {
    async fn query_storage(&self, query: &StorageQuery) -> Result<Value, BackendError> {
        let key = storage_key::storage_key(
            &query.pallet,
            &query.storage_item,
            &query.keys,
            &query.key_hashers,
            &query.key_types,
        )
        .map_err(|message| BackendError::Decode {
            backend: BACKEND,
            message,
        })?;

        debug!(pallet = %query.pallet, item = %query.storage_item, %key, "assethub storage query");

        let payload = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "state_getStorage",
            "params": [key],
        });

        let response = self
            .http
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| BackendError::transport(BACKEND, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Status {
                backend: BACKEND,
                status: status.as_u16(),
                message: body,
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| BackendError::transport(BACKEND, e))?;

        if let Some(error) = body.get("error") {
            return Err(BackendError::Api {
                backend: BACKEND,
                code: error.get("code").and_then(Value::as_i64).unwrap_or(-1),
                message: error
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown RPC error")
                    .to_string(),
            });
        }

        let value = decode_value(body.get("result").unwrap_or(&Value::Null), &query.value_type)?;

        Ok(json!({
            "pallet": query.pallet,
            "storage_item": query.storage_item,
            "key": key,
            "value": value,
        }))
    }
}

/// Decodes the raw storage value. Fixed-width integers are decoded when the
/// tool definition declares the type; everything else stays raw hex, since
/// generic SCALE decoding needs the full runtime metadata.
fn decode_value(raw: &Value, value_type: &Option<String>) -> Result<Value, BackendError> {
    let hex_str = match raw {
        Value::Null => return Ok(Value::Null),
        Value::String(s) => s.trim_start_matches("0x"),
        other => {
            return Err(BackendError::Decode {
                backend: BACKEND,
                message: format!("unexpected storage result {other}"),
            })
        }
    };

    let bytes = hex::decode(hex_str).map_err(|e| BackendError::Decode {
        backend: BACKEND,
        message: format!("invalid hex storage value: {e}"),
    })?;

    let decoded = match value_type.as_deref() {
        Some("u8") if bytes.len() == 1 => Some(json!(bytes[0])),
        Some("u16") if bytes.len() == 2 => {
            Some(json!(u16::from_le_bytes([bytes[0], bytes[1]])))
        }
        Some("u32") if bytes.len() == 4 => {
            let mut buf = [0u8; 4];
            buf.copy_from_slice(&bytes);
            Some(json!(u32::from_le_bytes(buf)))
        }
        Some("u64") if bytes.len() == 8 => {
            let mut buf = [0u8; 8];
            buf.copy_from_slice(&bytes);
            Some(json!(u64::from_le_bytes(buf)))
        }
        Some("u128") if bytes.len() == 16 => {
            let mut buf = [0u8; 16];
            buf.copy_from_slice(&bytes);
            Some(json!(u128::from_le_bytes(buf).to_string()))
        }
        Some("bool") if bytes.len() == 1 => Some(json!(bytes[0] == 1)),
        _ => None,
    };

    Ok(decoded.unwrap_or_else(|| json!(format!("0x{}", hex::encode(&bytes)))))
}
