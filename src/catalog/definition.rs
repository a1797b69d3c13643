// src/catalog/definition.rs

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CatalogError;

/// Backend family a tool belongs to, derived from the catalog partition the
/// definition was loaded from. This is what the dispatcher consults to pick
/// a client; it is never re-derived from the router at execution time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Subscan,
    AssetHub,
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Subscan => "subscan",
            Backend::AssetHub => "assethub",
        }
    }
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Integer,
    Array,
    Boolean,
}

impl ParamType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Integer => "integer",
            ParamType::Array => "array",
            ParamType::Boolean => "boolean",
        }
    }
}

/// Constraints for a single tool parameter, JSON-Schema style.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterSpec {
    #[serde(rename = "type")]
    pub param_type: ParamType,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub allowed: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

/// Parameter block of a tool definition. `BTreeMap` keeps serialization and
/// prompt rendering deterministic.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParameterSchema {
    #[serde(rename = "type", default = "object_type")]
    pub schema_type: String,
    #[serde(default)]
    pub properties: BTreeMap<String, ParameterSpec>,
    #[serde(default)]
    pub required: Vec<String>,
}

fn object_type() -> String {
    "object".to_string()
}

impl ParameterSchema {
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

/// One entry of the tool catalog. Subscan tools carry an API path and method;
/// AssetHub tools name a pallet and storage item instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_method: Option<HttpMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pallet_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_item_name: Option<String>,
    /// Primitive type of the storage value, when the generator knows it.
    /// Lets the RPC client decode integers instead of returning raw hex.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<String>,
    /// Explicit enumeration of networks the tool is valid for. Absent means
    /// every supported network.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub networks: Option<Vec<String>>,
    /// Runtime-declared map-key hashers for RPC tools, one per key argument.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_hashers: Option<Vec<String>>,
    /// Primitive types of the key arguments (e.g. "u32"), one per argument.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_types: Option<Vec<String>>,
    #[serde(default)]
    pub parameters: ParameterSchema,
    #[serde(skip)]
    pub backend: Backend,
}

impl ToolDefinition {
    /// Whether this tool is applicable on the given network.
    pub fn allowed_on(&self, network: &str) -> bool {
        match &self.networks {
            Some(networks) => networks.iter().any(|n| n == network),
            None => true,
        }
    }

    /// Schema self-validation, run once at catalog load. A definition that
    /// fails here makes the whole load fail.
    pub fn validate(&self) -> Result<(), CatalogError> {
        let invalid = |reason: String| CatalogError::Invalid {
            name: self.name.clone(),
            reason,
        };

        if self.name.trim().is_empty() {
            return Err(CatalogError::Invalid {
                name: "<unnamed>".to_string(),
                reason: "tool name is empty".to_string(),
            });
        }

        match self.backend {
            Backend::Subscan => {
                if self.api_path.is_none() || self.api_method.is_none() {
                    return Err(invalid(
                        "subscan tools require 'api_path' and 'api_method'".to_string(),
                    ));
                }
            }
            Backend::AssetHub => {
                if self.pallet_name.is_none() || self.storage_item_name.is_none() {
                    return Err(invalid(
                        "assethub tools require 'pallet_name' and 'storage_item_name'"
                            .to_string(),
                    ));
                }
            }
        }

        if let Some(networks) = &self.networks {
            if networks.is_empty() {
                return Err(invalid(
                    "'networks' restriction must name at least one network".to_string(),
                ));
            }
        }

        for required in &self.parameters.required {
            if !self.parameters.properties.contains_key(required) {
                return Err(invalid(format!(
                    "required parameter '{required}' has no property definition"
                )));
            }
        }

        for (param, spec) in &self.parameters.properties {
            if let (Some(min), Some(max)) = (spec.minimum, spec.maximum) {
                if min > max {
                    return Err(invalid(format!(
                        "parameter '{param}' has minimum {min} greater than maximum {max}"
                    )));
                }
            }
            if spec.minimum.is_some() || spec.maximum.is_some() {
                if spec.param_type != ParamType::Integer {
                    return Err(invalid(format!(
                        "parameter '{param}' has numeric bounds but is not an integer"
                    )));
                }
            }
            if let Some(allowed) = &spec.allowed {
                if allowed.is_empty() {
                    return Err(invalid(format!(
                        "parameter '{param}' has an empty enum"
                    )));
                }
                for value in allowed {
                    let matches = match spec.param_type {
                        ParamType::String => value.is_string(),
                        ParamType::Integer => value.is_i64() || value.is_u64(),
                        ParamType::Boolean => value.is_boolean(),
                        ParamType::Array => value.is_array(),
                    };
                    if !matches {
                        return Err(invalid(format!(
                            "enum value {value} of parameter '{param}' does not match declared type {}",
                            spec.param_type.as_str()
                        )));
                    }
                }
            }
            // Defaults bypass the resolver's per-value checks, so they must
            // conform here.
            if let Some(default) = &spec.default {
                let matches = match spec.param_type {
                    ParamType::String => default.is_string(),
                    ParamType::Integer => default.is_i64(),
                    ParamType::Boolean => default.is_boolean(),
                    ParamType::Array => default.is_array(),
                };
                if !matches {
                    return Err(invalid(format!(
                        "default value {default} of parameter '{param}' does not match declared type {}",
                        spec.param_type.as_str()
                    )));
                }
                if let Some(allowed) = &spec.allowed {
                    if !allowed.contains(default) {
                        return Err(invalid(format!(
                            "default value {default} of parameter '{param}' is outside its enum"
                        )));
                    }
                }
                if let Some(n) = default.as_i64() {
                    if n < spec.minimum.unwrap_or(i64::MIN)
                        || n > spec.maximum.unwrap_or(i64::MAX)
                    {
                        return Err(invalid(format!(
                            "default value {n} of parameter '{param}' violates its bounds"
                        )));
                    }
                }
            }
        }

        Ok(())
    }
}
