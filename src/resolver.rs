// src/resolver.rs

//! Intent resolution: maps a free-text query onto a concrete action.
//!
//! The language model proposes a tool and parameters; everything it returns
//! is treated as untrusted. This module owns the prompt framing, the
//! defensive parsing of the model's reply, schema-conformance validation
//! against the tool catalog, and the fallback policy when the proposal is
//! unusable. Out-of-bound values are rejected, never clamped: the caller
//! gets a structured error that reproduces the documented backend contract.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use crate::catalog::{ParamType, ToolCatalog, ToolDefinition};
use crate::envelope::DebugTrace;
use crate::error::ValidationError;
use crate::llm::{strip_code_fences, LanguageModel};
use crate::networks::Networks;
use crate::prompts::{self, INTERNET_SEARCH_TOOL_NAME};
use crate::routing::RoutingDecision;

/// The concrete action a resolved query maps to. Consumed exactly once by
/// the dispatcher.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolvedAction {
    ToolCall {
        tool_name: String,
        parameters: Map<String, Value>,
    },
    WebSearch {
        search_query: String,
    },
    NoAction {
        reason: String,
    },
}

#[derive(Clone)]
pub struct IntentResolver {
    llm: Arc<dyn LanguageModel>,
    catalog: Arc<ToolCatalog>,
}

impl IntentResolver {
    pub fn new(llm: Arc<dyn LanguageModel>, catalog: Arc<ToolCatalog>) -> Self {
        Self { llm, catalog }
    }

    /// Resolves a query into an action, applying the fallback policy:
    /// an unusable proposal escalates to a web search with the original
    /// query verbatim, unless the routing decision was forced, in which
    /// case the outcome is `NoAction` (forcing a backend is an explicit
    /// signal that search is not wanted).
    pub async fn resolve(
        &self,
        query: &str,
        network: &str,
        routing: &RoutingDecision,
        trace: &mut DebugTrace,
    ) -> ResolvedAction {
        let proposal = self.propose(query, network, routing, trace).await;

        match proposal {
            Ok(action) => action,
            Err(reason) => {
                trace.record("resolver.fallback", json!({"reason": reason}));
                if routing.forced {
                    ResolvedAction::NoAction {
                        reason: format!(
                            "No applicable tool for the forced '{}' backend: {reason}",
                            routing.backend
                        ),
                    }
                } else {
                    ResolvedAction::WebSearch {
                        search_query: query.to_string(),
                    }
                }
            }
        }
    }

    /// Asks the model for a proposal and validates it. `Err` carries the
    /// human-readable reason the proposal was rejected.
    async fn propose(
        &self,
        query: &str,
        network: &str,
        routing: &RoutingDecision,
        trace: &mut DebugTrace,
    ) -> Result<ResolvedAction, String> {
        let tools: Vec<&ToolDefinition> = routing
            .eligible_tool_names
            .iter()
            .filter_map(|name| self.catalog.lookup(name))
            .collect();

        let prompt = prompts::recognizer_prompt(query, network, &tools);
        let raw = self
            .llm
            .generate(&prompt)
            .await
            .map_err(|e| format!("intent recognition failed: {e}"))?;

        trace.record("resolver.raw_output", json!(raw.trim()));

        let parsed: Value = serde_json::from_str(strip_code_fences(&raw))
            .map_err(|e| format!("model reply was not valid JSON: {e}"))?;

        let intent = parsed
            .get("intent")
            .and_then(Value::as_str)
            .ok_or_else(|| "model reply did not name an intent".to_string())?
            .to_string();
        let parameters = match parsed.get("parameters") {
            Some(Value::Object(map)) => map.clone(),
            Some(Value::Null) | None => Map::new(),
            Some(other) => {
                return Err(format!("model returned non-object parameters: {other}"))
            }
        };

        if intent == "unknown" {
            let reason = parameters
                .get("reason")
                .and_then(Value::as_str)
                .unwrap_or("model found no suitable tool")
                .to_string();
            return Err(reason);
        }

        if intent == INTERNET_SEARCH_TOOL_NAME {
            if routing.forced {
                return Err("model chose web search but the backend was forced".to_string());
            }
            let search_query = parameters
                .get("search_query")
                .and_then(Value::as_str)
                .unwrap_or(query)
                .to_string();
            return Ok(ResolvedAction::WebSearch { search_query });
        }

        if !routing.eligible_tool_names.contains(&intent) {
            warn!(tool = %intent, "model chose a tool outside the eligible set");
            return Err(ValidationError::IneligibleTool(intent).to_string());
        }
        let tool = self
            .catalog
            .lookup(&intent)
            .ok_or_else(|| ValidationError::IneligibleTool(intent.clone()).to_string())?;

        let validated = validate_parameters(tool, parameters, network)
            .map_err(|e| e.to_string())?;

        debug!(tool = %tool.name, "resolved tool call");
        trace.record(
            "resolver.action",
            json!({"tool": tool.name, "parameters": validated}),
        );
        Ok(ResolvedAction::ToolCall {
            tool_name: tool.name.clone(),
            parameters: validated,
        })
    }
}

/// Checks every proposed parameter against the tool's schema and returns the
/// coerced parameter set. Coercion is limited to representation (a numeric
/// string becomes a number); values outside enums or bounds are errors.
pub fn validate_parameters(
    tool: &ToolDefinition,
    proposed: Map<String, Value>,
    network: &str,
) -> Result<Map<String, Value>, ValidationError> {
    let mut validated = Map::new();

    for (name, value) in proposed {
        let spec = tool.parameters.properties.get(&name).ok_or_else(|| {
            ValidationError::UnexpectedParameter {
                tool: tool.name.clone(),
                param: name.clone(),
            }
        })?;

        if value.is_null() {
            continue;
        }

        let coerced = coerce(&value, spec.param_type).ok_or_else(|| {
            ValidationError::TypeMismatch {
                tool: tool.name.clone(),
                param: name.clone(),
                expected: spec.param_type.as_str().to_string(),
            }
        })?;

        if let Some(allowed) = &spec.allowed {
            if !allowed.contains(&coerced) {
                return Err(ValidationError::EnumViolation {
                    tool: tool.name.clone(),
                    param: name.clone(),
                    allowed: serde_json::to_string(allowed).unwrap_or_default(),
                    value: value_display(&coerced),
                });
            }
        }

        if let Some(n) = coerced.as_i64() {
            let minimum = spec.minimum.unwrap_or(i64::MIN);
            let maximum = spec.maximum.unwrap_or(i64::MAX);
            if n < minimum || n > maximum {
                return Err(ValidationError::BoundViolation {
                    tool: tool.name.clone(),
                    param: name.clone(),
                    minimum: spec.minimum.unwrap_or(minimum),
                    maximum: spec.maximum.unwrap_or(maximum),
                    value: n,
                });
            }
        }

        validated.insert(name, coerced);
    }

    // Schema defaults for parameters the model left out.
    for (name, spec) in &tool.parameters.properties {
        if !validated.contains_key(name) {
            if let Some(default) = &spec.default {
                validated.insert(name.clone(), default.clone());
            }
        }
    }

    // Network-to-capability table: block-level history is only valid on the
    // networks that actually serve it; everything else gets daily snapshots.
    if tool.parameters.properties.contains_key("granularity") {
        match validated.get("granularity").and_then(Value::as_str) {
            Some("block") if !Networks::supports_block_history(network) => {
                return Err(ValidationError::CapabilityViolation {
                    network: network.to_string(),
                    granularity: "block".to_string(),
                });
            }
            None => {
                validated.insert(
                    "granularity".to_string(),
                    json!(Networks::history_granularity(network)),
                );
            }
            _ => {}
        }
    }

    for required in &tool.parameters.required {
        let missing = match validated.get(required) {
            None => true,
            Some(Value::Null) => true,
            Some(Value::String(s)) => s.trim().is_empty(),
            Some(_) => false,
        };
        if missing {
            return Err(ValidationError::MissingParameter {
                tool: tool.name.clone(),
                param: required.clone(),
            });
        }
    }

    Ok(validated)
}

fn coerce(value: &Value, expected: ParamType) -> Option<Value> {
    match expected {
        ParamType::String => match value {
            Value::String(_) => Some(value.clone()),
            Value::Number(n) => Some(Value::String(n.to_string())),
            _ => None,
        },
        ParamType::Integer => match value {
            // i64 only: a u64 above i64::MAX would slip past the signed
            // bounds check below.
            Value::Number(n) if n.is_i64() => Some(value.clone()),
            Value::String(s) => s.trim().parse::<i64>().ok().map(|n| json!(n)),
            _ => None,
        },
        ParamType::Boolean => match value {
            Value::Bool(_) => Some(value.clone()),
            Value::String(s) => match s.trim().to_lowercase().as_str() {
                "true" => Some(json!(true)),
                "false" => Some(json!(false)),
                _ => None,
            },
            _ => None,
        },
        ParamType::Array => match value {
            Value::Array(_) => Some(value.clone()),
            _ => None,
        },
    }
}

fn value_display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::from_value;

    fn balance_history_tool() -> ToolDefinition {
        let mut def: ToolDefinition = from_value(json!({
            "name": "account_balance_history",
            "description": "Balance history of an account.",
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
        }))
        .unwrap();
        def.backend = crate::catalog::Backend::Subscan;
        def
    }

    fn params(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn accepts_conformant_parameters() {
        let tool = balance_history_tool();
        let out = validate_parameters(
            &tool,
            params(json!({"address": "1abc", "granularity": "block", "recent_block": 500})),
            "polkadot",
        )
        .unwrap();
        assert_eq!(out["recent_block"], json!(500));
        assert_eq!(out["granularity"], json!("block"));
    }

    #[test]
    fn bound_violation_is_rejected_not_clamped() {
        let tool = balance_history_tool();
        let err = validate_parameters(
            &tool,
            params(json!({"address": "1abc", "recent_block": 20000})),
            "polkadot",
        )
        .unwrap_err();
        match err {
            ValidationError::BoundViolation {
                maximum, value, ..
            } => {
                assert_eq!(maximum, 10000);
                assert_eq!(value, 20000);
            }
            other => panic!("expected bound violation, got {other:?}"),
        }
    }

    #[test]
    fn integers_beyond_i64_are_rejected() {
        let tool = balance_history_tool();
        let err = validate_parameters(
            &tool,
            params(json!({"address": "1abc", "recent_block": 18446744073709551615u64})),
            "polkadot",
        )
        .unwrap_err();
        assert!(matches!(err, ValidationError::TypeMismatch { .. }));
    }

    #[test]
    fn numeric_strings_are_coerced() {
        let tool = balance_history_tool();
        let out = validate_parameters(
            &tool,
            params(json!({"address": "1abc", "recent_block": "300"})),
            "polkadot",
        )
        .unwrap();
        assert_eq!(out["recent_block"], json!(300));
    }

    #[test]
    fn enum_violation_is_rejected() {
        let tool = balance_history_tool();
        let err = validate_parameters(
            &tool,
            params(json!({"address": "1abc", "granularity": "hourly"})),
            "polkadot",
        )
        .unwrap_err();
        assert!(matches!(err, ValidationError::EnumViolation { .. }));
    }

    #[test]
    fn missing_required_parameter_is_rejected() {
        let tool = balance_history_tool();
        let err = validate_parameters(&tool, params(json!({"recent_block": 10})), "polkadot")
            .unwrap_err();
        assert!(matches!(err, ValidationError::MissingParameter { .. }));
    }

    #[test]
    fn unexpected_parameter_is_rejected() {
        let tool = balance_history_tool();
        let err = validate_parameters(
            &tool,
            params(json!({"address": "1abc", "bogus": 1})),
            "polkadot",
        )
        .unwrap_err();
        assert!(matches!(err, ValidationError::UnexpectedParameter { .. }));
    }

    #[test]
    fn block_granularity_requires_capable_network() {
        let tool = balance_history_tool();
        let err = validate_parameters(
            &tool,
            params(json!({"address": "1abc", "granularity": "block"})),
            "statemint",
        )
        .unwrap_err();
        assert!(matches!(err, ValidationError::CapabilityViolation { .. }));
    }

    #[test]
    fn granularity_defaults_from_capability_table() {
        let tool = balance_history_tool();
        let block = validate_parameters(&tool, params(json!({"address": "1abc"})), "polkadot")
            .unwrap();
        assert_eq!(block["granularity"], json!("block"));

        let daily = validate_parameters(&tool, params(json!({"address": "1abc"})), "statemint")
            .unwrap();
        assert_eq!(daily["granularity"], json!("daily"));
    }
}
