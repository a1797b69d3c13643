// src/error.rs

use thiserror::Error;

/// Errors raised while loading the tool catalog at startup. These are fatal:
/// the process must not serve queries with an unloaded or corrupt catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("tool definitions directory not found or empty: {0}")]
    MissingPartition(String),

    #[error("failed to read tool definition {file}: {source}")]
    Io {
        file: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse tool definition {file}: {source}")]
    Parse {
        file: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid tool definition '{name}': {reason}")]
    Invalid { name: String, reason: String },

    #[error("duplicate tool name '{0}' in catalog")]
    DuplicateName(String),
}

/// Parameter validation failures produced by the intent resolver before
/// anything is dispatched. These never surface as raw errors to the caller;
/// the fallback policy turns them into a web search or a structured
/// "not supported" envelope.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationError {
    #[error("tool '{0}' is not eligible for this query")]
    IneligibleTool(String),

    #[error("tool '{tool}' is missing required parameter '{param}'")]
    MissingParameter { tool: String, param: String },

    #[error("tool '{tool}' does not accept parameter '{param}'")]
    UnexpectedParameter { tool: String, param: String },

    #[error("parameter '{param}' of tool '{tool}' must be of type {expected}")]
    TypeMismatch {
        tool: String,
        param: String,
        expected: String,
    },

    #[error("parameter '{param}' of tool '{tool}' must be one of {allowed}, got '{value}'")]
    EnumViolation {
        tool: String,
        param: String,
        allowed: String,
        value: String,
    },

    #[error("parameter '{param}' of tool '{tool}' must be between {minimum} and {maximum}, got {value}")]
    BoundViolation {
        tool: String,
        param: String,
        minimum: i64,
        maximum: i64,
        value: i64,
    },

    #[error("'{granularity}' granularity is not available on network '{network}'")]
    CapabilityViolation { network: String, granularity: String },
}

/// Failures talking to a backend (Subscan, AssetHub node, search provider).
/// Never retried; the backend's own message is preserved verbatim so callers
/// can diagnose bound violations and similar server-side rejections.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("{backend} returned HTTP {status}: {message}")]
    Status {
        backend: &'static str,
        status: u16,
        message: String,
    },

    #[error("{backend} API error (code {code}): {message}")]
    Api {
        backend: &'static str,
        code: i64,
        message: String,
    },

    #[error("network error calling {backend}: {message}")]
    Transport {
        backend: &'static str,
        message: String,
    },

    #[error("failed to decode {backend} response: {message}")]
    Decode {
        backend: &'static str,
        message: String,
    },
}

impl BackendError {
    pub fn transport(backend: &'static str, err: reqwest::Error) -> Self {
        BackendError::Transport {
            backend,
            message: err.to_string(),
        }
    }

    /// Backend status code, when one was received.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            BackendError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Errors from the language-reasoning collaborator.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("language model request failed: {0}")]
    Request(String),

    #[error("language model returned an empty response")]
    EmptyResponse,

    #[error("language model response was not valid JSON: {0}")]
    MalformedOutput(String),
}
