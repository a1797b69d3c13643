// src/envelope.rs

//! Uniform result envelope and the per-request debug trace.
//!
//! Every pipeline stage appends to the trace, success or failure, so a bad
//! outcome can be diagnosed from the response alone instead of log grepping.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeStatus {
    Success,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorDetail {
    /// Backend status code, when one was received.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
    /// Backend message, verbatim where possible.
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TraceEvent {
    pub stage: String,
    pub detail: Value,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DebugTrace {
    pub events: Vec<TraceEvent>,
}

impl DebugTrace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, stage: &str, detail: Value) {
        self.events.push(TraceEvent {
            stage: stage.to_string(),
            detail,
            at: Utc::now(),
        });
    }
}

/// Normalized outcome of a dispatched action.
#[derive(Debug, Clone, Serialize)]
pub struct ResultEnvelope {
    pub status: EnvelopeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<ErrorDetail>,
    pub debug_trace: DebugTrace,
}

impl ResultEnvelope {
    pub fn success(raw_data: Value, debug_trace: DebugTrace) -> Self {
        Self {
            status: EnvelopeStatus::Success,
            raw_data: Some(raw_data),
            error_detail: None,
            debug_trace,
        }
    }

    pub fn error(code: Option<u16>, message: String, debug_trace: DebugTrace) -> Self {
        Self {
            status: EnvelopeStatus::Error,
            raw_data: None,
            error_detail: Some(ErrorDetail { code, message }),
            debug_trace,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == EnvelopeStatus::Success
    }
}
