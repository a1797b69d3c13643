// src/api/query.rs

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use crate::catalog::Backend;
use crate::envelope::DebugTrace;
use crate::networks::DEFAULT_NETWORK;
use crate::pipeline;
use crate::AppState;

// Defines the structure for the JSON body of a query request.
#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    #[serde(default)]
    pub network: Option<String>,
}

// Defines the structure for the JSON output returned by our API.
#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub answer: String,
    pub network: String,
    pub route: Backend,
    pub forced: bool,
    pub tool_used: Option<String>,
    pub parameters_extracted: Value,
    pub run_id: Uuid,
    pub debug_trace: DebugTrace,
}

/// The handler for POST /query. Every processed query returns 200 with a
/// textual answer, success or failure; only malformed intake (missing query,
/// unknown network) is rejected outright.
pub async fn query_handler(
    State(state): State<AppState>,
    Json(req): Json<QueryRequest>,
) -> impl IntoResponse {
    if req.query.trim().is_empty() {
        return (StatusCode::BAD_REQUEST, "Query field is missing.").into_response();
    }

    let network = req
        .network
        .unwrap_or_else(|| DEFAULT_NETWORK.to_string())
        .to_lowercase();
    if !state.networks.is_supported(&network) {
        return (
            StatusCode::BAD_REQUEST,
            format!(
                "Unsupported network: '{}'. Supported networks are: {:?}",
                network,
                state.networks.names()
            ),
        )
            .into_response();
    }

    let run_id = Uuid::new_v4();
    info!(%run_id, %network, "processing query");

    let outcome = pipeline::run_query(&state, &req.query, &network).await;

    let response = QueryResponse {
        answer: outcome.answer,
        network: outcome.network,
        route: outcome.route,
        forced: outcome.forced,
        tool_used: outcome.tool_used,
        parameters_extracted: outcome.parameters_extracted,
        run_id,
        debug_trace: outcome.envelope.debug_trace,
    };
    (StatusCode::OK, Json(response)).into_response()
}
