// src/api/tools.rs

use axum::{extract::State, response::IntoResponse, Json};
use serde::Serialize;

use crate::catalog::Backend;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct ToolSummary {
    pub name: String,
    pub backend: Backend,
    pub description: String,
}

/// Lists the loaded catalog, mostly for operators checking what a running
/// instance can answer.
pub async fn list_tools_handler(State(state): State<AppState>) -> impl IntoResponse {
    let mut tools: Vec<ToolSummary> = state
        .catalog
        .iter()
        .map(|tool| ToolSummary {
            name: tool.name.clone(),
            backend: tool.backend,
            description: tool.description.clone(),
        })
        .collect();
    tools.sort_by(|a, b| a.name.cmp(&b.name));
    Json(tools)
}
