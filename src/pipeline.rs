// src/pipeline.rs

//! Per-query orchestration: Router → Intent Resolver → Dispatcher →
//! Synthesizer, with the cache probed before the resolver and the
//! dispatcher. Stages run strictly sequentially within one query; across
//! queries the pipeline is fully parallel, sharing only the read-only
//! catalog and the concurrency-safe cache.

use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::cache;
use crate::catalog::Backend;
use crate::envelope::{DebugTrace, ResultEnvelope};
use crate::resolver::ResolvedAction;
use crate::AppState;

/// Everything a processed query produces. Cached whole, so a repeat query
/// returns a byte-identical answer without touching any backend.
#[derive(Debug, Clone, Serialize)]
pub struct QueryOutcome {
    pub answer: String,
    pub network: String,
    pub route: Backend,
    pub forced: bool,
    pub tool_used: Option<String>,
    pub parameters_extracted: Value,
    pub envelope: ResultEnvelope,
}

pub async fn run_query(state: &AppState, query: &str, network: &str) -> QueryOutcome {
    let key = cache::cache_key(query, network);
    if let Some(cached) = state.cache.get_answer(&key) {
        info!(%network, "answer served from cache");
        return cached;
    }

    let mut trace = DebugTrace::new();

    let routing = state.router.classify(query, network);
    trace.record(
        "router.decision",
        json!({
            "backend": routing.backend,
            "forced": routing.forced,
            "eligible_tools": routing.eligible_tool_names,
        }),
    );

    let action = match state.cache.get_resolution(&key) {
        Some(action) => {
            debug!("resolution served from cache");
            trace.record("resolver.cached", json!(true));
            action
        }
        None => {
            let action = state
                .resolver
                .resolve(query, network, &routing, &mut trace)
                .await;
            state.cache.put_resolution(key.clone(), action.clone());
            action
        }
    };

    let envelope = state.dispatcher.execute(&action, network, trace).await;

    let answer = state
        .synthesizer
        .synthesize(query, network, &action, &envelope)
        .await;

    let (tool_used, parameters_extracted) = match &action {
        ResolvedAction::ToolCall {
            tool_name,
            parameters,
        } => (Some(tool_name.clone()), Value::Object(parameters.clone())),
        ResolvedAction::WebSearch { search_query } => (
            Some("internet_search".to_string()),
            json!({"search_query": search_query}),
        ),
        ResolvedAction::NoAction { .. } => (None, json!({})),
    };

    let outcome = QueryOutcome {
        answer,
        network: network.to_string(),
        route: routing.backend,
        forced: routing.forced,
        tool_used,
        parameters_extracted,
        envelope,
    };

    state.cache.put_answer(key, outcome.clone());
    outcome
}
