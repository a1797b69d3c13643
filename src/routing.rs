// src/routing.rs

//! Deterministic keyword pre-classifier.
//!
//! The router runs before any language-model call and decides which backend
//! family may serve a query. The keyword overrides are evaluated in a fixed
//! order and win over anything the resolver might later prefer: only the
//! router's keyword tables encode which backend *can* serve a query, and the
//! fallback law in the resolver depends on `forced` being set here and
//! nowhere else.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::catalog::{Backend, ToolCatalog};

/// Query fragments that force the direct-RPC (AssetHub) backend.
const DIRECT_RPC_KEYWORDS: [&str; 5] = [
    "assethub",
    "asset hub",
    "statemint",
    "statemine",
    "asset registry",
];

/// Query fragments that force the indexer backend by naming it outright.
const INDEXER_KEYWORDS: [&str; 1] = ["subscan"];

#[derive(Debug, Clone, Serialize)]
pub struct RoutingDecision {
    pub backend: Backend,
    /// True when a keyword override applied. A forced decision disables the
    /// web-search fallback: naming a backend is an explicit signal that
    /// search is not wanted.
    pub forced: bool,
    /// Catalog entries visible to the resolver for this query, already
    /// filtered down to the decided backend and the target network.
    pub eligible_tool_names: Vec<String>,
}

#[derive(Clone)]
pub struct Router {
    catalog: Arc<ToolCatalog>,
}

impl Router {
    pub fn new(catalog: Arc<ToolCatalog>) -> Self {
        Self { catalog }
    }

    /// Precedence, first match wins: explicit indexer mention, then
    /// specialized-backend terms, then the indexer default with
    /// `forced = false` (leaving the resolver free to fall back to search).
    pub fn classify(&self, query: &str, network: &str) -> RoutingDecision {
        let query_lower = query.to_lowercase();

        let (backend, forced) = if INDEXER_KEYWORDS.iter().any(|k| query_lower.contains(k)) {
            (Backend::Subscan, true)
        } else if DIRECT_RPC_KEYWORDS.iter().any(|k| query_lower.contains(k)) {
            (Backend::AssetHub, true)
        } else {
            (Backend::Subscan, false)
        };

        let eligible_tool_names: Vec<String> = self
            .catalog
            .names_for_backend(backend)
            .into_iter()
            .filter(|name| {
                self.catalog
                    .lookup(name)
                    .map(|tool| tool.allowed_on(network))
                    .unwrap_or(false)
            })
            .collect();

        debug!(
            backend = %backend,
            forced,
            eligible = eligible_tool_names.len(),
            "routing decision"
        );

        RoutingDecision {
            backend,
            forced,
            eligible_tool_names,
        }
    }
}
