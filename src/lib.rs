// src/lib.rs

use std::sync::Arc;

// Re-export modules
pub mod api;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod data_sources;
pub mod dispatch;
pub mod envelope;
pub mod error;
pub mod llm;
pub mod networks;
pub mod pipeline;
pub mod prompts;
pub mod resolver;
pub mod routing;
pub mod synthesizer;

use cache::QueryCache;
use catalog::ToolCatalog;
use data_sources::{SearchClient, StorageRpc, SubscanClient};
use dispatch::Dispatcher;
use llm::LanguageModel;
use networks::Networks;
use resolver::IntentResolver;
use routing::Router;
use synthesizer::Synthesizer;

/// Application state shared across all request handlers
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: config::Config,
    /// Supported-network registry
    pub networks: Networks,
    /// Immutable tool catalog, loaded once at startup
    pub catalog: Arc<ToolCatalog>,
    /// Deterministic keyword pre-classifier
    pub router: Router,
    /// Intent resolution engine
    pub resolver: IntentResolver,
    /// Backend execution
    pub dispatcher: Dispatcher,
    /// Answer synthesis
    pub synthesizer: Synthesizer,
    /// Process-lifetime memoization
    pub cache: Arc<QueryCache>,
}

impl AppState {
    /// Wires the pipeline components around the injected clients. The
    /// catalog and cache are shared; everything else is cheap to clone.
    pub fn new(
        config: config::Config,
        networks: Networks,
        catalog: ToolCatalog,
        llm: Arc<dyn LanguageModel>,
        subscan: SubscanClient,
        assethub: Arc<dyn StorageRpc>,
        search: SearchClient,
    ) -> Self {
        let catalog = Arc::new(catalog);
        AppState {
            config,
            networks: networks.clone(),
            catalog: catalog.clone(),
            router: Router::new(catalog.clone()),
            resolver: IntentResolver::new(llm.clone(), catalog.clone()),
            dispatcher: Dispatcher::new(catalog.clone(), networks, subscan, assethub, search),
            synthesizer: Synthesizer::new(llm),
            cache: Arc::new(QueryCache::new()),
        }
    }
}
