// src/main.rs

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    routing::{get, post},
    Router,
};
use polkaquery::{
    api::{health::health_handler, query::query_handler, tools::list_tools_handler},
    catalog::ToolCatalog,
    config::Config,
    data_sources::{HttpAssetHubClient, SearchClient, SubscanClient},
    llm::GeminiClient,
    networks::Networks,
    AppState,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

async fn run_http_server(state: AppState) {
    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/query", post(query_handler))
        .route("/tools", get(list_tools_handler))
        .with_state(state.clone())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = SocketAddr::from(([127, 0, 0, 1], state.config.port));
    info!("🚀 Polkaquery listening on {}", addr);
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("❌ Failed to bind {}: {}", addr, e);
            return;
        }
    };
    if let Err(e) = axum::serve(listener, app).await {
        error!("server error: {}", e);
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "polkaquery=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("❌ Failed to load configuration: {}", e);
            return;
        }
    };

    // Load the tool catalog. Serving queries without one is not an option;
    // regenerating the persisted cache is the generator scripts' job.
    let catalog = match ToolCatalog::load(Path::new(&config.tools_directory)) {
        Ok(catalog) => catalog,
        Err(e) => {
            error!("❌ Failed to load tool catalog: {}", e);
            return;
        }
    };

    // One shared HTTP connection pool with a bounded wait for every
    // external call.
    let http = match reqwest::Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            error!("❌ Failed to build HTTP client: {}", e);
            return;
        }
    };

    let llm = Arc::new(GeminiClient::new(http.clone(), config.google_api_key.clone()));
    let subscan = SubscanClient::new(http.clone(), config.subscan_api_key.clone());
    let assethub = Arc::new(HttpAssetHubClient::new(
        http.clone(),
        config.assethub_rpc_url.clone(),
    ));
    let search = SearchClient::new(http, config.tavily_api_key.clone());

    let state = AppState::new(
        config,
        Networks::default(),
        catalog,
        llm,
        subscan,
        assethub,
        search,
    );

    run_http_server(state).await;
}
