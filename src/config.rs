// src/config.rs

use std::env;

use anyhow::{Context, Result};

/// A struct to hold all configuration, loaded once at startup from the .env file.
#[derive(Clone, Debug)]
pub struct Config {
    // Server settings
    pub port: u16,

    // Reasoning collaborator
    pub google_api_key: String,

    // Backend credentials (optional: calls degrade without them)
    pub subscan_api_key: Option<String>,
    pub tavily_api_key: Option<String>,

    // AssetHub node RPC endpoint
    pub assethub_rpc_url: String,

    // Persisted tool-definition cache
    pub tools_directory: String,

    // Bounded wait for every external network call
    pub request_timeout_secs: u64,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        // Load variables from the .env file into the environment
        dotenvy::dotenv().ok();

        Ok(Config {
            port: env::var("PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            google_api_key: env::var("GOOGLE_API_KEY")
                .context("GOOGLE_API_KEY must be set for intent resolution and answer synthesis")?,
            subscan_api_key: env::var("SUBSCAN_API_KEY").ok(),
            tavily_api_key: env::var("TAVILY_API_KEY").ok(),
            assethub_rpc_url: env::var("ASSETHUB_RPC_URL")
                .unwrap_or_else(|_| "https://statemint.api.onfinality.io/public".to_string()),
            tools_directory: env::var("TOOLS_DIRECTORY")
                .unwrap_or_else(|_| "tool_definitions".to_string()),
            request_timeout_secs: env::var("REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|_| "20".to_string())
                .parse()
                .context("REQUEST_TIMEOUT_SECS must be a valid number")?,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 8000,
            google_api_key: String::new(),
            subscan_api_key: None,
            tavily_api_key: None,
            assethub_rpc_url: "https://statemint.api.onfinality.io/public".to_string(),
            tools_directory: "tool_definitions".to_string(),
            request_timeout_secs: 20,
        }
    }
}
