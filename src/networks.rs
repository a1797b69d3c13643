// src/networks.rs

//! Supported-network table and the network-to-capability table.
//!
//! Capabilities are an explicit enumeration, not something inferred at
//! runtime or left to the language model's guess. Block-level balance
//! history is only served by Subscan for three networks; everywhere else
//! the API falls back to daily snapshots.

use std::collections::HashMap;

use serde::Serialize;

pub const DEFAULT_NETWORK: &str = "polkadot";

/// Networks whose Subscan instance supports block-level balance history.
pub const BLOCK_HISTORY_NETWORKS: [&str; 3] = ["polkadot", "kusama", "westend"];

/// Documented Subscan maximum for the `recent_block` balance-history window.
pub const RECENT_BLOCK_MAX: i64 = 10_000;

#[derive(Debug, Clone, Serialize)]
pub struct NetworkConfig {
    pub base_url: String,
    pub decimals: u32,
    pub symbol: String,
}

/// Registry of networks this deployment can answer questions about.
#[derive(Debug, Clone)]
pub struct Networks {
    entries: HashMap<String, NetworkConfig>,
}

impl Networks {
    pub fn new(entries: HashMap<String, NetworkConfig>) -> Self {
        Self { entries }
    }

    pub fn get(&self, name: &str) -> Option<&NetworkConfig> {
        self.entries.get(name)
    }

    pub fn is_supported(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.keys().cloned().collect();
        names.sort();
        names
    }

    /// The balance-history granularity a network is entitled to.
    pub fn history_granularity(network: &str) -> &'static str {
        if BLOCK_HISTORY_NETWORKS.contains(&network) {
            "block"
        } else {
            "daily"
        }
    }

    pub fn supports_block_history(network: &str) -> bool {
        BLOCK_HISTORY_NETWORKS.contains(&network)
    }
}

impl Default for Networks {
    fn default() -> Self {
        let mut entries = HashMap::new();
        let mut add = |name: &str, base_url: &str, decimals: u32, symbol: &str| {
            entries.insert(
                name.to_string(),
                NetworkConfig {
                    base_url: base_url.to_string(),
                    decimals,
                    symbol: symbol.to_string(),
                },
            );
        };
        add("polkadot", "https://polkadot.api.subscan.io", 10, "DOT");
        add("kusama", "https://kusama.api.subscan.io", 12, "KSM");
        add("westend", "https://westend.api.subscan.io", 12, "WND");
        add("statemint", "https://statemint.api.subscan.io", 10, "DOT");
        add("statemine", "https://statemine.api.subscan.io", 12, "KSM");
        Self { entries }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_networks_include_polkadot() {
        let networks = Networks::default();
        assert!(networks.is_supported("polkadot"));
        assert_eq!(networks.get("polkadot").unwrap().symbol, "DOT");
        assert!(!networks.is_supported("bitcoin"));
    }

    #[test]
    fn granularity_follows_capability_table() {
        assert_eq!(Networks::history_granularity("polkadot"), "block");
        assert_eq!(Networks::history_granularity("kusama"), "block");
        assert_eq!(Networks::history_granularity("westend"), "block");
        assert_eq!(Networks::history_granularity("statemint"), "daily");
    }
}
