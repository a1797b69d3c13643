// src/data_sources/mod.rs

//! Backend clients: the Subscan indexer API, the AssetHub direct-RPC
//! storage interface, and the web-search provider.

pub mod assethub;
pub mod search;
pub mod storage_key;
pub mod subscan;

pub use assethub::{HttpAssetHubClient, StorageQuery, StorageRpc};
pub use search::SearchClient;
pub use subscan::SubscanClient;
