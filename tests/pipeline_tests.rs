//! End-to-end pipeline tests: router, resolver, dispatcher and synthesizer
//! wired together against a scripted model and mocked backends.

mod common;

use std::sync::Arc;

use serde_json::json;

use polkaquery::catalog::Backend;
use polkaquery::dispatch::NOT_SUPPORTED_MESSAGE;
use polkaquery::pipeline::run_query;

use common::{test_state, ScriptedModel, StaticStorage};

#[tokio::test]
async fn subscan_tool_call_end_to_end() {
    let mock = mockito::mock("POST", "/api/v2/scan/accounts")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "code": 0,
                "message": "Success",
                "data": {"address": "1abc", "balance": "52.3"}
            })
            .to_string(),
        )
        .create();

    let llm = Arc::new(ScriptedModel::new(vec![
        r#"{"intent": "account_balance", "parameters": {"address": "1abc"}}"#,
        "The balance of 1abc is 52.3 DOT.",
    ]));
    let state = test_state(llm.clone(), Arc::new(StaticStorage::default()));

    let outcome = run_query(&state, "What is the balance of 1abc?", "polkadot").await;

    mock.assert();
    assert_eq!(outcome.answer, "The balance of 1abc is 52.3 DOT.");
    assert_eq!(outcome.tool_used.as_deref(), Some("account_balance"));
    assert_eq!(outcome.route, Backend::Subscan);
    assert!(!outcome.forced);
    assert!(outcome.envelope.is_success());
    assert_eq!(llm.calls(), 2);
}

#[tokio::test]
async fn unrecognized_query_falls_back_to_web_search() {
    let llm = Arc::new(ScriptedModel::new(vec![
        r#"{"intent": "unknown", "parameters": {"reason": "no blockchain tool answers weather questions"}}"#,
        "Singapore is sunny today.",
    ]));
    let state = test_state(llm, Arc::new(StaticStorage::default()));

    let query = "What is the weather in Singapore?";
    let outcome = run_query(&state, query, "polkadot").await;

    assert_eq!(outcome.answer, "Singapore is sunny today.");
    assert_eq!(outcome.tool_used.as_deref(), Some("internet_search"));
    // The original query goes to search verbatim, not a paraphrase.
    assert_eq!(outcome.parameters_extracted, json!({"search_query": query}));
    assert!(outcome.envelope.is_success());

    let data = outcome.envelope.raw_data.unwrap();
    assert_eq!(data["search_provider"], json!("Placeholder"));
    assert_eq!(data["query_used"], json!(query));
}

#[tokio::test]
async fn forced_backend_dead_end_never_searches() {
    let llm = Arc::new(ScriptedModel::new(vec![
        r#"{"intent": "unknown", "parameters": {"reason": "no storage item covers staking"}}"#,
        "That information is not available from the AssetHub chain.",
    ]));
    let storage = Arc::new(StaticStorage::default());
    let state = test_state(llm, storage.clone());

    let outcome = run_query(&state, "assethub minimum staking amount", "polkadot").await;

    assert_eq!(outcome.route, Backend::AssetHub);
    assert!(outcome.forced);
    assert!(outcome.tool_used.is_none());
    assert!(!outcome.envelope.is_success());
    let detail = outcome.envelope.error_detail.unwrap();
    assert!(detail.message.starts_with(NOT_SUPPORTED_MESSAGE));
    // Forcing a backend rules out the search fallback entirely.
    assert_eq!(storage.calls(), 0);
    assert_eq!(
        outcome.answer,
        "That information is not available from the AssetHub chain."
    );
}

#[tokio::test]
async fn repeated_query_is_served_from_cache() {
    let mock = mockito::mock("POST", "/api/scan/extrinsic")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "code": 0,
                "message": "Success",
                "data": {"hash": "0xabc", "success": true}
            })
            .to_string(),
        )
        .expect(1)
        .create();

    // Two replies only: a second resolution or synthesis would fail.
    let llm = Arc::new(ScriptedModel::new(vec![
        r#"{"intent": "extrinsic_detail", "parameters": {"hash": "0xabc"}}"#,
        "Extrinsic 0xabc succeeded.",
    ]));
    let state = test_state(llm.clone(), Arc::new(StaticStorage::default()));

    let first = run_query(&state, "Show extrinsic 0xabc details", "polkadot").await;
    // Same query modulo case and whitespace must hit the cache.
    let second = run_query(&state, "  show EXTRINSIC 0xabc   details ", "polkadot").await;

    mock.assert();
    assert_eq!(llm.calls(), 2);
    assert_eq!(first.answer, second.answer);
    assert_eq!(
        serde_json::to_value(&first).unwrap(),
        serde_json::to_value(&second).unwrap(),
    );
}

#[tokio::test]
async fn subscan_api_rejection_is_reported_verbatim() {
    let mock = mockito::mock("POST", "/api/scan/blocks")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"code": 10004, "message": "Invalid row", "data": null}).to_string())
        .create();

    let llm = Arc::new(ScriptedModel::new(vec![
        r#"{"intent": "blocks_list", "parameters": {"row": 1}}"#,
        "The data provider rejected the request: the row parameter was invalid.",
    ]));
    let state = test_state(llm, Arc::new(StaticStorage::default()));

    let outcome = run_query(&state, "latest block", "polkadot").await;

    mock.assert();
    assert_eq!(outcome.tool_used.as_deref(), Some("blocks_list"));
    assert!(!outcome.envelope.is_success());
    let detail = outcome.envelope.error_detail.unwrap();
    assert!(detail.message.contains("Invalid row"), "got: {}", detail.message);
    assert_eq!(
        outcome.answer,
        "The data provider rejected the request: the row parameter was invalid."
    );
}

#[tokio::test]
async fn http_error_status_is_preserved() {
    let mock = mockito::mock("POST", "/api/scan/staking/validators")
        .with_status(429)
        .with_header("content-type", "application/json")
        .with_body(json!({"message": "rate limited"}).to_string())
        .create();

    let llm = Arc::new(ScriptedModel::new(vec![
        r#"{"intent": "staking_validators", "parameters": {}}"#,
        "The data provider is rate limiting requests right now.",
    ]));
    let state = test_state(llm, Arc::new(StaticStorage::default()));

    let outcome = run_query(&state, "list the active validators", "polkadot").await;

    mock.assert();
    assert!(!outcome.envelope.is_success());
    let detail = outcome.envelope.error_detail.unwrap();
    assert_eq!(detail.code, Some(429));
    assert!(detail.message.contains("rate limited"), "got: {}", detail.message);
}

#[tokio::test]
async fn ineligible_tool_choice_falls_back_to_search() {
    // The model names an AssetHub tool on an unforced indexer route; the
    // proposal is rejected and the query degrades to search.
    let llm = Arc::new(ScriptedModel::new(vec![
        r#"{"intent": "assethub_assets_asset", "parameters": {"key1": 1984}}"#,
        "I could not find on-chain data, but here is what the web says.",
    ]));
    let storage = Arc::new(StaticStorage::default());
    let state = test_state(llm, storage.clone());

    let query = "tell me about token 1984";
    let outcome = run_query(&state, query, "polkadot").await;

    assert_eq!(storage.calls(), 0);
    assert_eq!(outcome.tool_used.as_deref(), Some("internet_search"));
    assert_eq!(outcome.parameters_extracted, json!({"search_query": query}));
    assert!(outcome.envelope.is_success());
}

#[tokio::test]
async fn assethub_tool_call_uses_storage_rpc() {
    let llm = Arc::new(ScriptedModel::new(vec![
        r#"{"intent": "assethub_assets_asset", "parameters": {"key1": 1984}}"#,
        "Asset 1984 (USDt) has a supply of 1000.",
    ]));
    let storage = Arc::new(StaticStorage::returning(json!({"supply": "1000"})));
    let state = test_state(llm, storage.clone());

    let outcome = run_query(&state, "asset hub details for asset 1984", "statemint").await;

    assert_eq!(storage.calls(), 1);
    assert_eq!(outcome.route, Backend::AssetHub);
    assert!(outcome.forced);
    assert_eq!(outcome.tool_used.as_deref(), Some("assethub_assets_asset"));
    assert!(outcome.envelope.is_success());

    let data = outcome.envelope.raw_data.unwrap();
    assert_eq!(data["pallet"], json!("Assets"));
    assert_eq!(data["value"], json!({"supply": "1000"}));
}

#[tokio::test]
async fn synthesis_failure_degrades_to_raw_data_summary() {
    let mock = mockito::mock("POST", "/api/scan/account/balance_history")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "code": 0,
                "message": "Success",
                "data": {"history": [{"date": "2024-01-01", "balance": "10"}]}
            })
            .to_string(),
        )
        .create();

    // One reply: the recognizer succeeds, the synthesis call finds an
    // exhausted script and fails.
    let llm = Arc::new(ScriptedModel::new(vec![
        r#"{"intent": "account_balance_history", "parameters": {"address": "1abc"}}"#,
    ]));
    let state = test_state(llm, Arc::new(StaticStorage::default()));

    let outcome = run_query(&state, "balance history of 1abc", "polkadot").await;

    mock.assert();
    assert!(outcome.envelope.is_success());
    assert!(outcome
        .answer
        .starts_with("Could not generate a natural language summary."));
    // The capability table fills in block granularity for polkadot.
    assert_eq!(outcome.parameters_extracted["granularity"], json!("block"));
}
