//! HTTP transport integration tests.
//!
//! Starts an axum server and exercises it with reqwest.

use std::sync::Arc;

use serde_json::{json, Value};
use versioned_mutation::http;
use versioned_mutation::inventory::StockItem;
use versioned_mutation::{InMemoryRecordStore, MutationEngine, RecordStore};

fn engine_with_stock(quantity: u64) -> Arc<MutationEngine<InMemoryRecordStore>> {
    let store = InMemoryRecordStore::new();
    store
        .insert(&StockItem::new("sku-1", "widget", quantity))
        .unwrap();
    Arc::new(MutationEngine::new(store))
}

/// Bind to port 0 and return the actual address.
async fn start_server(engine: Arc<MutationEngine<InMemoryRecordStore>>) -> String {
    let app = http::router(engine);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn health_check() {
    let base = start_server(engine_with_stock(1)).await;
    let resp = reqwest::get(format!("{base}/health")).await.unwrap();
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["ok"], true);
}

#[tokio::test]
async fn get_stock_returns_item_and_version() {
    let base = start_server(engine_with_stock(100)).await;

    let resp = reqwest::get(format!("{base}/stock/sku-1")).await.unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["quantity"], 100);
    assert_eq!(body["version"], 1);

    let resp = reqwest::get(format!("{base}/stock/missing")).await.unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn reserve_commits_and_bumps_version() {
    let base = start_server(engine_with_stock(100)).await;
    let client = reqwest::Client::new();

    for (expected_quantity, expected_version) in [(90, 2), (80, 3)] {
        let resp = client
            .post(format!("{base}/stock/sku-1/reserve"))
            .json(&json!({ "quantity": 10 }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);

        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["code"], "applied");
        assert_eq!(body["retryable"], false);
        assert_eq!(body["record"]["data"]["quantity"], expected_quantity);
        assert_eq!(body["record"]["version"], expected_version);
    }
}

#[tokio::test]
async fn over_reservation_is_unprocessable() {
    let engine = engine_with_stock(5);
    let base = start_server(engine.clone()).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/stock/sku-1/reserve"))
        .json(&json!({ "quantity": 10 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 422);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["code"], "precondition_failed");
    assert!(body["record"].is_null());

    let stored = engine
        .store()
        .fetch::<StockItem>("sku-1")
        .unwrap()
        .unwrap();
    assert_eq!(stored.version, 1);
    assert_eq!(stored.data.quantity, 5);
}

#[tokio::test]
async fn restock_unknown_sku_is_not_found() {
    let base = start_server(engine_with_stock(5)).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/stock/sku-9/restock"))
        .json(&json!({ "quantity": 3 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["code"], "not_found");
}

#[tokio::test]
async fn restock_adds_quantity() {
    let base = start_server(engine_with_stock(5)).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/stock/sku-1/restock"))
        .json(&json!({ "quantity": 3 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["record"]["data"]["quantity"], 8);
    assert_eq!(body["record"]["version"], 2);
}
