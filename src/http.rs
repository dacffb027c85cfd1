//! HTTP transport for inventory mutations.
//!
//! Requires the `http` feature. Uses axum for routing; the blocking engine
//! runs on tokio's blocking pool.
//!
//! ## Routes
//!
//! - `GET /health`: `{ "ok": true }`.
//! - `GET /stock/:sku`: current item and version.
//! - `POST /stock/:sku/reserve`: body `{ "quantity": n }`.
//! - `POST /stock/:sku/restock`: body `{ "quantity": n }`.
//!
//! Mutation responses carry the outcome report; the HTTP status is the
//! report status.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use versioned_mutation::{http, InMemoryRecordStore, MutationEngine};
//!
//! let engine = Arc::new(MutationEngine::new(InMemoryRecordStore::new()));
//! http::serve(engine, "0.0.0.0:3000").await?;
//! ```

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};

use crate::engine::MutationEngine;
use crate::inventory::{Reserve, Restock, StockItem};
use crate::mutation::Mutation;
use crate::outcome::{report, Outcome, OutcomeReport};
use crate::record::Versioned;
use crate::store::RecordStore;

/// Body of reserve and restock requests.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct QuantityInput {
    pub quantity: u64,
}

#[derive(Serialize)]
struct OutcomeBody<'a> {
    #[serde(flatten)]
    report: OutcomeReport,
    record: Option<&'a Versioned<StockItem>>,
}

/// Build an axum `Router` over the given engine.
pub fn router<S: RecordStore + 'static>(engine: Arc<MutationEngine<S>>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/stock/:sku", get(stock_handler::<S>))
        .route("/stock/:sku/reserve", post(reserve_handler::<S>))
        .route("/stock/:sku/restock", post(restock_handler::<S>))
        .with_state(engine)
}

/// Serve the engine over HTTP at the given address (e.g. `"0.0.0.0:3000"`).
pub async fn serve<S: RecordStore + 'static>(
    engine: Arc<MutationEngine<S>>,
    addr: &str,
) -> Result<(), std::io::Error> {
    let app = router(engine);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "serving inventory mutations");
    axum::serve(listener, app).await
}

async fn health_handler() -> impl IntoResponse {
    Json(json!({ "ok": true }))
}

/// `GET /stock/:sku`
async fn stock_handler<S: RecordStore + 'static>(
    State(engine): State<Arc<MutationEngine<S>>>,
    Path(sku): Path<String>,
) -> Response {
    let joined =
        tokio::task::spawn_blocking(move || engine.store().fetch::<StockItem>(&sku)).await;

    match joined {
        Ok(Ok(Some(item))) => (StatusCode::OK, Json(item)).into_response(),
        Ok(Ok(None)) => {
            let body = json!({ "code": "not_found", "message": "record not found" });
            (StatusCode::NOT_FOUND, Json(body)).into_response()
        }
        Ok(Err(err)) => {
            let status = if err.is_transient() {
                StatusCode::SERVICE_UNAVAILABLE
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            let body = json!({ "code": "store_error", "message": err.to_string() });
            (status, Json(body)).into_response()
        }
        Err(err) => join_failure(err),
    }
}

/// `POST /stock/:sku/reserve`
async fn reserve_handler<S: RecordStore + 'static>(
    State(engine): State<Arc<MutationEngine<S>>>,
    Path(sku): Path<String>,
    Json(input): Json<QuantityInput>,
) -> Response {
    submit_blocking(engine, sku, Reserve::new(input.quantity)).await
}

/// `POST /stock/:sku/restock`
async fn restock_handler<S: RecordStore + 'static>(
    State(engine): State<Arc<MutationEngine<S>>>,
    Path(sku): Path<String>,
    Json(input): Json<QuantityInput>,
) -> Response {
    submit_blocking(engine, sku, Restock::new(input.quantity)).await
}

async fn submit_blocking<S, M>(engine: Arc<MutationEngine<S>>, sku: String, mutation: M) -> Response
where
    S: RecordStore + 'static,
    M: Mutation<StockItem> + Send + 'static,
{
    let joined = tokio::task::spawn_blocking(move || engine.submit(&sku, &mutation)).await;

    match joined {
        Ok(outcome) => outcome_response(&outcome),
        Err(err) => join_failure(err),
    }
}

fn outcome_response(outcome: &Outcome<StockItem>) -> Response {
    let report = report(outcome);
    let status = StatusCode::from_u16(report.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body = OutcomeBody {
        report,
        record: outcome.applied(),
    };
    (status, Json(body)).into_response()
}

fn join_failure(err: tokio::task::JoinError) -> Response {
    error!(error = %err, "blocking mutation task failed");
    let body = json!({ "code": "internal", "message": err.to_string() });
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}
