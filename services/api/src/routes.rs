use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde_json::json;

use crate::infra::AppState;
use mietwerk::financing::{financing_router, LoanStore};
use mietwerk::ledger::{ledger_router, LedgerRepository, RentLedger};

/// Compose the domain routers with the operational endpoints.
pub(crate) fn with_core_routes<R, S>(ledger: Arc<RentLedger<R>>, loans: Arc<S>) -> Router
where
    R: LedgerRepository + 'static,
    S: LoanStore + 'static,
{
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .merge(ledger_router(ledger))
        .merge(financing_router(loans))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(
    Extension(state): Extension<AppState>,
) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(
    Extension(state): Extension<AppState>,
) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
