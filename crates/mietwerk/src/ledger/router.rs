use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Router,
};
use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;

use super::domain::{
    ContractId, DeletePlannedOutcome, NewRentPeriod, RentPeriodId, RentPeriodStatus, RentReason,
};
use super::repository::{LedgerRepository, RepositoryError};
use super::service::{IndexPreviewRequest, LedgerError, RentLedger};
use crate::indexation::VpiReading;

/// Router builder exposing the ledger operations over HTTP. Dates cross
/// this boundary as ISO-8601 calendar dates; money as decimal strings or
/// numbers with cent precision.
pub fn ledger_router<R>(ledger: Arc<RentLedger<R>>) -> Router
where
    R: LedgerRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/contracts/:contract_id/rent/current",
            get(current_rent_handler::<R>),
        )
        .route(
            "/api/v1/contracts/:contract_id/rent/periods",
            get(periods_handler::<R>).post(create_period_handler::<R>),
        )
        .route(
            "/api/v1/contracts/:contract_id/rent/periods/planned",
            get(planned_periods_handler::<R>),
        )
        .route(
            "/api/v1/contracts/:contract_id/rent/vpi/latest",
            get(latest_vpi_handler::<R>),
        )
        .route(
            "/api/v1/contracts/:contract_id/rent/index-preview",
            post(index_preview_handler::<R>),
        )
        .route(
            "/api/v1/rent-periods/:period_id",
            delete(delete_planned_handler::<R>),
        )
        .with_state(ledger)
}

#[derive(Debug, Deserialize)]
pub(crate) struct AsOfQuery {
    pub(crate) as_of: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreateRentPeriodRequest {
    pub(crate) effective_date: NaiveDate,
    pub(crate) cold_rent: Decimal,
    pub(crate) utilities: Decimal,
    pub(crate) reason: RentReason,
    #[serde(default = "default_status")]
    pub(crate) status: RentPeriodStatus,
    #[serde(default)]
    pub(crate) vpi_old: Option<VpiReading>,
    #[serde(default)]
    pub(crate) vpi_new: Option<VpiReading>,
    #[serde(default)]
    pub(crate) notes: Option<String>,
    #[serde(default)]
    pub(crate) sync_to_contract: bool,
    #[serde(default)]
    pub(crate) today: Option<NaiveDate>,
}

fn default_status() -> RentPeriodStatus {
    RentPeriodStatus::Active
}

#[derive(Debug, Deserialize)]
pub(crate) struct IndexPreviewBody {
    pub(crate) vpi_new: VpiReading,
    #[serde(default)]
    pub(crate) vpi_old: Option<VpiReading>,
    #[serde(default)]
    pub(crate) possible_since: Option<NaiveDate>,
    #[serde(default)]
    pub(crate) today: Option<NaiveDate>,
}

pub(crate) async fn current_rent_handler<R>(
    State(ledger): State<Arc<RentLedger<R>>>,
    Path(contract_id): Path<String>,
    Query(query): Query<AsOfQuery>,
) -> Response
where
    R: LedgerRepository + 'static,
{
    let contract_id = ContractId(contract_id);
    let as_of = query.as_of.unwrap_or_else(|| Local::now().date_naive());

    match ledger.current_rent(&contract_id, as_of) {
        Ok(Some(current)) => (StatusCode::OK, axum::Json(current)).into_response(),
        Ok(None) => contract_not_found(&contract_id),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn periods_handler<R>(
    State(ledger): State<Arc<RentLedger<R>>>,
    Path(contract_id): Path<String>,
) -> Response
where
    R: LedgerRepository + 'static,
{
    match ledger.rent_periods(&ContractId(contract_id)) {
        Ok(periods) => (StatusCode::OK, axum::Json(periods)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn planned_periods_handler<R>(
    State(ledger): State<Arc<RentLedger<R>>>,
    Path(contract_id): Path<String>,
) -> Response
where
    R: LedgerRepository + 'static,
{
    match ledger.planned_periods(&ContractId(contract_id)) {
        Ok(periods) => (StatusCode::OK, axum::Json(periods)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn latest_vpi_handler<R>(
    State(ledger): State<Arc<RentLedger<R>>>,
    Path(contract_id): Path<String>,
) -> Response
where
    R: LedgerRepository + 'static,
{
    match ledger.latest_vpi_values(&ContractId(contract_id)) {
        Ok(reading) => (StatusCode::OK, axum::Json(reading)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn create_period_handler<R>(
    State(ledger): State<Arc<RentLedger<R>>>,
    Path(contract_id): Path<String>,
    axum::Json(request): axum::Json<CreateRentPeriodRequest>,
) -> Response
where
    R: LedgerRepository + 'static,
{
    let today = request.today.unwrap_or_else(|| Local::now().date_naive());
    let new_period = NewRentPeriod {
        contract_id: ContractId(contract_id),
        effective_date: request.effective_date,
        cold_rent: request.cold_rent,
        utilities: request.utilities,
        reason: request.reason,
        status: request.status,
        vpi_old: request.vpi_old,
        vpi_new: request.vpi_new,
        notes: request.notes,
        sync_to_contract: request.sync_to_contract,
    };

    match ledger.create_rent_period(new_period, today) {
        Ok(period) => (StatusCode::CREATED, axum::Json(period)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn delete_planned_handler<R>(
    State(ledger): State<Arc<RentLedger<R>>>,
    Path(period_id): Path<String>,
) -> Response
where
    R: LedgerRepository + 'static,
{
    let period_id = RentPeriodId(period_id);
    match ledger.delete_planned_period(&period_id) {
        Ok(DeletePlannedOutcome::Deleted) => StatusCode::NO_CONTENT.into_response(),
        Ok(DeletePlannedOutcome::NotPlanned) => {
            let payload = json!({
                "error": "only planned rent periods can be deleted",
                "period_id": period_id.0,
            });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        Ok(DeletePlannedOutcome::Missing) => {
            let payload = json!({
                "error": "rent period not found",
                "period_id": period_id.0,
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn index_preview_handler<R>(
    State(ledger): State<Arc<RentLedger<R>>>,
    Path(contract_id): Path<String>,
    axum::Json(body): axum::Json<IndexPreviewBody>,
) -> Response
where
    R: LedgerRepository + 'static,
{
    let contract_id = ContractId(contract_id);
    let today = body.today.unwrap_or_else(|| Local::now().date_naive());
    let request = IndexPreviewRequest {
        vpi_new: body.vpi_new,
        vpi_old: body.vpi_old,
        possible_since: body.possible_since,
    };

    match ledger.preview_index_adjustment(&contract_id, request, today) {
        Ok(proposal) => (StatusCode::OK, axum::Json(proposal)).into_response(),
        Err(error) => error_response(error),
    }
}

fn contract_not_found(contract_id: &ContractId) -> Response {
    let payload = json!({
        "error": "contract not found",
        "contract_id": contract_id.0,
    });
    (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
}

fn error_response(error: LedgerError) -> Response {
    let status = match &error {
        LedgerError::ContractNotFound(_) => StatusCode::NOT_FOUND,
        LedgerError::PlannedPeriodNotFuture { .. }
        | LedgerError::MissingVpiBaseline(_)
        | LedgerError::Index(_) => StatusCode::UNPROCESSABLE_ENTITY,
        LedgerError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        LedgerError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        LedgerError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}
