use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::{AmortizationSchedule, Loan, LoanId, MonthRow};
use super::repository::LoanStore;
use super::schedule::amortization_schedule;

/// Router builder exposing schedule computation for stored loans and for
/// ad hoc loan terms.
pub fn financing_router<S>(store: Arc<S>) -> Router
where
    S: LoanStore + 'static,
{
    Router::new()
        .route("/api/v1/financing/schedule", post(schedule_handler::<S>))
        .route(
            "/api/v1/loans/:loan_id/schedule",
            get(loan_schedule_handler::<S>),
        )
        .with_state(store)
}

#[derive(Debug, Deserialize)]
pub(crate) struct ScheduleRequest {
    pub(crate) remaining_balance: Decimal,
    pub(crate) interest_rate: Decimal,
    pub(crate) monthly_payment: Decimal,
    pub(crate) start_date: NaiveDate,
    #[serde(default)]
    pub(crate) end_date: Option<NaiveDate>,
    #[serde(default)]
    pub(crate) fixed_interest_end_date: Option<NaiveDate>,
    #[serde(default)]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AsOfQuery {
    pub(crate) as_of: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ScheduleResponse {
    pub(crate) computed_from: NaiveDate,
    pub(crate) schedule_available: bool,
    pub(crate) rows: Vec<MonthRow>,
    pub(crate) chart_rows: Vec<MonthRow>,
    pub(crate) total_interest: Decimal,
    pub(crate) total_principal: Decimal,
    pub(crate) final_balance: Decimal,
}

impl ScheduleResponse {
    fn new(schedule: AmortizationSchedule, computed_from: NaiveDate) -> Self {
        Self {
            computed_from,
            schedule_available: !schedule.is_empty(),
            chart_rows: schedule.chart_rows(),
            total_interest: schedule.total_interest,
            total_principal: schedule.total_principal,
            final_balance: schedule.final_balance,
            rows: schedule.rows,
        }
    }
}

pub(crate) async fn schedule_handler<S>(
    State(_store): State<Arc<S>>,
    axum::Json(request): axum::Json<ScheduleRequest>,
) -> Response
where
    S: LoanStore + 'static,
{
    let today = request.today.unwrap_or_else(|| Local::now().date_naive());
    let loan = Loan {
        remaining_balance: request.remaining_balance,
        interest_rate: request.interest_rate,
        monthly_payment: request.monthly_payment,
        start_date: request.start_date,
        end_date: request.end_date,
        fixed_interest_end_date: request.fixed_interest_end_date,
    };

    let schedule = amortization_schedule(&loan, today);
    (
        StatusCode::OK,
        axum::Json(ScheduleResponse::new(schedule, today)),
    )
        .into_response()
}

pub(crate) async fn loan_schedule_handler<S>(
    State(store): State<Arc<S>>,
    Path(loan_id): Path<String>,
    Query(query): Query<AsOfQuery>,
) -> Response
where
    S: LoanStore + 'static,
{
    let loan_id = LoanId(loan_id);
    let as_of = query.as_of.unwrap_or_else(|| Local::now().date_naive());

    match store.loan(&loan_id) {
        Ok(Some(loan)) => {
            let schedule = amortization_schedule(&loan, as_of);
            (
                StatusCode::OK,
                axum::Json(ScheduleResponse::new(schedule, as_of)),
            )
                .into_response()
        }
        Ok(None) => {
            let payload = json!({
                "error": "loan not found",
                "loan_id": loan_id.0,
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(error) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
