use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::LoanRequest;
use super::error::LendingError;
use super::risk::RiskEstimator;
use super::service::{CapacityQuery, CreditAssessmentService};

/// Router builder exposing the evaluation and calculator endpoints.
pub fn lending_router<E>(service: Arc<CreditAssessmentService<E>>) -> Router
where
    E: RiskEstimator + ?Sized + 'static,
{
    Router::new()
        .route("/api/v1/credit/evaluate", post(evaluate_handler::<E>))
        .route("/api/v1/credit/payment", get(payment_handler::<E>))
        .route("/api/v1/credit/capacity", get(capacity_handler::<E>))
        .route("/api/v1/credit/amortization", get(amortization_handler::<E>))
        .with_state(service)
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub(crate) struct LoanTermsQuery {
    pub(crate) principal: f64,
    pub(crate) annual_rate: f64,
    pub(crate) duration_years: u32,
}

pub(crate) async fn evaluate_handler<E>(
    State(service): State<Arc<CreditAssessmentService<E>>>,
    Json(request): Json<LoanRequest>,
) -> Response
where
    E: RiskEstimator + ?Sized + 'static,
{
    match service.evaluate(&request) {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(err) => error_response(evaluation_status(&err), &err),
    }
}

pub(crate) async fn payment_handler<E>(
    State(service): State<Arc<CreditAssessmentService<E>>>,
    Query(terms): Query<LoanTermsQuery>,
) -> Response
where
    E: RiskEstimator + ?Sized + 'static,
{
    match service.quote(terms.principal, terms.annual_rate, terms.duration_years) {
        Ok(quote) => {
            let payload = json!({
                "monthly_payment": round_cents(quote.monthly_payment),
                "total_cost": round_cents(quote.total_cost),
                "total_interest": round_cents(quote.total_interest),
                "principal": terms.principal,
                "annual_rate": terms.annual_rate,
                "duration_years": terms.duration_years,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(err) => error_response(StatusCode::BAD_REQUEST, &err),
    }
}

pub(crate) async fn capacity_handler<E>(
    State(service): State<Arc<CreditAssessmentService<E>>>,
    Query(query): Query<CapacityQuery>,
) -> Response
where
    E: RiskEstimator + ?Sized + 'static,
{
    match service.capacity(&query) {
        Ok(capacity) => {
            let payload = json!({
                "max_capacity": round_cents(capacity),
                "monthly_income": query.monthly_income,
                "annual_rate": query.annual_rate,
                "duration_years": query.duration_years,
                "existing_charges": query.existing_charges,
                "debt_ratio_ceiling": query
                    .debt_ratio_ceiling
                    .unwrap_or(service.engine().config().max_debt_ratio),
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(err) => error_response(StatusCode::BAD_REQUEST, &err),
    }
}

pub(crate) async fn amortization_handler<E>(
    State(service): State<Arc<CreditAssessmentService<E>>>,
    Query(terms): Query<LoanTermsQuery>,
) -> Response
where
    E: RiskEstimator + ?Sized + 'static,
{
    match service.amortization(terms.principal, terms.annual_rate, terms.duration_years) {
        Ok(schedule) => (StatusCode::OK, Json(schedule)).into_response(),
        Err(err) => error_response(StatusCode::BAD_REQUEST, &err),
    }
}

fn evaluation_status(err: &LendingError) -> StatusCode {
    match err {
        LendingError::InvalidInput { .. } | LendingError::DivisionByZero { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        LendingError::EstimatorUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

fn error_response(status: StatusCode, err: &LendingError) -> Response {
    let payload = json!({
        "error": err.to_string(),
    });
    (status, Json(payload)).into_response()
}

/// Presentation rounding for calculator responses.
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}
