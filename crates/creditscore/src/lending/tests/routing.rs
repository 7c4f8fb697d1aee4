use super::common::*;
use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Request, StatusCode};
use axum::Json;
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;

use crate::lending::domain::LoanRequest;
use crate::lending::risk::{FixedRiskEstimator, RiskEstimator, UnavailableRiskEstimator};
use crate::lending::router::{evaluate_handler, lending_router, round_cents};
use crate::lending::service::CreditAssessmentService;

fn fixed_service(probability: f64) -> Arc<CreditAssessmentService<FixedRiskEstimator>> {
    let estimator = FixedRiskEstimator::new(probability).expect("valid probability");
    Arc::new(CreditAssessmentService::new(Arc::new(estimator), config()))
}

fn unavailable_service() -> Arc<CreditAssessmentService<dyn RiskEstimator>> {
    let estimator: Arc<dyn RiskEstimator> = Arc::new(UnavailableRiskEstimator);
    Arc::new(CreditAssessmentService::new(estimator, config()))
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).expect("request builds")
}

#[tokio::test]
async fn evaluate_handler_returns_decision() {
    let response =
        evaluate_handler::<FixedRiskEstimator>(State(fixed_service(0.1)), Json(request())).await;

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload.get("decision"), Some(&json!("ACCEPTED")));
    assert_eq!(payload.get("forced_refusal"), Some(&json!(false)));
    assert_eq!(payload.get("alerts"), Some(&json!([])));
}

#[tokio::test]
async fn evaluate_handler_rejects_malformed_request() {
    let invalid = LoanRequest {
        principal: 0.0,
        ..request()
    };

    let response =
        evaluate_handler::<FixedRiskEstimator>(State(fixed_service(0.1)), Json(invalid)).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    let message = payload
        .get("error")
        .and_then(serde_json::Value::as_str)
        .expect("error message");
    assert!(message.contains("principal"));
}

#[tokio::test]
async fn evaluate_handler_reports_missing_estimator() {
    let response =
        evaluate_handler::<dyn RiskEstimator>(State(unavailable_service()), Json(request())).await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn evaluate_route_refuses_blocking_dossier() {
    let router = lending_router(fixed_service(0.05));

    let response = router
        .oneshot(
            Request::post("/api/v1/credit/evaluate")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    serde_json::to_vec(&request_with_charges()).expect("serializes"),
                ))
                .expect("request builds"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload.get("decision"), Some(&json!("REFUSED")));
    assert_eq!(payload.get("forced_refusal"), Some(&json!(true)));
    assert_eq!(
        payload
            .pointer("/refusal_reason/rule")
            .and_then(serde_json::Value::as_str),
        Some("debt_ratio")
    );
}

#[tokio::test]
async fn payment_route_rounds_to_cents() {
    let router = lending_router(fixed_service(0.1));

    let response = router
        .oneshot(get(
            "/api/v1/credit/payment?principal=200000&annual_rate=0.035&duration_years=20",
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload.get("monthly_payment"), Some(&json!(1159.92)));
    assert_eq!(payload.get("duration_years"), Some(&json!(20)));
}

#[tokio::test]
async fn payment_route_rejects_zero_duration() {
    let router = lending_router(fixed_service(0.1));

    let response = router
        .oneshot(get(
            "/api/v1/credit/payment?principal=200000&annual_rate=0.035&duration_years=0",
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn capacity_route_defaults_to_regulatory_ceiling() {
    let router = lending_router(fixed_service(0.1));

    let response = router
        .oneshot(get(
            "/api/v1/credit/capacity?monthly_income=4166.67&annual_rate=0.035&duration_years=20&existing_charges=500",
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    let capacity = payload
        .get("max_capacity")
        .and_then(serde_json::Value::as_f64)
        .expect("capacity");
    assert_close(capacity, 165_241.36, 0.5);
    assert_eq!(payload.get("debt_ratio_ceiling"), Some(&json!(0.35)));
}

#[tokio::test]
async fn capacity_route_rejects_ceiling_above_one() {
    let router = lending_router(fixed_service(0.1));

    let response = router
        .oneshot(get(
            "/api/v1/credit/capacity?monthly_income=3000&annual_rate=0.035&duration_years=20&debt_ratio_ceiling=1.5",
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn amortization_route_lists_every_year() {
    let router = lending_router(fixed_service(0.1));

    let response = router
        .oneshot(get(
            "/api/v1/credit/amortization?principal=12000&annual_rate=0&duration_years=2",
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    let rows = payload.as_array().expect("schedule array");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].get("remaining_balance"), Some(&json!(0.0)));
}

#[tokio::test]
async fn amortization_route_rejects_oversized_schedule() {
    let router = lending_router(fixed_service(0.1));

    let response = router
        .oneshot(get(
            "/api/v1/credit/amortization?principal=1000&annual_rate=0.05&duration_years=10000000",
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = read_json_body(response).await;
    let message = payload
        .get("error")
        .and_then(serde_json::Value::as_str)
        .expect("error message");
    assert!(message.contains("duration_years"), "{message}");
}

#[test]
fn round_cents_keeps_two_decimals() {
    assert_eq!(round_cents(1_159.919_4), 1_159.92);
    assert_eq!(round_cents(0.004), 0.0);
}
