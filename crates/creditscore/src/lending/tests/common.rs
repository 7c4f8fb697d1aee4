use axum::response::Response;
use serde_json::Value;

use crate::lending::domain::{FinancialProfile, LoanRequest};
use crate::lending::evaluation::{DecisionEngine, EvaluationConfig};
use crate::lending::rates::LoanType;
use crate::lending::risk::{EstimatorError, RiskFeatures};

/// Reference dossier: 50k EUR/year, 200k EUR over 20 years, no existing charges.
pub(super) fn request() -> LoanRequest {
    LoanRequest {
        annual_income: 50_000.0,
        principal: 200_000.0,
        duration_years: 20,
        age: 35,
        employment_tenure_years: 5.0,
        children: 2,
        existing_charges: 0.0,
        down_payment: 20_000.0,
        loan_type: None,
    }
}

/// Same dossier carrying 500 EUR of monthly charges.
pub(super) fn request_with_charges() -> LoanRequest {
    LoanRequest {
        existing_charges: 500.0,
        ..request()
    }
}

pub(super) fn engine() -> DecisionEngine {
    DecisionEngine::default()
}

pub(super) fn config() -> EvaluationConfig {
    EvaluationConfig::default()
}

/// Profile with every figure comfortably inside the rules.
pub(super) fn profile() -> FinancialProfile {
    FinancialProfile {
        loan_type: LoanType::Immobilier,
        annual_rate: 0.035,
        max_duration_years: 25,
        monthly_income: 4_000.0,
        monthly_payment: 1_000.0,
        total_cost: 240_000.0,
        total_interest: 40_000.0,
        debt_ratio: 0.25,
        residual_income: 3_000.0,
        max_capacity: 250_000.0,
        age_at_maturity: 55,
    }
}

pub(super) fn failing_estimator(_features: &RiskFeatures) -> Result<f64, EstimatorError> {
    Err(EstimatorError::Scoring("model backend offline".to_string()))
}

pub(super) fn assert_close(actual: f64, expected: f64, tolerance: f64) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {expected} +/- {tolerance}, got {actual}"
    );
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
