//! Consumer credit assessment: loan arithmetic, HCSF affordability rules and
//! the blended decision.
//!
//! The calculator and the engine are synchronous and keep no state between
//! calls, so any number of callers may share them. The default-risk estimate
//! is injected per call through [`RiskEstimator`].

pub mod calculator;
pub mod domain;
pub(crate) mod evaluation;
pub mod export;
pub mod intake;
pub mod rates;
pub mod risk;
pub mod router;
pub mod service;

mod error;

#[cfg(test)]
mod tests;

pub use calculator::{AmortizationYear, PaymentQuote};
pub use domain::{
    Decision, DecisionResult, FinancialProfile, LoanRequest, RefusalReason, RuleFinding, RuleKind,
    RuleOutcome, ScoreBreakdown, ScoreFactor, Severity,
};
pub use error::LendingError;
pub use evaluation::{DecisionEngine, EvaluationConfig, PolicyError};
pub use rates::{LoanTerms, LoanType, RateTable};
pub use risk::{
    EstimatorError, FixedRiskEstimator, LogisticModelArtifact, LogisticRiskEstimator,
    RiskEstimator, RiskFeatures, UnavailableRiskEstimator,
};
pub use router::lending_router;
pub use service::{CapacityQuery, CreditAssessmentService};

/// Evaluate a request with the HCSF 2022 defaults and a known default probability.
pub fn evaluate(
    request: &LoanRequest,
    risk_probability: f64,
) -> Result<DecisionResult, LendingError> {
    DecisionEngine::default().evaluate(request, risk_probability)
}

/// Monthly payment for a fixed-rate loan.
pub fn calculate_payment(
    principal: f64,
    annual_rate: f64,
    duration_years: u32,
) -> Result<f64, LendingError> {
    calculator::compute_monthly_payment(principal, annual_rate, duration_years)
}

/// Largest principal serviceable by `monthly_income` with no existing charges.
///
/// The ceiling defaults to the regulatory 35% debt ratio.
pub fn calculate_capacity(
    monthly_income: f64,
    annual_rate: f64,
    duration_years: u32,
    debt_ratio_ceiling: Option<f64>,
) -> Result<f64, LendingError> {
    let ceiling =
        debt_ratio_ceiling.unwrap_or_else(|| EvaluationConfig::default().max_debt_ratio);
    calculator::compute_max_capacity(monthly_income, 0.0, annual_rate, duration_years, ceiling)
}
