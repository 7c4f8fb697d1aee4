mod config;
mod policy;
mod rules;

pub use config::{EvaluationConfig, PolicyError};

use tracing::debug;

use super::calculator;
use super::domain::{DecisionResult, FinancialProfile, LoanRequest, RuleOutcome};
use super::error::LendingError;
use super::intake::IntakeGuard;
use super::rates::RateTable;
use super::risk::{RiskEstimator, RiskFeatures};

/// Stateless evaluator applying the HCSF rule set and score blend to a request.
#[derive(Debug, Clone)]
pub struct DecisionEngine {
    config: EvaluationConfig,
    rates: RateTable,
    guard: IntakeGuard,
}

impl Default for DecisionEngine {
    fn default() -> Self {
        Self::new(EvaluationConfig::default(), RateTable::default())
    }
}

impl DecisionEngine {
    pub fn new(config: EvaluationConfig, rates: RateTable) -> Self {
        let guard = IntakeGuard::from_config(&config);
        Self {
            config,
            rates,
            guard,
        }
    }

    pub fn config(&self) -> &EvaluationConfig {
        &self.config
    }

    pub fn rates(&self) -> &RateTable {
        &self.rates
    }

    /// Validate the request and compute its financial profile.
    pub fn profile(&self, request: &LoanRequest) -> Result<FinancialProfile, LendingError> {
        self.guard.validate(request)?;
        self.compute_profile(request)
    }

    /// Run the full pipeline with an already known default probability.
    pub fn evaluate(
        &self,
        request: &LoanRequest,
        risk_probability: f64,
    ) -> Result<DecisionResult, LendingError> {
        let profile = self.profile(request)?;
        let probability = checked_probability(risk_probability)?;
        Ok(self.decide(request, profile, probability))
    }

    /// Run the full pipeline, asking `estimator` for the default probability.
    pub fn evaluate_with<E>(
        &self,
        request: &LoanRequest,
        estimator: &E,
    ) -> Result<DecisionResult, LendingError>
    where
        E: RiskEstimator + ?Sized,
    {
        let profile = self.profile(request)?;
        let features = RiskFeatures::derive(request, &profile);
        let probability = checked_probability(estimator.predict_risk(&features)?)?;
        Ok(self.decide(request, profile, probability))
    }

    /// Evaluate the rule table alone, without scoring.
    pub fn rules(&self, request: &LoanRequest, profile: &FinancialProfile) -> RuleOutcome {
        rules::evaluate_rules(request, profile, &self.config)
    }

    fn compute_profile(&self, request: &LoanRequest) -> Result<FinancialProfile, LendingError> {
        let loan_type =
            self.rates
                .resolve(request.loan_type, request.principal, request.duration_years);
        let terms = self.rates.terms(loan_type);
        let monthly_income = request.monthly_income();

        let monthly_payment = calculator::compute_monthly_payment(
            request.principal,
            terms.annual_rate,
            request.duration_years,
        )?;
        let total_cost = calculator::compute_total_cost(monthly_payment, request.duration_years);
        let total_interest = calculator::compute_interest(total_cost, request.principal);
        let debt_ratio = calculator::compute_debt_ratio(
            monthly_payment,
            request.existing_charges,
            monthly_income,
        )?;
        let residual_income = calculator::compute_residual_income(
            monthly_income,
            monthly_payment,
            request.existing_charges,
            request.household_size(),
        );
        let max_capacity = calculator::compute_max_capacity(
            monthly_income,
            request.existing_charges,
            terms.annual_rate,
            request.duration_years,
            self.config.max_debt_ratio,
        )?;

        Ok(FinancialProfile {
            loan_type,
            annual_rate: terms.annual_rate,
            max_duration_years: terms.max_duration_years,
            monthly_income,
            monthly_payment,
            total_cost,
            total_interest,
            debt_ratio,
            residual_income,
            max_capacity,
            age_at_maturity: calculator::compute_age_at_maturity(
                request.age,
                request.duration_years,
            ),
        })
    }

    fn decide(
        &self,
        request: &LoanRequest,
        profile: FinancialProfile,
        default_probability: f64,
    ) -> DecisionResult {
        let outcome = rules::evaluate_rules(request, &profile, &self.config);
        for finding in &outcome.findings {
            debug!(
                rule = ?finding.rule,
                severity = finding.severity.label(),
                message = %finding.message,
                "credit rule triggered"
            );
        }

        let (score, breakdown) = policy::blend(&outcome, default_probability, &self.config);
        let verdict = policy::decide_outcome(&outcome, score, &breakdown, &self.config);
        let strengths = rules::collect_strengths(request, &profile, &self.config);

        DecisionResult {
            decision: verdict.decision,
            score,
            breakdown,
            profile,
            alerts: outcome.findings,
            strengths,
            forced_refusal: verdict.forced_refusal,
            refusal_reason: verdict.refusal_reason,
        }
    }
}

fn checked_probability(probability: f64) -> Result<f64, LendingError> {
    if (0.0..=1.0).contains(&probability) {
        Ok(probability)
    } else {
        Err(LendingError::EstimatorUnavailable(format!(
            "probability {probability} outside [0, 1]"
        )))
    }
}
