use std::sync::Arc;

use tracing::{info, warn};

use super::calculator::{self, AmortizationYear, PaymentQuote};
use super::domain::{DecisionResult, LoanRequest};
use super::error::LendingError;
use super::evaluation::{DecisionEngine, EvaluationConfig};
use super::rates::RateTable;
use super::risk::RiskEstimator;

/// Parameters of a borrowing-capacity simulation.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CapacityQuery {
    pub monthly_income: f64,
    pub annual_rate: f64,
    pub duration_years: u32,
    #[serde(default, alias = "charges")]
    pub existing_charges: f64,
    /// Defaults to the engine's regulatory ceiling.
    #[serde(default)]
    pub debt_ratio_ceiling: Option<f64>,
}

/// Service composing the decision engine with the injected risk estimator.
pub struct CreditAssessmentService<E: ?Sized> {
    engine: DecisionEngine,
    estimator: Arc<E>,
}

impl<E> CreditAssessmentService<E>
where
    E: RiskEstimator + ?Sized,
{
    pub fn new(estimator: Arc<E>, config: EvaluationConfig) -> Self {
        Self::with_engine(DecisionEngine::new(config, RateTable::default()), estimator)
    }

    pub fn with_engine(engine: DecisionEngine, estimator: Arc<E>) -> Self {
        Self { engine, estimator }
    }

    pub fn engine(&self) -> &DecisionEngine {
        &self.engine
    }

    pub fn estimator(&self) -> &E {
        &self.estimator
    }

    /// Evaluate an application with the configured estimator.
    pub fn evaluate(&self, request: &LoanRequest) -> Result<DecisionResult, LendingError> {
        let result = self
            .engine
            .evaluate_with(request, self.estimator.as_ref())
            .map_err(|err| {
                if let LendingError::EstimatorUnavailable(detail) = &err {
                    warn!(estimator = self.estimator.name(), %detail, "risk estimator failed");
                }
                err
            })?;

        info!(
            decision = result.decision.label(),
            score = result.score,
            alerts = result.alerts.len(),
            loan_type = result.profile.loan_type.label(),
            "credit application evaluated"
        );

        Ok(result)
    }

    pub fn quote(
        &self,
        principal: f64,
        annual_rate: f64,
        duration_years: u32,
    ) -> Result<PaymentQuote, LendingError> {
        calculator::quote_payment(principal, annual_rate, duration_years)
    }

    pub fn capacity(&self, query: &CapacityQuery) -> Result<f64, LendingError> {
        calculator::compute_max_capacity(
            query.monthly_income,
            query.existing_charges,
            query.annual_rate,
            query.duration_years,
            query
                .debt_ratio_ceiling
                .unwrap_or(self.engine.config().max_debt_ratio),
        )
    }

    pub fn amortization(
        &self,
        principal: f64,
        annual_rate: f64,
        duration_years: u32,
    ) -> Result<Vec<AmortizationYear>, LendingError> {
        self.engine.config().check_schedule_years(duration_years)?;
        calculator::amortization_schedule(principal, annual_rate, duration_years)
    }
}
