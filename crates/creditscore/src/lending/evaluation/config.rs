use serde::{Deserialize, Serialize};

use super::super::error::LendingError;

/// Policy dials for rule thresholds, penalties and the score blend.
///
/// The HCSF percentages are regulatory; penalties, weights and decision
/// thresholds are tunable defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    pub max_debt_ratio: f64,
    pub base_residual_income: f64,
    pub residual_income_per_child: f64,
    pub max_age_at_maturity: u32,
    pub min_applicant_age: u32,
    pub max_applicant_age: u32,
    pub min_employment_tenure_years: f64,
    pub min_down_payment_ratio: f64,

    pub blocking_penalty: f64,
    pub warning_penalty: f64,
    pub rule_weight: f64,
    pub model_weight: f64,
    pub accept_threshold: f64,
    pub conditional_threshold: f64,

    pub comfortable_debt_ratio: f64,
    pub strong_down_payment_ratio: f64,
    pub strong_tenure_years: f64,
    pub comfortable_residual_multiple: f64,

    /// Longest loan the amortization calculator will tabulate.
    pub max_schedule_years: u32,
}

impl EvaluationConfig {
    pub fn hcsf_2022() -> Self {
        Self {
            max_debt_ratio: 0.35,
            base_residual_income: 700.0,
            residual_income_per_child: 300.0,
            max_age_at_maturity: 75,
            min_applicant_age: 18,
            max_applicant_age: 99,
            min_employment_tenure_years: 2.0,
            min_down_payment_ratio: 0.10,

            blocking_penalty: 30.0,
            warning_penalty: 10.0,
            rule_weight: 0.6,
            model_weight: 0.4,
            accept_threshold: 70.0,
            conditional_threshold: 50.0,

            comfortable_debt_ratio: 0.30,
            strong_down_payment_ratio: 0.20,
            strong_tenure_years: 5.0,
            comfortable_residual_multiple: 2.0,

            max_schedule_years: 50,
        }
    }

    /// Minimum residual income for a household with `children` dependents.
    pub fn residual_income_threshold(&self, children: u32) -> f64 {
        self.base_residual_income + self.residual_income_per_child * children as f64
    }

    /// Reject dials that would make every evaluation fail or score nonsense.
    pub fn validate(&self) -> Result<(), PolicyError> {
        if !(self.max_debt_ratio > 0.0 && self.max_debt_ratio <= 1.0) {
            return Err(PolicyError::invalid(
                "max_debt_ratio",
                format!("must lie in (0, 1], got {}", self.max_debt_ratio),
            ));
        }

        if self.min_applicant_age > self.max_applicant_age {
            return Err(PolicyError::invalid(
                "min_applicant_age",
                format!(
                    "{} is above max_applicant_age {}",
                    self.min_applicant_age, self.max_applicant_age
                ),
            ));
        }

        for (field, value) in [
            ("min_down_payment_ratio", self.min_down_payment_ratio),
            ("comfortable_debt_ratio", self.comfortable_debt_ratio),
            ("strong_down_payment_ratio", self.strong_down_payment_ratio),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(PolicyError::invalid(
                    field,
                    format!("must lie in [0, 1], got {value}"),
                ));
            }
        }

        for (field, value) in [
            ("base_residual_income", self.base_residual_income),
            ("residual_income_per_child", self.residual_income_per_child),
            ("min_employment_tenure_years", self.min_employment_tenure_years),
            ("blocking_penalty", self.blocking_penalty),
            ("warning_penalty", self.warning_penalty),
            ("rule_weight", self.rule_weight),
            ("model_weight", self.model_weight),
            ("strong_tenure_years", self.strong_tenure_years),
            ("comfortable_residual_multiple", self.comfortable_residual_multiple),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(PolicyError::invalid(
                    field,
                    format!("must be finite and non-negative, got {value}"),
                ));
            }
        }

        if self.rule_weight + self.model_weight <= 0.0 {
            return Err(PolicyError::invalid(
                "rule_weight",
                "rule and model weights cannot both be zero",
            ));
        }

        for (field, value) in [
            ("accept_threshold", self.accept_threshold),
            ("conditional_threshold", self.conditional_threshold),
        ] {
            if !(0.0..=100.0).contains(&value) {
                return Err(PolicyError::invalid(
                    field,
                    format!("must lie in [0, 100], got {value}"),
                ));
            }
        }

        if self.conditional_threshold > self.accept_threshold {
            return Err(PolicyError::invalid(
                "conditional_threshold",
                format!(
                    "{} is above accept_threshold {}",
                    self.conditional_threshold, self.accept_threshold
                ),
            ));
        }

        if self.max_schedule_years == 0 {
            return Err(PolicyError::invalid(
                "max_schedule_years",
                "must be at least one year",
            ));
        }

        Ok(())
    }

    /// Bound a requested amortization schedule to `max_schedule_years`.
    pub fn check_schedule_years(&self, duration_years: u32) -> Result<(), LendingError> {
        if duration_years > self.max_schedule_years {
            return Err(LendingError::invalid(
                "duration_years",
                format!(
                    "schedules are limited to {} years, got {duration_years}",
                    self.max_schedule_years
                ),
            ));
        }
        Ok(())
    }
}

/// Scoring policy that cannot be loaded or fails validation.
#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    #[error("failed to parse scoring policy: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid scoring policy `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl PolicyError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self::hcsf_2022()
    }
}
