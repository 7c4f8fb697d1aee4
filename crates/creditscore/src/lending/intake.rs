use super::domain::LoanRequest;
use super::error::LendingError;
use super::evaluation::EvaluationConfig;

/// Plausible applicant age range accepted at intake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgeBounds {
    pub min: u32,
    pub max: u32,
}

impl Default for AgeBounds {
    fn default() -> Self {
        Self { min: 18, max: 99 }
    }
}

impl From<&EvaluationConfig> for AgeBounds {
    fn from(config: &EvaluationConfig) -> Self {
        Self {
            min: config.min_applicant_age,
            max: config.max_applicant_age,
        }
    }
}

/// Guard rejecting malformed requests before any arithmetic runs.
#[derive(Debug, Clone, Default)]
pub struct IntakeGuard {
    ages: AgeBounds,
}

impl IntakeGuard {
    pub fn with_bounds(ages: AgeBounds) -> Self {
        Self { ages }
    }

    pub fn from_config(config: &EvaluationConfig) -> Self {
        Self::with_bounds(AgeBounds::from(config))
    }

    pub fn validate(&self, request: &LoanRequest) -> Result<(), LendingError> {
        non_negative("annual_income", request.annual_income)?;

        if !(request.principal.is_finite() && request.principal > 0.0) {
            return Err(LendingError::invalid(
                "principal",
                format!("must be a positive amount, got {}", request.principal),
            ));
        }

        if request.duration_years == 0 {
            return Err(LendingError::invalid(
                "duration_years",
                "must be at least one year",
            ));
        }

        if request.age < self.ages.min || request.age > self.ages.max {
            return Err(LendingError::invalid(
                "age",
                format!(
                    "must lie between {} and {}, got {}",
                    self.ages.min, self.ages.max, request.age
                ),
            ));
        }

        non_negative("employment_tenure_years", request.employment_tenure_years)?;
        non_negative("existing_charges", request.existing_charges)?;
        non_negative("down_payment", request.down_payment)?;

        Ok(())
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), LendingError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(LendingError::invalid(
            field,
            format!("must be finite and non-negative, got {value}"),
        ))
    }
}
