use super::risk::EstimatorError;

/// Failure raised by the calculator, the decision engine, or the risk dependency.
///
/// A refused application is not an error; it is a regular `DecisionResult`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LendingError {
    #[error("invalid input for `{field}`: {reason}")]
    InvalidInput { field: &'static str, reason: String },
    #[error("division by zero while computing {operation}")]
    DivisionByZero { operation: &'static str },
    #[error("risk estimator unavailable: {0}")]
    EstimatorUnavailable(String),
}

impl LendingError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            reason: reason.into(),
        }
    }
}

impl From<EstimatorError> for LendingError {
    fn from(value: EstimatorError) -> Self {
        Self::EstimatorUnavailable(value.to_string())
    }
}
