//! Default-risk capability consumed by the decision engine.
//!
//! The engine only needs a probability in `[0, 1]` for a feature vector; how
//! that probability is produced is up to the [`RiskEstimator`] handed in at
//! call time.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::domain::{FinancialProfile, LoanRequest};

/// Engineered features describing one application.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskFeatures {
    pub annual_income: f64,
    pub credit_amount: f64,
    pub age_years: f64,
    pub employed_years: f64,
    pub children: f64,
    pub family_members: f64,
    pub annual_annuity: f64,
    pub credit_income_ratio: f64,
    pub annuity_income_ratio: f64,
    pub monthly_income: f64,
    pub debt_ratio: f64,
    pub residual_income: f64,
    pub duration_years: f64,
    pub age_at_maturity: f64,
    pub credit_term_months: f64,
}

impl RiskFeatures {
    pub const NAMES: [&'static str; 15] = [
        "annual_income",
        "credit_amount",
        "age_years",
        "employed_years",
        "children",
        "family_members",
        "annual_annuity",
        "credit_income_ratio",
        "annuity_income_ratio",
        "monthly_income",
        "debt_ratio",
        "residual_income",
        "duration_years",
        "age_at_maturity",
        "credit_term_months",
    ];

    /// Ratios use the new payment only, without existing charges, matching the
    /// features the estimator was fitted on. Ratios over a zero income are 0.
    pub fn derive(request: &LoanRequest, profile: &FinancialProfile) -> Self {
        let annual_income = request.annual_income;
        let annual_annuity = profile.monthly_payment * 12.0;
        let per_income = |value: f64, income: f64| {
            if income > 0.0 {
                value / income
            } else {
                0.0
            }
        };

        Self {
            annual_income,
            credit_amount: request.principal,
            age_years: request.age as f64,
            employed_years: request.employment_tenure_years,
            children: request.children as f64,
            family_members: request.household_size() as f64,
            annual_annuity,
            credit_income_ratio: per_income(request.principal, annual_income),
            annuity_income_ratio: per_income(annual_annuity, annual_income),
            monthly_income: profile.monthly_income,
            debt_ratio: per_income(profile.monthly_payment, profile.monthly_income),
            residual_income: profile.monthly_income - profile.monthly_payment,
            duration_years: request.duration_years as f64,
            age_at_maturity: profile.age_at_maturity as f64,
            credit_term_months: request.duration_years as f64 * 12.0,
        }
    }

    pub fn feature(&self, name: &str) -> Option<f64> {
        let value = match name {
            "annual_income" => self.annual_income,
            "credit_amount" => self.credit_amount,
            "age_years" => self.age_years,
            "employed_years" => self.employed_years,
            "children" => self.children,
            "family_members" => self.family_members,
            "annual_annuity" => self.annual_annuity,
            "credit_income_ratio" => self.credit_income_ratio,
            "annuity_income_ratio" => self.annuity_income_ratio,
            "monthly_income" => self.monthly_income,
            "debt_ratio" => self.debt_ratio,
            "residual_income" => self.residual_income,
            "duration_years" => self.duration_years,
            "age_at_maturity" => self.age_at_maturity,
            "credit_term_months" => self.credit_term_months,
            _ => return None,
        };
        Some(value)
    }
}

/// Scoring failure raised by an estimator or while loading one.
#[derive(Debug, thiserror::Error)]
pub enum EstimatorError {
    #[error("no risk model loaded")]
    NotLoaded,
    #[error("risk model returned {0}, expected a probability in [0, 1]")]
    OutOfRange(f64),
    #[error("risk model references unknown feature `{0}`")]
    UnknownFeature(String),
    #[error("failed to read risk model: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse risk model: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("risk model failed: {0}")]
    Scoring(String),
}

/// Capability mapping a feature vector to a default probability.
pub trait RiskEstimator: Send + Sync {
    fn predict_risk(&self, features: &RiskFeatures) -> Result<f64, EstimatorError>;

    fn name(&self) -> &str {
        "custom"
    }

    fn is_available(&self) -> bool {
        true
    }
}

impl<F> RiskEstimator for F
where
    F: Fn(&RiskFeatures) -> Result<f64, EstimatorError> + Send + Sync,
{
    fn predict_risk(&self, features: &RiskFeatures) -> Result<f64, EstimatorError> {
        self(features)
    }
}

/// Returns the same probability for every application.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedRiskEstimator {
    probability: f64,
}

impl FixedRiskEstimator {
    pub fn new(probability: f64) -> Result<Self, EstimatorError> {
        if (0.0..=1.0).contains(&probability) {
            Ok(Self { probability })
        } else {
            Err(EstimatorError::OutOfRange(probability))
        }
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }
}

impl RiskEstimator for FixedRiskEstimator {
    fn predict_risk(&self, _features: &RiskFeatures) -> Result<f64, EstimatorError> {
        Ok(self.probability)
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

/// Stand-in used when no model is configured; every call fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableRiskEstimator;

impl RiskEstimator for UnavailableRiskEstimator {
    fn predict_risk(&self, _features: &RiskFeatures) -> Result<f64, EstimatorError> {
        Err(EstimatorError::NotLoaded)
    }

    fn name(&self) -> &str {
        "unavailable"
    }

    fn is_available(&self) -> bool {
        false
    }
}

/// On-disk form of a logistic scoring model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModelArtifact {
    #[serde(default = "default_model_name")]
    pub name: String,
    pub intercept: f64,
    pub coefficients: BTreeMap<String, f64>,
}

fn default_model_name() -> String {
    "logistic".to_string()
}

/// Logistic model over [`RiskFeatures`]: `p = 1 / (1 + e^-(b0 + Σ bi·xi))`.
#[derive(Debug, Clone, PartialEq)]
pub struct LogisticRiskEstimator {
    name: String,
    intercept: f64,
    weights: Vec<(&'static str, f64)>,
}

impl LogisticRiskEstimator {
    pub fn from_artifact(artifact: LogisticModelArtifact) -> Result<Self, EstimatorError> {
        let mut weights = Vec::with_capacity(artifact.coefficients.len());
        for (name, weight) in artifact.coefficients {
            let feature = RiskFeatures::NAMES
                .iter()
                .copied()
                .find(|known| *known == name)
                .ok_or(EstimatorError::UnknownFeature(name))?;
            weights.push((feature, weight));
        }

        Ok(Self {
            name: artifact.name,
            intercept: artifact.intercept,
            weights,
        })
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, EstimatorError> {
        let artifact: LogisticModelArtifact = serde_json::from_reader(reader)?;
        Self::from_artifact(artifact)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, EstimatorError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }
}

impl RiskEstimator for LogisticRiskEstimator {
    fn predict_risk(&self, features: &RiskFeatures) -> Result<f64, EstimatorError> {
        let logit = self
            .weights
            .iter()
            .fold(self.intercept, |acc, (name, weight)| {
                acc + weight * features.feature(name).unwrap_or_default()
            });

        let probability = 1.0 / (1.0 + (-logit).exp());
        if probability.is_finite() {
            Ok(probability)
        } else {
            Err(EstimatorError::Scoring(format!(
                "non-finite logit {logit} from model {}",
                self.name
            )))
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}
