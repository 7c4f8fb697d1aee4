use creditscore::config::RiskConfig;
use creditscore::error::AppError;
use creditscore::lending::{
    EvaluationConfig, FixedRiskEstimator, LoanType, LogisticRiskEstimator, PolicyError,
    RiskEstimator, UnavailableRiskEstimator,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) estimator: EstimatorStatus,
}

/// What `/health` reports about the risk model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct EstimatorStatus {
    pub(crate) name: String,
    pub(crate) loaded: bool,
}

impl EstimatorStatus {
    pub(crate) fn of(estimator: &dyn RiskEstimator) -> Self {
        Self {
            name: estimator.name().to_string(),
            loaded: estimator.is_available(),
        }
    }
}

/// Resolve the configured estimator: model file first, then the fixed fallback.
pub(crate) fn load_estimator(config: &RiskConfig) -> Result<Arc<dyn RiskEstimator>, AppError> {
    if let Some(path) = &config.model_path {
        let model = LogisticRiskEstimator::from_path(path)?;
        info!(model = model.name(), path = %path.display(), "risk model loaded");
        return Ok(Arc::new(model));
    }

    match config.fallback_probability {
        Some(probability) => {
            warn!(probability, "no risk model configured, using fixed default probability");
            Ok(Arc::new(FixedRiskEstimator::new(probability)?))
        }
        None => {
            warn!("no risk model configured, evaluations will be rejected");
            Ok(Arc::new(UnavailableRiskEstimator))
        }
    }
}

/// Scoring policy from an optional JSON file; missing keys keep the HCSF defaults.
///
/// The merged policy is validated before any engine is built from it.
pub(crate) fn load_evaluation_config(path: Option<&Path>) -> Result<EvaluationConfig, AppError> {
    match path {
        Some(path) => {
            let reader = BufReader::new(File::open(path)?);
            let config: EvaluationConfig =
                serde_json::from_reader(reader).map_err(PolicyError::from)?;
            config.validate()?;
            info!(path = %path.display(), "scoring policy loaded");
            Ok(config)
        }
        None => Ok(EvaluationConfig::default()),
    }
}

pub(crate) fn parse_probability(raw: &str) -> Result<f64, String> {
    match raw.trim().parse::<f64>() {
        Ok(value) if (0.0..=1.0).contains(&value) => Ok(value),
        Ok(value) => Err(format!("{value} is not a probability between 0 and 1")),
        Err(err) => Err(format!("failed to parse '{raw}' as a number ({err})")),
    }
}

pub(crate) fn parse_loan_type(raw: &str) -> Result<LoanType, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "immobilier" | "mortgage" => Ok(LoanType::Immobilier),
        "consommation" | "consumer" => Ok(LoanType::Consommation),
        other => Err(format!(
            "unknown loan type '{other}', expected immobilier or consommation"
        )),
    }
}
