use crate::cli::ServeArgs;
use crate::infra::{load_estimator, load_evaluation_config, AppState, EstimatorStatus};
use crate::routes::with_lending_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use creditscore::config::AppConfig;
use creditscore::error::AppError;
use creditscore::lending::CreditAssessmentService;
use creditscore::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let evaluation_config = load_evaluation_config(config.policy_file.as_deref())?;
    let estimator = load_estimator(&config.risk)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        estimator: EstimatorStatus::of(estimator.as_ref()),
    };

    let credit_service = Arc::new(CreditAssessmentService::new(estimator, evaluation_config));

    let app = with_lending_routes(credit_service)
        .layer(Extension(app_state.clone()))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        estimator = %app_state.estimator.name,
        model_loaded = app_state.estimator.loaded,
        "credit decision service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
