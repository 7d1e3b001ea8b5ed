use crate::cli::ServeArgs;
use crate::infra::{cached_sample_provider, AppState};
use crate::routes::router;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use lh_appraisal::config::AppConfig;
use lh_appraisal::error::AppError;
use lh_appraisal::pipeline::AnalysisPipeline;
use lh_appraisal::telemetry;
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

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let provider = Arc::new(cached_sample_provider(config.provider.cache_ttl_secs));
    let pipeline = Arc::new(AnalysisPipeline::new(provider));

    let app = router(pipeline)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "appraisal analysis service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
