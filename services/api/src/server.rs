use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryScorecardRepository};
use crate::routes::with_scorecard_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use recruit_portal::config::AppConfig;
use recruit_portal::error::AppError;
use recruit_portal::scorecards::ScorecardService;
use recruit_portal::telemetry;
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

    let repository = Arc::new(InMemoryScorecardRepository::default());
    let scorecard_service = Arc::new(ScorecardService::new(repository));

    let app = with_scorecard_routes(scorecard_service, config.portal.ranking_limit)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        ranking_limit = config.portal.ranking_limit,
        "recruiting portal scorecard service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
