use crate::cli::ServeArgs;
use crate::infra::{sample_club, AppState};
use crate::routes::with_mentorship_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use club_mentorship::config::AppConfig;
use club_mentorship::error::AppError;
use club_mentorship::telemetry;
use club_mentorship::workflows::mentorship::{InMemoryMentorshipRepository, MentorshipService};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

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

    let repository = if args.seed_demo {
        Arc::new(sample_club()?)
    } else {
        Arc::new(InMemoryMentorshipRepository::new())
    };
    let service = Arc::new(
        MentorshipService::new(repository)
            .with_recompute_concurrency(config.mentorship.recompute_concurrency),
    );

    // Prime the snapshot before the listener accepts requests.
    if let Err(error) = service.recompute_all().await {
        warn!(%error, "initial mentorship recompute failed");
    }

    let app = with_mentorship_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        recompute_concurrency = config.mentorship.recompute_concurrency,
        "club mentorship service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
