use crate::cli::ServeArgs;
use crate::infra::{seed_demo_data, AppState, InMemoryLedgerRepository, InMemoryLoanStore};
use crate::routes::with_core_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use mietwerk::config::AppConfig;
use mietwerk::error::AppError;
use mietwerk::ledger::RentLedger;
use mietwerk::telemetry;
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

    let repository = Arc::new(InMemoryLedgerRepository::default());
    let loans = Arc::new(InMemoryLoanStore::default());
    seed_demo_data(&repository, &loans);
    let ledger = Arc::new(RentLedger::new(repository));

    let app = with_core_routes(ledger, loans)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "rent ledger service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
