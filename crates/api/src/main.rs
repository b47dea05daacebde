use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use domain::services::TranscriptExtractor;
use helpdesk_api::app::{self, AppState, Collaborators};
use helpdesk_api::config::Config;
use helpdesk_api::jobs::{JobScheduler, PoolMetricsJob, RateLimitPruneJob, TokenSweepJob};
use helpdesk_api::middleware;
use helpdesk_api::services::{build_email_sender, HttpSchedulerClient, HttpTranscriptExtractor};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::load().context("failed to load configuration")?;

    middleware::init_logging(&config.logging).context("failed to initialize logging")?;
    middleware::init_metrics().context("failed to install metrics recorder")?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = %config.server.environment,
        "Starting help desk API"
    );

    let pool = persistence::db::create_pool(&config.database.pool_config()).await?;

    info!("Running database migrations");
    persistence::db::run_migrations(&pool).await?;
    info!("Migrations completed");

    let transcripts: Option<Arc<dyn TranscriptExtractor>> = if config.transcripts.is_configured() {
        Some(Arc::new(HttpTranscriptExtractor::new(&config.transcripts)?))
    } else {
        warn!("TRANSCRIPTS_SERVICE_URL is not set, transcript extraction is disabled");
        None
    };

    let collaborators = Collaborators {
        email_sender: build_email_sender(&config.email)?,
        scheduler: Arc::new(HttpSchedulerClient::new(&config.scheduler)?),
        transcripts,
    };

    let state = AppState::new(config.clone(), pool.clone(), collaborators)?;

    let mut jobs = JobScheduler::new();
    if config.jobs.enabled {
        jobs.register(TokenSweepJob::new(
            state.tx.clone(),
            config.jobs.token_sweep_interval_mins,
        ));
        jobs.register(PoolMetricsJob::new(pool.clone()));
        if let Some(limiter) = &state.auth_rate_limiter {
            jobs.register(RateLimitPruneJob::new(Arc::clone(limiter)));
        }
        jobs.start();
    }

    let app = app::create_app(state);

    let addr = config.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(address = %addr, "Server listening");

    let shutdown_budget = Duration::from_secs(config.server.shutdown_timeout_secs);
    let (drained_tx, drained_rx) = tokio::sync::oneshot::channel::<()>();

    let server = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        shutdown_signal().await;
        let _ = drained_tx.send(());
    });

    let server = tokio::spawn(async move { server.await });

    // Bound connection draining once a shutdown signal has arrived.
    let served = tokio::select! {
        result = server => Some(result),
        _ = async {
            let _ = drained_rx.await;
            tokio::time::sleep(shutdown_budget).await;
        } => None,
    };

    match served {
        Some(result) => result??,
        None => warn!(budget = ?shutdown_budget, "Connection draining timed out"),
    }

    jobs.shutdown();
    jobs.wait_for_shutdown(shutdown_budget).await;

    pool.close().await;
    info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining connections");
}
