use std::time::Duration;

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use openskip_engine::archival::{self, SweepConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "openskip_worker=debug,openskip_engine=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let pool = openskip_db::create_pool(&database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connection pool created");

    openskip_db::health_check(&pool)
        .await
        .context("Database health check failed")?;
    tracing::info!("Database health check passed");

    openskip_db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database migrations applied");

    // --- Archival sweep ---
    let config = SweepConfig::from_env();
    let cancel = CancellationToken::new();
    let sweep_handle = tokio::spawn(archival::run(pool.clone(), config, cancel.clone()));

    // --- Shutdown ---
    shutdown_signal().await;
    tracing::info!("Shutting down");

    cancel.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(5), sweep_handle).await;
    pool.close().await;

    tracing::info!("Graceful shutdown complete");
    Ok(())
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the worker shuts
/// down cleanly whether stopped interactively or by a process manager.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
