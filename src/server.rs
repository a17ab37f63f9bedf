//! HTTP server initialization and runtime setup.
//!
//! Handles the storage connection, encoder self-test, expiry sweeper spawning and the
//! Axum server lifecycle.

use crate::application::services::{HostResolver, ShortenerService, run_expiry_sweeper};
use crate::config::Config;
use crate::domain::repositories::UrlRepository;
use crate::infrastructure::persistence;
use crate::routes::app_router;
use crate::state::AppState;
use crate::utils::hash_id::HashIdCodec;
use crate::utils::url_validator::UrlValidator;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// Builds the shortening service over an already connected repository.
///
/// The encoder runs its self-test before the service is returned.
///
/// # Errors
///
/// Returns an error if the hashids settings are unusable or the self-test fails.
pub fn build_service(
    config: &Config,
    repository: Arc<dyn UrlRepository>,
) -> Result<ShortenerService> {
    let codec = HashIdCodec::new(&config.hashids_salt, config.hashids_min_length)
        .context("Invalid hashids configuration")?;
    codec.self_test().context("Encoder self-test failed")?;

    Ok(ShortenerService::new(
        repository,
        codec,
        UrlValidator::new(config.allow_private_hosts),
        HostResolver::new(config.tenant.clone(), config.context_path.clone()),
        config.request_timeout(),
    ))
}

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - Storage backend (with startup retries; migrations for PostgreSQL)
/// - Shortening service and encoder self-test
/// - Background expiry sweeper (when `SWEEP_INTERVAL_SECONDS > 0`)
/// - Axum HTTP server with graceful shutdown
///
/// # Errors
///
/// Returns an error if:
/// - Storage connection fails after all retries
/// - The encoder self-test fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let repository = persistence::connect(&config).await?;
    let service = Arc::new(build_service(&config, repository)?);
    tracing::info!(backend = service.backend(), "Shortening service ready");

    let sweeper = (config.sweep_interval_seconds > 0).then(|| {
        tracing::info!("Expiry sweeper started");
        tokio::spawn(run_expiry_sweeper(
            service.clone(),
            Duration::from_secs(config.sweep_interval_seconds),
        ))
    });

    let state = AppState::new(service);
    let app = app_router(state, &config.context_path);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid LISTEN address: {}", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}{}", config.context_path);

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(sweeper) = sweeper {
        sweeper.abort();
    }
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
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

    tracing::info!("Shutdown signal received");
}
