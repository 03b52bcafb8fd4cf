//! # Forward-Auth HTTP Server
//!
//! Serves static token reviews for reverse proxies doing external
//! authentication, plus an internal server with metrics and health check.
//!
//! See `ingress-authz-server --help` for flags; each flag can also be set
//! through its `INGRESS_AUTHZ_*` environment variable. `RUST_LOG` overrides
//! the log level.

use anyhow::{Context, Result};
use clap::Parser;
use ingress_authz::{
    config::ServerConfig,
    http::{auth_router, internal_router},
    AuthzEngine, PrometheusRecorder,
};
use prometheus::Registry;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Graceful shutdown handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            info!("Received SIGTERM signal");
        }
    }

    info!("Starting graceful shutdown, draining connections...");
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = ServerConfig::parse();

    let log_level = if config.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!(version = ingress_authz::VERSION, "Starting ingress-authz server");

    let registry = Registry::new();
    let recorder = Arc::new(
        PrometheusRecorder::new(&registry).context("could not register metrics")?,
    );

    let store = config
        .load_token_store()
        .context("could not create memory token repository")?;
    let engine = Arc::new(AuthzEngine::new(Arc::new(store), recorder.clone()));

    let app = auth_router(
        &config.authentication_path,
        engine,
        config.client_id_header.clone(),
        recorder,
    );
    let internal_app = internal_router(&config.metrics_path, &config.health_check_path, registry);

    let listener = tokio::net::TcpListener::bind(config.listen_address)
        .await
        .with_context(|| format!("could not bind HTTP server on {}", config.listen_address))?;
    let internal_listener = tokio::net::TcpListener::bind(config.internal_listen_address)
        .await
        .with_context(|| {
            format!("could not bind internal server on {}", config.internal_listen_address)
        })?;

    info!(addr = %config.listen_address, path = %config.authentication_path, "HTTP server listening for requests");
    info!(
        addr = %config.internal_listen_address,
        metrics = %config.metrics_path,
        health_check = %config.health_check_path,
        "Internal server listening for requests"
    );

    let server = axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal());
    let internal_server = axum::serve(internal_listener, internal_app.into_make_service())
        .with_graceful_shutdown(shutdown_signal());

    tokio::try_join!(
        async { server.await.context("HTTP server error") },
        async { internal_server.await.context("internal server error") },
    )?;

    info!("Connections drained");

    Ok(())
}
