// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Webhook server command
//!
//! Loads the config, wires the catalogs into the admission use case and
//! serves the AdmissionReview endpoint until SIGINT/SIGTERM.

use anyhow::{Context, Result};
use clap::Args;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use poolguard_core::application::create_catalogs;
use poolguard_core::domain::webhook_config::WebhookConfigManifest;
use poolguard_core::presentation::api::{app, AppState};

#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Listen port (overrides spec.server.port)
    #[arg(long)]
    pub port: Option<u16>,

    /// Bind address (overrides spec.server.bind_address)
    #[arg(long)]
    pub bind: Option<String>,
}

pub async fn execute(args: ServeArgs, config_path: Option<PathBuf>) -> Result<()> {
    let mut config = WebhookConfigManifest::load_or_default(config_path)
        .context("Failed to load configuration")?;
    if let Some(port) = args.port {
        config.spec.server.port = port;
    }
    if let Some(bind) = args.bind {
        config.spec.server.bind_address = bind;
    }
    config
        .validate()
        .context("Configuration validation failed")?;

    info!(name = %config.metadata.name, "Configuration loaded");

    let metrics = &config.spec.observability.metrics;
    if metrics.enabled {
        install_metrics_exporter(metrics.port)?;
    }

    let catalogs = create_catalogs(&config.spec.catalog)
        .context("Failed to initialize catalogs")?;

    let shutdown = CancellationToken::new();
    let router = app(AppState {
        admission: Arc::new(catalogs.into_admission()),
        request_timeout: config.spec.server.request_timeout(),
        shutdown: shutdown.clone(),
    });

    let addr = format!(
        "{}:{}",
        config.spec.server.bind_address, config.spec.server.port
    );
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("Webhook listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await
        .context("HTTP server failed")?;

    info!("Webhook shut down");

    Ok(())
}

fn install_metrics_exporter(port: u16) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .context("Failed to install Prometheus exporter")?;
    info!("Prometheus metrics exposed on {}", addr);
    Ok(())
}

/// Resolves on SIGINT/SIGTERM and cancels `token` so in-flight reviews deny
/// instead of waiting out their deadline.
async fn shutdown_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }

    token.cancel();
}
