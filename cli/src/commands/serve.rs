// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! `caroline serve` - run the neural core daemon.
//!
//! Builds the supervisor from config, starts all background services, and
//! serves the status API until ctrl-c. The supervisor is constructed here
//! and injected; nothing in the core is a global.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use caroline_neural_core::application::ServiceSupervisor;
use caroline_neural_core::config::NeuralConfig;
use caroline_neural_core::presentation::app;

pub async fn run(config_path: Option<&Path>, host: &str, port: u16) -> Result<()> {
    let config = NeuralConfig::load(config_path)?;

    let supervisor = Arc::new(ServiceSupervisor::new(&config));
    supervisor.start_all(ServiceSupervisor::default_sources(&config));

    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind status API to {addr}"))?;
    info!(%addr, "status API listening");

    let router = app(Arc::clone(&supervisor));
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Status API server failed")?;

    supervisor.shutdown().await;
    info!("caroline stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c");
    }
    info!("shutdown signal received");
}
