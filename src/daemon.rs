use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Local;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::Config;
use crate::gemini::GeminiBackend;
use crate::models::Selection;
use crate::orchestrator::Orchestrator;
use crate::server;

pub async fn run(config: Config) -> Result<()> {
    let backend = Arc::new(GeminiBackend::from_config(&config.gemini).context("creating Gemini backend")?);
    info!(model = %config.gemini.model, "Gemini backend ready");

    let default_language = config.default_language();
    let orchestrator = Orchestrator::new(backend);

    // Startup selection: today in the configured language.
    let startup = orchestrator.set_selection(Selection::new(Local::now().date_naive(), default_language));
    info!(generation = startup.generation, language = %default_language, "startup selection issued");

    let cancel = CancellationToken::new();

    let router = server::build_router(server::AppState {
        orchestrator: orchestrator.clone(),
        default_language,
    });
    let listener = tokio::net::TcpListener::bind(&config.palabra.listen)
        .await
        .with_context(|| format!("binding to {}", config.palabra.listen))?;

    info!(listen = %config.palabra.listen, "HTTP server listening");

    let server_cancel = cancel.clone();
    let server_handle = tokio::spawn(async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                server_cancel.cancelled().await;
            })
            .await
    });

    wait_for_shutdown().await?;
    info!("shutdown signal received");

    cancel.cancel();

    // In-flight content requests are not cancelled; their results are simply dropped with the runtime.
    let shutdown_timeout = std::time::Duration::from_secs(10);
    let _ = tokio::time::timeout(shutdown_timeout, server_handle).await;

    info!("shutdown complete");
    Ok(())
}

async fn wait_for_shutdown() -> Result<()> {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .context("registering SIGTERM handler")?;
        tokio::select! {
            _ = ctrl_c => {},
            _ = sigterm.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
    }

    Ok(())
}
