use std::sync::Arc;

use anyhow::Result;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::broadcast;

use wautopilot_composer::config::Settings;
use wautopilot_composer::metrics::TemplateMetrics;
use wautopilot_composer::server::{create_app, AppState};
use wautopilot_composer::tasks::SessionReaperTask;
use wautopilot_composer::telemetry::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration (it decides the log format)
    let settings = Settings::new()?;
    init_tracing(&settings.logging);
    tracing::info!("Configuration loaded");

    let state = AppState::new(settings.clone());

    if let Some(path) = &settings.templates.seed_path {
        let added = state.template_store.load_seed(path)?;
        tracing::info!(path = %path, added, "Seed templates loaded");
    }
    TemplateMetrics::set_total(state.template_store.count());
    tracing::info!("Application state initialized");

    let (shutdown_tx, _) = broadcast::channel::<()>(1);

    // Start idle session reaper in background
    let reaper = SessionReaperTask::new(
        settings.sessions.clone(),
        Arc::clone(&state.sessions),
        shutdown_tx.subscribe(),
    );
    let reaper_handle = tokio::spawn(reaper.run());

    let app = create_app(state);

    let addr = settings.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal_handler(shutdown_tx))
        .await?;

    tracing::info!("Waiting for background tasks to finish...");
    let _ = reaper_handle.await;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal_handler(shutdown_tx: broadcast::Sender<()>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown");
        }
    }

    // Stop background tasks
    let _ = shutdown_tx.send(());
}
