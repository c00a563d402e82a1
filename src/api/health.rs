//! Health check and statistics endpoints.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::server::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub templates: usize,
    pub sessions: SessionHealthResponse,
}

#[derive(Debug, Serialize)]
pub struct SessionHealthResponse {
    pub active: usize,
    pub limit: usize,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let active = state.sessions.count();
    let limit = state.settings.sessions.max_sessions;

    // Full session table means new dialogs are being turned away
    let status = if active >= limit { "degraded" } else { "healthy" };

    Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        templates: state.template_store.count(),
        sessions: SessionHealthResponse { active, limit },
    })
}
