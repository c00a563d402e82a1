//! Composer session endpoints, one session per open compose dialog.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::composer::{BindingEdit, ComposeTarget, ComposedRequest, ComposerSession, TemplatePreview};
use crate::error::Result;
use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct OpenSessionRequest {
    pub target: ComposeTarget,
}

/// POST /api/v1/sessions - Open a composer session
#[tracing::instrument(name = "http.open_session", skip(state, request))]
pub async fn open_session(
    State(state): State<AppState>,
    Json(request): Json<OpenSessionRequest>,
) -> Result<(StatusCode, Json<ComposerSession>)> {
    let session = state.sessions.open(request.target)?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// GET /api/v1/sessions/{id}
#[tracing::instrument(name = "http.get_session", skip(state))]
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ComposerSession>> {
    Ok(Json(state.sessions.get(id)?))
}

/// DELETE /api/v1/sessions/{id} - Close the dialog, discarding its state
#[tracing::instrument(name = "http.close_session", skip(state))]
pub async fn close_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.sessions.close(id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/sessions/{id}/target
#[tracing::instrument(name = "http.set_session_target", skip(state, request))]
pub async fn set_session_target(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<OpenSessionRequest>,
) -> Result<Json<ComposerSession>> {
    Ok(Json(state.sessions.set_target(id, request.target)?))
}

#[derive(Debug, Deserialize)]
pub struct SelectTemplateRequest {
    pub template_id: String,
}

/// PUT /api/v1/sessions/{id}/template - Select a template, resetting bindings
#[tracing::instrument(
    name = "http.select_template",
    skip(state, request),
    fields(template_id = %request.template_id)
)]
pub async fn select_template(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SelectTemplateRequest>,
) -> Result<Json<ComposerSession>> {
    Ok(Json(state.sessions.select_template(id, &request.template_id)?))
}

#[derive(Debug, Deserialize)]
pub struct EditBindingsRequest {
    pub edits: Vec<BindingEdit>,
}

/// PATCH /api/v1/sessions/{id}/bindings - Apply edits all-or-nothing
#[tracing::instrument(
    name = "http.edit_bindings",
    skip(state, request),
    fields(edits = request.edits.len())
)]
pub async fn edit_bindings(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<EditBindingsRequest>,
) -> Result<Json<ComposerSession>> {
    Ok(Json(state.sessions.apply_edits(id, request.edits)?))
}

/// GET /api/v1/sessions/{id}/preview
#[tracing::instrument(name = "http.session_preview", skip(state))]
pub async fn session_preview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TemplatePreview>> {
    Ok(Json(state.sessions.preview(id)?))
}

/// POST /api/v1/sessions/{id}/submit - Validate and compose the message
#[tracing::instrument(name = "http.submit_session", skip(state))]
pub async fn submit_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ComposedRequest>> {
    Ok(Json(state.sessions.submit(id)?))
}
