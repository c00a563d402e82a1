//! Stateless composer endpoints: placeholder counting, interpolation,
//! default bindings, previews and validation.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::composer::{bind_template, render_preview, validate, TemplateBindings, TemplatePreview};
use crate::error::{AppError, Result};
use crate::metrics::ComposerMetrics;
use crate::server::AppState;
use crate::template::{count_placeholders, interpolate, placeholder_indices};

#[derive(Debug, Deserialize)]
pub struct PlaceholderCountRequest {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PlaceholderCountResponse {
    pub count: usize,
    pub indices: Vec<u32>,
}

/// POST /api/v1/placeholders/count
pub async fn count_template_placeholders(
    Json(request): Json<PlaceholderCountRequest>,
) -> Json<PlaceholderCountResponse> {
    let text = request.text.as_deref();

    Json(PlaceholderCountResponse {
        count: count_placeholders(text),
        indices: placeholder_indices(text),
    })
}

#[derive(Debug, Deserialize)]
pub struct InterpolateRequest {
    pub text: String,
    #[serde(default)]
    pub replacements: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct InterpolateResponse {
    pub text: String,
}

/// POST /api/v1/interpolate
pub async fn interpolate_text(Json(request): Json<InterpolateRequest>) -> Json<InterpolateResponse> {
    Json(InterpolateResponse {
        text: interpolate(&request.text, &request.replacements),
    })
}

/// GET /api/v1/templates/{id}/bindings - Default bindings for a template
#[tracing::instrument(name = "http.template_bindings", skip(state))]
pub async fn template_bindings(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TemplateBindings>> {
    let template = state.template_store.get(&id)?;
    ComposerMetrics::record_selection();

    Ok(Json(bind_template(&template)))
}

#[derive(Debug, Default, Deserialize)]
pub struct PreviewRequest {
    #[serde(default)]
    pub bindings: Option<TemplateBindings>,
}

/// POST /api/v1/templates/{id}/preview
#[tracing::instrument(name = "http.template_preview", skip(state, request))]
pub async fn template_preview(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<PreviewRequest>,
) -> Result<Json<TemplatePreview>> {
    let template = state.template_store.get(&id)?;
    ComposerMetrics::record_preview();

    Ok(Json(render_preview(&template, request.bindings.as_ref())))
}

#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    pub bindings: TemplateBindings,
}

/// POST /api/v1/templates/{id}/validate
#[tracing::instrument(name = "http.template_validate", skip(state, request))]
pub async fn template_validate(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<ValidateRequest>,
) -> Result<StatusCode> {
    let template = state.template_store.get(&id)?;

    validate(Some(&template), Some(&request.bindings)).map_err(|e| {
        ComposerMetrics::record_validation_failure(e.code());
        AppError::from(e)
    })?;

    Ok(StatusCode::NO_CONTENT)
}
