//! Template catalogue endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::error::Result;
use crate::metrics::TemplateMetrics;
use crate::server::AppState;
use crate::template::{
    CreateTemplateRequest, TemplateListResponse, UpdateTemplateRequest, WhatsAppTemplate,
};

/// POST /api/v1/templates - Create a new template
#[tracing::instrument(
    name = "http.create_template",
    skip(state, request),
    fields(template_id = %request.id)
)]
pub async fn create_template(
    State(state): State<AppState>,
    Json(request): Json<CreateTemplateRequest>,
) -> Result<(StatusCode, Json<WhatsAppTemplate>)> {
    let created = state.template_store.create(request.into())?;
    TemplateMetrics::set_total(state.template_store.count());

    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/v1/templates - List all templates
#[tracing::instrument(name = "http.list_templates", skip(state))]
pub async fn list_templates(State(state): State<AppState>) -> Json<TemplateListResponse> {
    let templates = state.template_store.list();
    let total = templates.len();

    Json(TemplateListResponse { templates, total })
}

/// GET /api/v1/templates/{id} - Get a specific template
#[tracing::instrument(name = "http.get_template", skip(state))]
pub async fn get_template(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<WhatsAppTemplate>> {
    Ok(Json(state.template_store.get(&id)?))
}

/// PUT /api/v1/templates/{id} - Update an existing template
#[tracing::instrument(name = "http.update_template", skip(state, request))]
pub async fn update_template(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateTemplateRequest>,
) -> Result<Json<WhatsAppTemplate>> {
    Ok(Json(state.template_store.update(&id, request)?))
}

/// DELETE /api/v1/templates/{id} - Delete a template
#[tracing::instrument(name = "http.delete_template", skip(state))]
pub async fn delete_template(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state.template_store.delete(&id)?;
    TemplateMetrics::set_total(state.template_store.count());

    Ok(StatusCode::NO_CONTENT)
}
