use axum::{
    routing::{get, patch, post, put},
    Router,
};

use crate::server::AppState;

use super::composer::{
    count_template_placeholders, interpolate_text, template_bindings, template_preview,
    template_validate,
};
use super::health::health;
use super::metrics::prometheus_metrics;
use super::session::{
    close_session, edit_bindings, get_session, open_session, select_template, session_preview,
    set_session_target, submit_session,
};
use super::template::{
    create_template, delete_template, get_template, list_templates, update_template,
};

pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health & Metrics
        .route("/health", get(health))
        .route("/metrics", get(prometheus_metrics))
        .nest(
            "/api/v1",
            Router::new()
                // Template catalogue
                .route("/templates", post(create_template).get(list_templates))
                .route(
                    "/templates/{id}",
                    get(get_template).put(update_template).delete(delete_template),
                )
                .route("/templates/{id}/bindings", get(template_bindings))
                .route("/templates/{id}/preview", post(template_preview))
                .route("/templates/{id}/validate", post(template_validate))
                // Stateless helpers
                .route("/placeholders/count", post(count_template_placeholders))
                .route("/interpolate", post(interpolate_text))
                // Composer sessions
                .route("/sessions", post(open_session))
                .route("/sessions/{id}", get(get_session).delete(close_session))
                .route("/sessions/{id}/target", put(set_session_target))
                .route("/sessions/{id}/template", put(select_template))
                .route("/sessions/{id}/bindings", patch(edit_bindings))
                .route("/sessions/{id}/preview", get(session_preview))
                .route("/sessions/{id}/submit", post(submit_session)),
        )
}
