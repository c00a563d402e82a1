use axum::{extract::DefaultBodyLimit, http::HeaderValue, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::api::api_routes;

use super::AppState;

pub fn create_app(state: AppState) -> Router {
    let body_limit = state.settings.server.body_limit;

    Router::new()
        .merge(api_routes())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.settings.server.cors_origins))
        .with_state(state)
}

/// Any origin when none are configured, otherwise only the listed ones
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    layer.allow_origin(allowed)
}
