use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::composer::{BindingError, SessionError, ValidationError};
use crate::template::TemplateError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Binding(#[from] BindingError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Session(SessionError),
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        // Flatten wrapped domain errors so they map to their own status codes
        match err {
            SessionError::Template(e) => AppError::Template(e),
            SessionError::Binding(e) => AppError::Binding(e),
            SessionError::Validation(e) => AppError::Validation(e),
            other => AppError::Session(other),
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Serialize)]
struct ErrorBody {
    code: String,
    message: String,
}

/// Check if running in production mode (based on RUN_MODE env var)
fn is_production() -> bool {
    std::env::var("RUN_MODE")
        .map(|m| m == "production" || m == "prod")
        .unwrap_or(false)
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Template(e) => match e {
                TemplateError::NotFound(_) => (StatusCode::NOT_FOUND, "TEMPLATE_NOT_FOUND"),
                TemplateError::AlreadyExists(_) => (StatusCode::CONFLICT, "TEMPLATE_EXISTS"),
                TemplateError::InvalidId(_) => (StatusCode::BAD_REQUEST, "INVALID_ID"),
                TemplateError::InvalidTemplate(_) => (StatusCode::BAD_REQUEST, "INVALID_TEMPLATE"),
                TemplateError::Io(_) | TemplateError::Parse(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "TEMPLATE_SEED_ERROR")
                }
            },
            AppError::Binding(_) => (StatusCode::BAD_REQUEST, "INVALID_BINDING_EDIT"),
            AppError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            AppError::Session(e) => match e {
                SessionError::NotFound(_) => (StatusCode::NOT_FOUND, "SESSION_NOT_FOUND"),
                SessionError::CapacityExceeded(_) => {
                    (StatusCode::SERVICE_UNAVAILABLE, "SESSION_LIMIT")
                }
                SessionError::NoTemplateSelected => (StatusCode::CONFLICT, "NO_TEMPLATE_SELECTED"),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let log_message = self.to_string();

        // Validation failures carry their own stable code for the client
        let code = match &self {
            AppError::Validation(e) => e.code().to_uppercase(),
            _ => code.to_string(),
        };

        let client_message = if status.is_server_error() && is_production() {
            "Internal server error".to_string()
        } else {
            log_message.clone()
        };

        if status.is_server_error() {
            tracing::error!(
                code = %code,
                status = %status.as_u16(),
                message = %log_message,
                "API error"
            );
        } else {
            tracing::debug!(
                code = %code,
                status = %status.as_u16(),
                message = %log_message,
                "Request rejected"
            );
        }

        let body = ErrorResponse {
            error: ErrorBody {
                code,
                message: client_message,
            },
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
