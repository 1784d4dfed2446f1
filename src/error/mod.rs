use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::resource::{FieldViolation, StoreError};
use crate::template::TemplateError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// The request could not be extracted (body, path or query)
    #[error("{message}")]
    Request {
        status: StatusCode,
        code: &'static str,
        message: String,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Serialize)]
struct ErrorBody {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    violations: Vec<FieldViolation>,
}

/// Check if running in production mode (based on RUN_MODE env var)
fn is_production() -> bool {
    std::env::var("RUN_MODE")
        .map(|m| m == "production" || m == "prod")
        .unwrap_or(false)
}

fn hide_in_production(detail: String, generic: &str) -> String {
    if is_production() {
        generic.to_string()
    } else {
        detail
    }
}

impl AppError {
    /// HTTP status and stable error code for this error
    pub fn classify(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR"),
            AppError::Auth(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            AppError::Template(err) => match err {
                TemplateError::NotFound(_) => (StatusCode::NOT_FOUND, "TEMPLATE_NOT_FOUND"),
                TemplateError::VersionNotFound { .. } => {
                    (StatusCode::NOT_FOUND, "VERSION_NOT_FOUND")
                }
                TemplateError::Syntax { .. } => (StatusCode::BAD_REQUEST, "TEMPLATE_SYNTAX_ERROR"),
                TemplateError::InvalidVariables(_) => {
                    (StatusCode::BAD_REQUEST, "INVALID_VARIABLES")
                }
                TemplateError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
                TemplateError::Serialization(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
                }
            },
            AppError::Store(err) => match err {
                StoreError::NotFound { .. } => (StatusCode::NOT_FOUND, "RESOURCE_NOT_FOUND"),
                StoreError::VersionNotFound { .. } => (StatusCode::NOT_FOUND, "VERSION_NOT_FOUND"),
                StoreError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
                StoreError::Serialization(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
                }
            },
            AppError::Request { status, code, .. } => (*status, *code),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        let code = match &rejection {
            JsonRejection::MissingJsonContentType(_) => "UNSUPPORTED_MEDIA_TYPE",
            _ => "INVALID_BODY",
        };
        AppError::Request {
            status: rejection.status(),
            code,
            message: rejection.body_text(),
        }
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Request {
            status: rejection.status(),
            code: "INVALID_PATH",
            message: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Request {
            status: rejection.status(),
            code: "INVALID_QUERY",
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.classify();
        let log_message = self.to_string();

        let (client_message, violations) = match self {
            AppError::Config(_) => (
                hide_in_production(log_message.clone(), "Configuration error"),
                Vec::new(),
            ),
            AppError::Internal(_)
            | AppError::Template(TemplateError::Serialization(_))
            | AppError::Store(StoreError::Serialization(_)) => (
                hide_in_production(log_message.clone(), "Internal server error"),
                Vec::new(),
            ),
            AppError::Template(TemplateError::Validation(violations))
            | AppError::Store(StoreError::Validation(violations)) => {
                (log_message.clone(), violations)
            }
            _ => (log_message.clone(), Vec::new()),
        };

        // Always log the detailed error server-side
        if status.is_server_error() {
            tracing::error!(
                code = %code,
                status = %status.as_u16(),
                message = %log_message,
                "API error"
            );
        } else {
            tracing::warn!(
                code = %code,
                status = %status.as_u16(),
                message = %log_message,
                "API error"
            );
        }

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message: client_message,
                violations,
            },
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
