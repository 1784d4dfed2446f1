use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};

use super::AppState;
use crate::auth::Claims;
use crate::error::AppError;

/// Extract bearer token from Authorization header
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

/// The authenticated application behind a request.
///
/// Rejects with 401 when the bearer token is missing or invalid.
#[derive(Debug, Clone)]
pub struct AuthenticatedCaller(pub Claims);

impl FromRequestParts<AppState> for AuthenticatedCaller {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = extract_bearer_token(&parts.headers) else {
            tracing::warn!("Missing bearer token");
            return Err(AppError::Auth("Missing bearer token".to_string()));
        };

        let claims = state.jwt_validator.validate(token)?;
        Ok(Self(claims))
    }
}
