//! Health check endpoint.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::error::Result;
use crate::media::MediaKind;
use crate::server::AppState;
use crate::template::VariablePolicy;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub templates: usize,
    pub documents: usize,
    pub images: usize,
    pub films: usize,
    pub variable_policy: VariablePolicy,
}

pub async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>> {
    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        templates: state.repository.count(),
        documents: state.media.count(MediaKind::Document),
        images: state.media.count(MediaKind::Image),
        films: state.media.count(MediaKind::Film),
        variable_policy: state.renderer.policy(),
    }))
}
