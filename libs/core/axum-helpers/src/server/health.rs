use axum::{Json, Router, routing::get};
use core_config::AppInfo;
use serde::Serialize;
use utoipa::ToSchema;

/// Liveness response reported by /health.
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub name: &'static str,
    pub version: &'static str,
}

/// Build a router exposing a liveness endpoint at /health.
///
/// Liveness answers "is the process up" only; readiness checks that touch
/// dependencies belong to the application.
pub fn health_router(info: AppInfo) -> Router {
    Router::new().route(
        "/health",
        get(move || async move {
            Json(HealthResponse {
                status: "ok",
                name: info.name,
                version: info.version,
            })
        }),
    )
}
