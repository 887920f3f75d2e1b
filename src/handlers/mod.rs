//! # API Handlers
//!
//! HTTP endpoint handlers: service info and health probes here, account
//! flows in [`account`], the tenant-scoped dashboard in [`dashboard`].

pub mod account;
pub mod dashboard;
pub mod types;

use axum::{extract::State, http::StatusCode, response::Json};

use crate::db::health_check;
use crate::error::ApiError;
use crate::handlers::types::HealthResponse;
use crate::models::ServiceInfo;
use crate::server::AppState;

/// Root handler that returns basic service information
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service information", body = ServiceInfo)
    ),
    tag = "root"
)]
pub async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo::default())
}

/// Liveness probe
#[utoipa::path(
    get,
    path = "/healthz",
    responses(
        (status = 200, description = "Process is up", body = HealthResponse)
    ),
    tag = "root"
)]
pub async fn healthz() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Readiness probe; pings the database
#[utoipa::path(
    get,
    path = "/readyz",
    responses(
        (status = 200, description = "Database reachable", body = HealthResponse),
        (status = 503, description = "Database unreachable", body = ApiError)
    ),
    tag = "root"
)]
pub async fn readyz(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    health_check(&state.db).await.map_err(|e| {
        tracing::error!(error = %e, "readiness check failed");
        ApiError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "SERVICE_UNAVAILABLE",
            "Database service unavailable",
        )
    })?;

    Ok(Json(HealthResponse {
        status: "ready".to_string(),
    }))
}

#[cfg(test)]
mod tests;
