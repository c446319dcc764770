//! Handler for health check endpoint.

use std::collections::BTreeMap;

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::health::{CheckStatus, HealthResponse};
use crate::infrastructure::connection::{ConnectionState, DependencyStatus};
use crate::state::AppState;

/// Returns service health status with component checks.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response Codes
///
/// - **200 OK**: All components healthy
/// - **503 Service Unavailable**: One or more components degraded
///
/// # Components Checked
///
/// 1. **Supervised dependencies**: connection state of each (must be `ready`)
/// 2. **Cache**: PING through the cache store
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "checks": {
///     "cache": { "status": "ok", "message": "Cache store reachable" },
///     "postgres": { "status": "ok", "connection": { "state": "ready" } }
///   }
/// }
/// ```
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let mut checks = BTreeMap::new();

    for dependency in &state.dependencies {
        checks.insert(
            dependency.dependency().to_string(),
            check_dependency(dependency.as_ref()),
        );
    }

    checks.insert("cache".to_string(), check_cache(&state).await);

    let all_healthy = checks.values().all(CheckStatus::is_ok);

    let response = HealthResponse {
        status: if all_healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks,
    };

    if all_healthy {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

fn check_dependency(dependency: &dyn DependencyStatus) -> CheckStatus {
    let state = dependency.state();

    CheckStatus {
        status: if state == ConnectionState::Ready { "ok" } else { "error" }.to_string(),
        connection: Some(state),
        message: None,
    }
}

/// Checks cache connectivity via PING command.
async fn check_cache(state: &AppState) -> CheckStatus {
    if state.cache.store().health_check().await {
        CheckStatus::ok("Cache store reachable")
    } else {
        CheckStatus::error("Cache store unreachable")
    }
}
