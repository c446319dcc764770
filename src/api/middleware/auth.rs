//! Bearer token authentication middleware.

use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::Response,
};
use axum_auth::AuthBearer;
use serde_json::json;
use tracing::{debug, error};

use crate::{error::AppError, state::AppState};

/// Authenticates requests using Bearer tokens from Authorization header.
///
/// # Header Format
///
/// ```text
/// Authorization: Bearer <token>
/// ```
///
/// # Authentication Flow
///
/// 1. Extract token from `Authorization` header
/// 2. Verify it with [`crate::application::services::TokenVerifier`]
/// 3. Insert the resulting [`crate::domain::entities::VerifiedClaims`] into request extensions
/// 4. Continue to next middleware/handler
///
/// # Errors
///
/// Every rejection is the same `401 Unauthorized` with a
/// `WWW-Authenticate: Bearer` header. The cause is only logged: at `error`
/// when the key set could not be obtained, at `debug` otherwise.
pub async fn layer(
    State(st): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let token = AuthBearer::from_request_parts(&mut parts, &())
        .await
        .ok()
        .map(|AuthBearer(token)| token);

    let claims = st.verifier.verify(token.as_deref()).await.map_err(|e| {
        if e.is_operational() {
            error!("Token verification failed: {}", e);
        } else {
            debug!("Token rejected ({}): {}", e.kind(), e);
        }
        AppError::unauthorized("Unauthorized", json!({}))
    })?;

    let mut req = Request::from_parts(parts, body);
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}
