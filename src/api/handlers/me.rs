//! Handler for the caller's own identity.

use axum::{Extension, Json};

use crate::domain::entities::VerifiedClaims;

/// Echoes the claims of the verified bearer token.
///
/// # Endpoint
///
/// `GET /api/me`
pub async fn me_handler(Extension(claims): Extension<VerifiedClaims>) -> Json<VerifiedClaims> {
    Json(claims)
}
