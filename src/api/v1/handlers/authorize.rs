/*
 * Responsibility
 * - GET /api/v1/authorize/{permission}
 * - Forward-auth endpoint: a reverse proxy (or another service) forwards the
 *   caller's Authorization header and gets a yes/no with the verified claims
 */
use axum::{
    Json,
    extract::{Path, State},
    http::HeaderMap,
};
use serde::Serialize;
use tracing::warn;

use crate::error::AppError;
use crate::services::auth::VerifiedClaims;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct AuthorizeResponse {
    pub success: bool,
    pub permission: String,
    pub claims: VerifiedClaims,
}

pub async fn authorize(
    State(state): State<AppState>,
    Path(permission): Path<String>,
    headers: HeaderMap,
) -> Result<Json<AuthorizeResponse>, AppError> {
    let claims = state
        .gate
        .authorize_headers(&permission, &headers)
        .await
        .inspect_err(|err| {
            warn!(
                permission = %permission,
                code = err.code(),
                status = err.status().as_u16(),
                "authorization denied"
            );
        })?;

    Ok(Json(AuthorizeResponse {
        success: true,
        permission,
        claims,
    }))
}
