//! Require a permission before a route's handler runs.
//!
//! The guard runs the full gate (bearer extraction, token verification,
//! permission check). On success the verified claims are stored in the
//! request extensions as [`AuthCtx`]; on failure the request never reaches
//! the handler and the client gets the `AppError` body.
//!
//! ```ignore
//! let movies = Router::new().route("/movies", get(list_movies));
//! let movies = middleware::auth::require(movies, state.gate.clone(), "get:movies");
//! ```

use std::sync::Arc;

use axum::{
    Router,
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
};
use tracing::warn;

use crate::api::v1::extractors::AuthCtx;
use crate::error::AppError;
use crate::services::auth::AuthorizationGate;

#[derive(Clone)]
struct PermissionGuard {
    gate: Arc<AuthorizationGate>,
    permission: &'static str,
}

/// Gate every route of `router` on `permission`.
///
/// Uses `route_layer`, so unmatched paths still fall through to the 404
/// fallback instead of answering 401.
pub fn require<S>(router: Router<S>, gate: Arc<AuthorizationGate>, permission: &'static str) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    // axum 0.8: the guard's state is independent of the router's state.
    router.route_layer(middleware::from_fn_with_state(
        PermissionGuard { gate, permission },
        guard,
    ))
}

async fn guard(
    State(guard): State<PermissionGuard>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let claims = match guard
        .gate
        .authorize_headers(guard.permission, req.headers())
        .await
    {
        Ok(claims) => claims,
        Err(err) => {
            warn!(
                permission = guard.permission,
                method = %req.method(),
                path = req.uri().path(),
                code = err.code(),
                "request rejected by permission gate"
            );
            return Err(err.into());
        }
    };

    req.extensions_mut().insert(AuthCtx::new(claims));
    Ok(next.run(req).await)
}
