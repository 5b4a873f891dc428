/*
 * Responsibility
 * - v1 URL layout
 * - /authorize/{permission}: the gate as a forward-auth endpoint
 */
use axum::{Router, routing::get};

use crate::api::v1::handlers::authorize::authorize;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/authorize/{permission}", get(authorize))
}
