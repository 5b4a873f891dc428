/*
 * Responsibility
 * - Shared context attached to the Router (AppState)
 *   - gate: the process-wide AuthorizationGate (owns the JWKS cache)
 * - Cloned per request, so everything inside is behind Arc
 */
use std::sync::Arc;

use crate::services::auth::AuthorizationGate;

#[derive(Clone, Debug)]
pub struct AppState {
    pub gate: Arc<AuthorizationGate>,
}

impl AppState {
    pub fn new(gate: Arc<AuthorizationGate>) -> Self {
        Self { gate }
    }
}
