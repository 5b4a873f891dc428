/*
 * Responsibility
 * - The "authenticated request" context handlers see
 * - The permission middleware verifies the token and stores this in the
 *   request extensions; handlers only ever receive this type
 */

use crate::services::auth::VerifiedClaims;

/// Context attached to a request that passed the permission gate.
///
/// Holding an `AuthCtx` means the token was verified and the route's
/// permission was granted. Handlers must not re-verify.
#[derive(Debug, Clone)]
pub struct AuthCtx {
    claims: VerifiedClaims,
}

impl AuthCtx {
    pub fn new(claims: VerifiedClaims) -> Self {
        Self { claims }
    }

    pub fn claims(&self) -> &VerifiedClaims {
        &self.claims
    }

    pub fn subject(&self) -> Option<&str> {
        self.claims.subject()
    }

    pub fn permissions(&self) -> &[String] {
        self.claims.permissions().unwrap_or_default()
    }
}
