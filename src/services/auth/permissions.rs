use crate::services::auth::claims::VerifiedClaims;
use crate::services::auth::error::AuthError;

/// Exact, case-sensitive membership of `required` in the `permissions` claim.
///
/// A token without the claim is a different failure (400) from a token whose
/// claim simply lacks the permission (403).
pub fn check_permission(claims: &VerifiedClaims, required: &str) -> Result<(), AuthError> {
    let granted = claims.permissions().ok_or(AuthError::PermissionsMissing)?;

    if granted.iter().any(|p| p == required) {
        Ok(())
    } else {
        Err(AuthError::PermissionDenied)
    }
}
