//! `Authorization: Bearer <token>` parsing.
//!
//! Only the shape of the header is checked here; the token itself is handed
//! on verbatim and decoded by the verifier.

use axum::http::{HeaderMap, header};

use crate::services::auth::error::AuthError;

/// Extract the compact token from a raw `Authorization` header value.
///
/// An empty header counts as missing.
pub fn extract_bearer(header: Option<&str>) -> Result<&str, AuthError> {
    let raw = match header {
        Some(value) if !value.trim().is_empty() => value,
        _ => return Err(AuthError::HeaderMissing),
    };

    let mut parts = raw.split_whitespace();
    let scheme = parts.next().ok_or(AuthError::HeaderMissing)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::NotBearerScheme);
    }

    let token = parts.next().ok_or(AuthError::TokenNotFound)?;
    if parts.next().is_some() {
        return Err(AuthError::NotBearerToken);
    }

    Ok(token)
}

/// Same as [`extract_bearer`], reading the header from a request.
pub fn extract_bearer_from_headers(headers: &HeaderMap) -> Result<&str, AuthError> {
    match headers.get(header::AUTHORIZATION) {
        None => extract_bearer(None),
        Some(value) => {
            let value = value.to_str().map_err(|_| AuthError::NotBearerScheme)?;
            extract_bearer(Some(value))
        }
    }
}
