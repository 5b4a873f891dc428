//! Authorization failures surfaced by the gate.
//!
//! Every variant maps to a fixed `(status, code, description)` triple. The
//! description is the client-facing message, so it must never carry
//! verification internals (key ids, library errors, token fragments).

use axum::http::StatusCode;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Authorization header is expected.")]
    HeaderMissing,

    #[error("Authorization header must start with \"Bearer\".")]
    NotBearerScheme,

    #[error("Token not found.")]
    TokenNotFound,

    #[error("Authorization header must be bearer token.")]
    NotBearerToken,

    #[error("Authorization malformed.")]
    Malformed,

    #[error("Unable to find appropriate key")]
    KeyNotFound,

    #[error("Token expired.")]
    TokenExpired,

    #[error("Incorrect claims. Please, check the audience and issuer.")]
    IncorrectClaims,

    #[error("Unable to parse authentication token.")]
    Unparsable,

    #[error("Permissions not included in JWT.")]
    PermissionsMissing,

    #[error("Permission not found.")]
    PermissionDenied,
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::HeaderMissing
            | Self::NotBearerScheme
            | Self::TokenNotFound
            | Self::NotBearerToken
            | Self::Malformed
            | Self::KeyNotFound
            | Self::TokenExpired
            | Self::IncorrectClaims => StatusCode::UNAUTHORIZED,
            Self::Unparsable | Self::PermissionsMissing => StatusCode::BAD_REQUEST,
            Self::PermissionDenied => StatusCode::FORBIDDEN,
        }
    }

    /// Machine-readable error code (`invalid_header`, `token_expired`, ...).
    pub fn code(&self) -> &'static str {
        match self {
            Self::HeaderMissing => "authorization_header_missing",
            Self::NotBearerScheme
            | Self::TokenNotFound
            | Self::NotBearerToken
            | Self::Malformed
            | Self::KeyNotFound
            | Self::Unparsable => "invalid_header",
            Self::TokenExpired => "token_expired",
            Self::IncorrectClaims | Self::PermissionsMissing => "invalid_claims",
            Self::PermissionDenied => "unauthorized",
        }
    }

    pub fn description(&self) -> String {
        self.to_string()
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            ErrorKind::InvalidAudience | ErrorKind::InvalidIssuer | ErrorKind::ImmatureSignature => {
                AuthError::IncorrectClaims
            }
            ErrorKind::MissingRequiredClaim(claim) if claim == "aud" || claim == "iss" => {
                AuthError::IncorrectClaims
            }
            _ => AuthError::Unparsable,
        }
    }
}

/// Problems building the gate from configuration. Raised at startup, never
/// per request.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("no signing algorithm configured")]
    NoAlgorithms,

    #[error("signing algorithm {0:?} is not accepted (only RS256)")]
    UnsupportedAlgorithm(jsonwebtoken::Algorithm),

    #[error(transparent)]
    Jwks(#[from] crate::services::auth::jwks::JwksError),
}
