use axum::http::HeaderMap;
use tracing::debug;

use crate::services::auth::bearer::{extract_bearer, extract_bearer_from_headers};
use crate::services::auth::claims::VerifiedClaims;
use crate::services::auth::error::AuthError;
use crate::services::auth::permissions::check_permission;
use crate::services::auth::verifier::TokenVerifier;

/// Extract, verify, check. Stops at the first failure, so a malformed header
/// never triggers a key fetch and a bad token never reaches the permission check.
#[derive(Debug)]
pub struct AuthorizationGate {
    verifier: TokenVerifier,
}

impl AuthorizationGate {
    pub fn new(verifier: TokenVerifier) -> Self {
        Self { verifier }
    }

    pub async fn authorize(
        &self,
        required: &str,
        authorization: Option<&str>,
    ) -> Result<VerifiedClaims, AuthError> {
        let token = extract_bearer(authorization)?;
        self.check(required, token).await
    }

    pub async fn authorize_headers(
        &self,
        required: &str,
        headers: &HeaderMap,
    ) -> Result<VerifiedClaims, AuthError> {
        let token = extract_bearer_from_headers(headers)?;
        self.check(required, token).await
    }

    async fn check(&self, required: &str, token: &str) -> Result<VerifiedClaims, AuthError> {
        let claims = self.verifier.verify(token).await?;
        check_permission(&claims, required)?;

        debug!(permission = required, sub = claims.subject(), "authorized");
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{
        MemoryJwksFetcher, primary_jwk, sign_primary, standard_claims, test_gate,
    };
    use axum::http::{HeaderValue, header};

    fn bearer(token: &str) -> String {
        format!("Bearer {token}")
    }

    #[tokio::test]
    async fn header_errors_skip_the_key_fetch() {
        let fetcher = MemoryJwksFetcher::new(vec![primary_jwk()]);
        let gate = test_gate(&fetcher);

        let cases = [
            (None, AuthError::HeaderMissing),
            (Some("Basic abc"), AuthError::NotBearerScheme),
            (Some("Bearer"), AuthError::TokenNotFound),
            (Some("Bearer a b"), AuthError::NotBearerToken),
            (Some("Bearer not-a-jwt"), AuthError::Malformed),
        ];
        for (header, expected) in cases {
            assert_eq!(gate.authorize("get:movies", header).await, Err(expected));
        }

        assert_eq!(fetcher.fetch_count(), 0);
    }

    #[tokio::test]
    async fn granted_permission_returns_claims() {
        let fetcher = MemoryJwksFetcher::new(vec![primary_jwk()]);
        let gate = test_gate(&fetcher);
        let token = sign_primary(&standard_claims(&["get:movies", "get:actors"]));

        let claims = gate
            .authorize("get:actors", Some(&bearer(&token)))
            .await
            .expect("authorized");

        assert!(claims.has_permission("get:actors"));
    }

    #[tokio::test]
    async fn verified_token_without_permission_is_forbidden() {
        let fetcher = MemoryJwksFetcher::new(vec![primary_jwk()]);
        let gate = test_gate(&fetcher);
        let token = sign_primary(&standard_claims(&["get:movies"]));

        assert_eq!(
            gate.authorize("delete:movies", Some(&bearer(&token))).await,
            Err(AuthError::PermissionDenied)
        );
    }

    #[tokio::test]
    async fn token_without_permissions_claim() {
        let fetcher = MemoryJwksFetcher::new(vec![primary_jwk()]);
        let gate = test_gate(&fetcher);
        let mut claims = standard_claims(&[]);
        claims.as_object_mut().expect("object").remove("permissions");
        let token = sign_primary(&claims);

        assert_eq!(
            gate.authorize("get:movies", Some(&bearer(&token))).await,
            Err(AuthError::PermissionsMissing)
        );
    }

    #[tokio::test]
    async fn header_map_entry_point_matches_string_entry_point() {
        let fetcher = MemoryJwksFetcher::new(vec![primary_jwk()]);
        let gate = test_gate(&fetcher);
        let token = sign_primary(&standard_claims(&["get:movies"]));

        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&bearer(&token)).expect("header value"),
        );

        let from_headers = gate
            .authorize_headers("get:movies", &headers)
            .await
            .expect("authorized");
        let from_str = gate
            .authorize("get:movies", Some(&bearer(&token)))
            .await
            .expect("authorized");
        assert_eq!(from_headers, from_str);

        assert_eq!(
            gate.authorize_headers("get:movies", &HeaderMap::new()).await,
            Err(AuthError::HeaderMissing)
        );
    }
}
