/// Factory: build the `AuthorizationGate` from application `Config`.
use std::sync::Arc;

use crate::config::Config;
use crate::services::auth::error::SetupError;
use crate::services::auth::jwks::{HttpJwksFetcher, JwksCache};
use crate::services::auth::{AuthorizationGate, TokenVerifier, VerifierSettings};

pub fn build_gate(config: &Config) -> Result<Arc<AuthorizationGate>, SetupError> {
    let fetcher = HttpJwksFetcher::new(config.jwks_url.clone(), config.jwks_timeout)?;
    let keys = Arc::new(JwksCache::new(
        Arc::new(fetcher),
        config.jwks_cache_policy(),
    ));

    let verifier = TokenVerifier::new(
        keys,
        VerifierSettings {
            issuer: config.issuer(),
            audience: config.auth_audience.clone(),
            algorithms: config.algorithms.clone(),
            leeway_seconds: config.leeway_seconds,
        },
    )?;

    Ok(Arc::new(AuthorizationGate::new(verifier)))
}
