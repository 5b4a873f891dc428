use std::sync::Arc;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use jsonwebtoken::{Algorithm, Validation};
use serde::Deserialize;
use tracing::debug;

use crate::services::auth::claims::{TokenPayload, VerifiedClaims};
use crate::services::auth::error::{AuthError, SetupError};
use crate::services::auth::jwks::JwksCache;

#[derive(Debug, Clone)]
pub struct VerifierSettings {
    // Expected `iss`, e.g. `https://tenant.auth0.com/`.
    pub issuer: String,
    pub audience: String,
    pub algorithms: Vec<Algorithm>,
    pub leeway_seconds: u64,
}

// Unverified JOSE header. `alg` stays a plain string so that names the
// library does not know (`none`, ...) still reach the algorithm check.
#[derive(Debug, Deserialize)]
struct UnverifiedHeader {
    alg: String,
    #[serde(default)]
    kid: Option<String>,
}

impl UnverifiedHeader {
    fn read(token: &str) -> Option<Self> {
        let mut segments = token.split('.');
        let (Some(header), Some(_), Some(_), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return None;
        };

        let bytes = URL_SAFE_NO_PAD.decode(header).ok()?;
        serde_json::from_slice(&bytes).ok()
    }
}

/// RS256 access-token verifier backed by the provider's JWKS.
#[derive(Debug)]
pub struct TokenVerifier {
    keys: Arc<JwksCache>,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(keys: Arc<JwksCache>, settings: VerifierSettings) -> Result<Self, SetupError> {
        if settings.algorithms.is_empty() {
            return Err(SetupError::NoAlgorithms);
        }
        if let Some(alg) = settings
            .algorithms
            .iter()
            .find(|alg| **alg != Algorithm::RS256)
        {
            return Err(SetupError::UnsupportedAlgorithm(*alg));
        }

        let mut validation = Validation::new(Algorithm::RS256);
        validation.algorithms = settings.algorithms;
        validation.set_issuer(&[settings.issuer]);
        validation.set_audience(&[settings.audience]);
        validation.set_required_spec_claims(&["exp", "aud", "iss"]);
        validation.validate_nbf = true;
        validation.leeway = settings.leeway_seconds;

        Ok(Self { keys, validation })
    }

    /// Verify signature and standard claims, then hand back the payload.
    ///
    /// Order matters: the header is read without trusting it, the key is
    /// resolved by `kid`, and only then is the signature checked against the
    /// configured algorithms (never the one the token declares).
    pub async fn verify(&self, token: &str) -> Result<VerifiedClaims, AuthError> {
        let header = UnverifiedHeader::read(token).ok_or_else(|| {
            debug!("unreadable token header");
            AuthError::Malformed
        })?;

        let kid = header.kid.as_deref().ok_or_else(|| {
            debug!("token header has no kid");
            AuthError::Malformed
        })?;

        let key = self.keys.resolve(kid).await?;

        let accepted = header.alg.parse::<Algorithm>().is_ok_and(|alg| {
            alg == key.algorithm() && self.validation.algorithms.contains(&alg)
        });
        if !accepted {
            debug!(alg = %header.alg, kid, "token declares a rejected algorithm");
            return Err(AuthError::Unparsable);
        }

        let data = jsonwebtoken::decode::<TokenPayload>(token, key.decoding_key(), &self.validation)
            .map_err(|err| {
                debug!(kind = ?err.kind(), kid, "token rejected");
                AuthError::from(err)
            })?;

        VerifiedClaims::from_payload(data.claims)
    }
}
