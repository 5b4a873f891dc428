use std::{collections::HashMap, fmt, sync::Arc};

use jsonwebtoken::{
    Algorithm, DecodingKey,
    jwk::{AlgorithmParameters, JwkSet, KeyAlgorithm},
};
use tracing::debug;

/// A public signing key published by the identity provider.
///
/// `Debug` prints the kid and algorithm only.
#[derive(Clone)]
pub struct SigningKey {
    kid: String,
    algorithm: Algorithm,
    decoding_key: DecodingKey,
}

impl SigningKey {
    pub fn kid(&self) -> &str {
        &self.kid
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn decoding_key(&self) -> &DecodingKey {
        &self.decoding_key
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("kid", &self.kid)
            .field("algorithm", &self.algorithm)
            .finish()
    }
}

/// `kid -> SigningKey`, built from one JWKS document.
#[derive(Debug, Clone, Default)]
pub struct KeySet {
    keys: HashMap<String, Arc<SigningKey>>,
}

impl KeySet {
    /// Keep only RSA keys usable for RS256. Anything else in the document is
    /// skipped rather than rejected, so one odd key cannot take the whole set
    /// down.
    pub fn from_jwk_set(jwks: &JwkSet) -> Self {
        let mut keys = HashMap::with_capacity(jwks.keys.len());

        for jwk in &jwks.keys {
            let Some(kid) = jwk.common.key_id.as_deref() else {
                debug!("skipping jwk without kid");
                continue;
            };

            if let Some(alg) = &jwk.common.key_algorithm
                && *alg != KeyAlgorithm::RS256
            {
                debug!(kid, ?alg, "skipping jwk with unsupported alg");
                continue;
            }

            let AlgorithmParameters::RSA(rsa) = &jwk.algorithm else {
                debug!(kid, "skipping non-RSA jwk");
                continue;
            };

            let decoding_key = match DecodingKey::from_rsa_components(&rsa.n, &rsa.e) {
                Ok(key) => key,
                Err(err) => {
                    debug!(kid, error = %err, "skipping jwk with unusable modulus/exponent");
                    continue;
                }
            };

            keys.insert(
                kid.to_string(),
                Arc::new(SigningKey {
                    kid: kid.to_string(),
                    algorithm: Algorithm::RS256,
                    decoding_key,
                }),
            );
        }

        Self { keys }
    }

    pub fn get(&self, kid: &str) -> Option<Arc<SigningKey>> {
        self.keys.get(kid).cloned()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn kids(&self) -> impl Iterator<Item = &str> {
        self.keys.keys().map(String::as_str)
    }
}
