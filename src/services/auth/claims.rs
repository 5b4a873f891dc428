use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::services::auth::error::AuthError;

/// `aud` may be a single string or an array of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Audience {
    Single(String),
    Multiple(Vec<String>),
}

impl Audience {
    pub fn contains(&self, audience: &str) -> bool {
        match self {
            Self::Single(aud) => aud == audience,
            Self::Multiple(auds) => auds.iter().any(|aud| aud == audience),
        }
    }
}

/// Token payload as it comes off the wire. Only the verifier deserializes
/// into this; everything else sees [`VerifiedClaims`].
#[derive(Debug, Deserialize)]
pub(crate) struct TokenPayload {
    // Optional here so that a missing `iss`/`aud` reaches claim validation
    // instead of failing deserialization.
    #[serde(default)]
    iss: Option<String>,
    #[serde(default)]
    aud: Option<Audience>,
    exp: u64,
    #[serde(default)]
    sub: Option<String>,
    #[serde(default)]
    iat: Option<u64>,
    #[serde(default)]
    nbf: Option<u64>,
    #[serde(default)]
    azp: Option<String>,
    #[serde(default)]
    scope: Option<String>,
    #[serde(default)]
    permissions: Option<Vec<String>>,
    #[serde(flatten)]
    extra: BTreeMap<String, Value>,
}

/// Signature- and claim-checked token payload.
///
/// There is no public constructor and no `Deserialize` impl: the only way to
/// obtain one is `TokenVerifier::verify`. Serializing it reproduces the
/// payload the identity provider signed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerifiedClaims {
    iss: String,
    aud: Audience,
    exp: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    sub: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    iat: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    nbf: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    azp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    scope: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    permissions: Option<Vec<String>>,
    #[serde(flatten)]
    extra: BTreeMap<String, Value>,
}

impl VerifiedClaims {
    pub(crate) fn from_payload(payload: TokenPayload) -> Result<Self, AuthError> {
        let (Some(iss), Some(aud)) = (payload.iss, payload.aud) else {
            return Err(AuthError::IncorrectClaims);
        };

        Ok(Self {
            iss,
            aud,
            exp: payload.exp,
            sub: payload.sub,
            iat: payload.iat,
            nbf: payload.nbf,
            azp: payload.azp,
            scope: payload.scope,
            permissions: payload.permissions,
            extra: payload.extra,
        })
    }

    pub fn issuer(&self) -> &str {
        &self.iss
    }

    pub fn audience(&self) -> &Audience {
        &self.aud
    }

    pub fn subject(&self) -> Option<&str> {
        self.sub.as_deref()
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        i64::try_from(self.exp)
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
    }

    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    /// `None` when the token carries no `permissions` claim at all.
    pub fn permissions(&self) -> Option<&[String]> {
        self.permissions.as_deref()
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions
            .as_deref()
            .is_some_and(|granted| granted.iter().any(|p| p == permission))
    }

    /// Any other claim from the payload (e.g. provider-specific namespaced claims).
    pub fn claim(&self, name: &str) -> Option<&Value> {
        self.extra.get(name)
    }
}
