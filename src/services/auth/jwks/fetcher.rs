//! Where key sets come from.
//!
//! The cache only talks to [`JwksFetcher`]; production uses
//! [`HttpJwksFetcher`], tests plug in an in-memory implementation.

use std::time::Duration;

use async_trait::async_trait;
use jsonwebtoken::jwk::{Jwk, JwkSet};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;
use url::Url;

#[derive(Debug, Error)]
pub enum JwksError {
    #[error("jwks request timed out")]
    Timeout,

    #[error("jwks request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("jwks endpoint returned status {0}")]
    Status(u16),

    #[error("jwks document is not valid json: {0}")]
    Document(#[from] serde_json::Error),
}

impl From<reqwest::Error> for JwksError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if let Some(status) = err.status() {
            Self::Status(status.as_u16())
        } else {
            Self::Transport(err)
        }
    }
}

#[async_trait]
pub trait JwksFetcher: Send + Sync {
    async fn fetch(&self) -> Result<JwkSet, JwksError>;
}

/// Fetches the identity provider's published key set over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpJwksFetcher {
    client: reqwest::Client,
    url: Url,
}

impl HttpJwksFetcher {
    pub fn new(url: Url, timeout: Duration) -> Result<Self, JwksError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, url })
    }
}

#[async_trait]
impl JwksFetcher for HttpJwksFetcher {
    async fn fetch(&self) -> Result<JwkSet, JwksError> {
        let body = self
            .client
            .get(self.url.clone())
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        parse_jwks(&body)
    }
}

#[derive(Deserialize)]
struct RawJwkSet {
    keys: Vec<serde_json::Value>,
}

/// Parse a JWKS document, dropping individual keys that do not parse.
pub fn parse_jwks(body: &[u8]) -> Result<JwkSet, JwksError> {
    let raw: RawJwkSet = serde_json::from_slice(body)?;

    let keys = raw
        .keys
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<Jwk>(value) {
            Ok(jwk) => Some(jwk),
            Err(err) => {
                debug!(error = %err, "skipping unparsable jwk");
                None
            }
        })
        .collect();

    Ok(JwkSet { keys })
}
