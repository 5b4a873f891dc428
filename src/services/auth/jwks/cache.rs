//! Process-wide cache of the identity provider's signing keys.
//!
//! Lifecycle:
//! - nothing is fetched until the first `resolve`
//! - the fetched set is kept for the process lifetime, or until `ttl` elapses
//!   when one is configured
//! - an unknown `kid` forces one refresh per `resolve` call (a cold-start fetch
//!   counts as that refresh), so rotated keys are picked up without a restart
//! - refreshes are serialized; callers that queued behind an attempt reuse its
//!   outcome (new set, stale set or failure) instead of fetching again
//! - if a refresh fails, the previous set stays in service and is not
//!   refetched again until `retry_backoff` has passed

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::services::auth::error::AuthError;
use crate::services::auth::jwks::{JwksError, JwksFetcher, KeySet, SigningKey};

#[derive(Debug, Clone, Copy)]
pub struct JwksCachePolicy {
    // Upper bound for a single fetch, independent of the fetcher's own timeout.
    pub fetch_timeout: Duration,
    // None = keep keys until a kid miss forces a refresh.
    pub ttl: Option<Duration>,
    // Minimum age of the cached set before a kid miss may refetch it.
    pub refresh_cooldown: Duration,
    // After a failed refresh, serve the stale set this long before retrying.
    // Not applied while the cache is cold.
    pub retry_backoff: Duration,
}

impl Default for JwksCachePolicy {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(5),
            ttl: None,
            refresh_cooldown: Duration::ZERO,
            retry_backoff: Duration::from_secs(5),
        }
    }
}

#[derive(Clone)]
struct CachedKeys {
    keys: Arc<KeySet>,
    fetched_at: Instant,
}

// Outcome of the most recent fetch attempt, guarded by the refresh lock.
#[derive(Debug, Default)]
struct Attempts {
    finished_at: Option<Instant>,
    failed_at: Option<Instant>,
}

pub struct JwksCache {
    fetcher: Arc<dyn JwksFetcher>,
    policy: JwksCachePolicy,
    current: RwLock<Option<CachedKeys>>,
    attempts: Mutex<Attempts>,
}

impl std::fmt::Debug for JwksCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwksCache")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl JwksCache {
    pub fn new(fetcher: Arc<dyn JwksFetcher>, policy: JwksCachePolicy) -> Self {
        Self {
            fetcher,
            policy,
            current: RwLock::new(None),
            attempts: Mutex::new(Attempts::default()),
        }
    }

    /// Resolve a key identifier to a signing key.
    pub async fn resolve(&self, kid: &str) -> Result<Arc<SigningKey>, AuthError> {
        let requested_at = Instant::now();

        let observed = match self.snapshot().await {
            Some(cached) if !self.is_expired(&cached) => {
                if let Some(key) = cached.keys.get(kid) {
                    return Ok(key);
                }
                Some(cached.fetched_at)
            }
            _ => None,
        };

        let keys = self
            .refresh(requested_at, observed)
            .await
            .ok_or(AuthError::KeyNotFound)?;

        keys.get(kid).ok_or_else(|| {
            debug!(kid, "no signing key matches kid");
            AuthError::KeyNotFound
        })
    }

    /// Drop the cached set; the next `resolve` fetches again.
    pub async fn invalidate(&self) {
        *self.current.write().await = None;
    }

    pub async fn key_count(&self) -> usize {
        self.snapshot().await.map_or(0, |cached| cached.keys.len())
    }

    async fn snapshot(&self) -> Option<CachedKeys> {
        self.current.read().await.clone()
    }

    fn is_expired(&self, cached: &CachedKeys) -> bool {
        self.policy
            .ttl
            .is_some_and(|ttl| cached.fetched_at.elapsed() >= ttl)
    }

    // `observed` is the fetch time of the set the caller already looked at, or
    // None when the caller found nothing usable. Returns None only when no
    // key set is available at all.
    async fn refresh(
        &self,
        requested_at: Instant,
        observed: Option<Instant>,
    ) -> Option<Arc<KeySet>> {
        let mut attempts = self.attempts.lock().await;

        let current = self.snapshot().await;

        // Someone else fetched (successfully or not) while this caller queued.
        if attempts.finished_at.is_some_and(|at| at >= requested_at) {
            debug!("reusing the outcome of a concurrent jwks refresh");
            return current.map(|cached| cached.keys);
        }

        if let Some(cached) = &current {
            let replaced_while_waiting = observed.is_none_or(|seen| cached.fetched_at > seen);
            if replaced_while_waiting && !self.is_expired(cached) {
                return Some(cached.keys.clone());
            }
            if observed.is_some() && cached.fetched_at.elapsed() < self.policy.refresh_cooldown {
                debug!("jwks refresh suppressed by cooldown");
                return Some(cached.keys.clone());
            }
            if attempts
                .failed_at
                .is_some_and(|at| at.elapsed() < self.policy.retry_backoff)
            {
                debug!("jwks refresh suppressed after a recent failure");
                return Some(cached.keys.clone());
            }
        }

        let outcome = self.fetch().await;
        let finished_at = Instant::now();
        attempts.finished_at = Some(finished_at);

        match outcome {
            Ok(keys) => {
                attempts.failed_at = None;
                let keys = Arc::new(keys);
                if keys.is_empty() {
                    warn!("jwks document contains no usable signing keys");
                }
                info!(
                    keys = keys.len(),
                    kids = ?keys.kids().collect::<Vec<_>>(),
                    "jwks refreshed"
                );
                *self.current.write().await = Some(CachedKeys {
                    keys: keys.clone(),
                    fetched_at: finished_at,
                });
                Some(keys)
            }
            Err(err) => {
                attempts.failed_at = Some(finished_at);
                match current {
                    Some(stale) => {
                        warn!(error = %err, "jwks refresh failed, keeping previous keys");
                        Some(stale.keys)
                    }
                    None => {
                        warn!(error = %err, "jwks fetch failed and no keys are cached");
                        None
                    }
                }
            }
        }
    }

    async fn fetch(&self) -> Result<KeySet, JwksError> {
        let jwks = tokio::time::timeout(self.policy.fetch_timeout, self.fetcher.fetch())
            .await
            .map_err(|_| JwksError::Timeout)??;

        Ok(KeySet::from_jwk_set(&jwks))
    }
}
