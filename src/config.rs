/*
 * Responsibility
 * - Load settings from the environment (.env via dotenvy)
 * - Validate them (missing or invalid values fail startup)
 * - Derive issuer / JWKS URL / cache policy from the raw values
 */
use std::net::SocketAddr;
use std::time::Duration;

use jsonwebtoken::Algorithm;
use thiserror::Error;
use url::Url;

use crate::services::auth::jwks::JwksCachePolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(value: Option<&str>) -> Self {
        match value
            .unwrap_or("development")
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing configuration: {0}")]
    Missing(&'static str),
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,

    pub app_env: AppEnv,
    pub cors_allowed_origins: Vec<String>,

    // Bare domain, e.g. `tenant.auth0.com`.
    pub auth_domain: String,
    pub auth_audience: String,
    pub algorithms: Vec<Algorithm>,
    pub leeway_seconds: u64,

    pub jwks_url: Url,
    pub jwks_timeout: Duration,
    pub jwks_cache_ttl: Option<Duration>,
    pub jwks_refresh_cooldown: Duration,
    pub jwks_retry_backoff: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Empty values count as unset.
    pub fn from_vars<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| var(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let port: u16 = match var("PORT") {
            Some(port) => port.parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => 8080,
        };
        let addr = SocketAddr::from(([0, 0, 0, 0], port));

        let app_env = AppEnv::parse(var("APP_ENV").as_deref());

        let cors_allowed_origins = var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        let auth_domain = var("AUTH_DOMAIN")
            .ok_or(ConfigError::Missing("AUTH_DOMAIN"))?
            .trim_end_matches('/')
            .to_string();
        if auth_domain.contains("://") {
            return Err(ConfigError::Invalid("AUTH_DOMAIN"));
        }

        let auth_audience = var("AUTH_AUDIENCE").ok_or(ConfigError::Missing("AUTH_AUDIENCE"))?;

        let algorithms = parse_algorithms(var("AUTH_ALGORITHMS").as_deref())?;

        let leeway_seconds = parse_seconds(
            var("ACCESS_TOKEN_LEEWAY_SECONDS"),
            "ACCESS_TOKEN_LEEWAY_SECONDS",
        )?
        .unwrap_or(0);

        let jwks_url = match var("JWKS_URL") {
            Some(url) => Url::parse(&url).map_err(|_| ConfigError::Invalid("JWKS_URL"))?,
            None => Url::parse(&format!("https://{auth_domain}/.well-known/jwks.json"))
                .map_err(|_| ConfigError::Invalid("AUTH_DOMAIN"))?,
        };

        let jwks_timeout = parse_seconds(var("JWKS_TIMEOUT_SECONDS"), "JWKS_TIMEOUT_SECONDS")?
            .unwrap_or(5);
        if jwks_timeout == 0 {
            return Err(ConfigError::Invalid("JWKS_TIMEOUT_SECONDS"));
        }

        let jwks_cache_ttl =
            parse_seconds(var("JWKS_CACHE_TTL_SECONDS"), "JWKS_CACHE_TTL_SECONDS")?
                .map(Duration::from_secs);

        let jwks_refresh_cooldown = parse_seconds(
            var("JWKS_REFRESH_COOLDOWN_SECONDS"),
            "JWKS_REFRESH_COOLDOWN_SECONDS",
        )?
        .unwrap_or(0);

        let jwks_retry_backoff = parse_seconds(
            var("JWKS_RETRY_BACKOFF_SECONDS"),
            "JWKS_RETRY_BACKOFF_SECONDS",
        )?
        .unwrap_or(5);

        Ok(Self {
            addr,
            app_env,
            cors_allowed_origins,
            auth_domain,
            auth_audience,
            algorithms,
            leeway_seconds,
            jwks_url,
            jwks_timeout: Duration::from_secs(jwks_timeout),
            jwks_cache_ttl,
            jwks_refresh_cooldown: Duration::from_secs(jwks_refresh_cooldown),
            jwks_retry_backoff: Duration::from_secs(jwks_retry_backoff),
        })
    }

    /// Expected `iss` claim. Auth0 issues with a trailing slash.
    pub fn issuer(&self) -> String {
        format!("https://{}/", self.auth_domain)
    }

    pub fn jwks_cache_policy(&self) -> JwksCachePolicy {
        JwksCachePolicy {
            fetch_timeout: self.jwks_timeout,
            ttl: self.jwks_cache_ttl,
            refresh_cooldown: self.jwks_refresh_cooldown,
            retry_backoff: self.jwks_retry_backoff,
        }
    }
}

fn parse_algorithms(value: Option<&str>) -> Result<Vec<Algorithm>, ConfigError> {
    let Some(value) = value else {
        return Ok(vec![Algorithm::RS256]);
    };

    let algorithms = value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| match s {
            "RS256" => Ok(Algorithm::RS256),
            _ => Err(ConfigError::Invalid("AUTH_ALGORITHMS")),
        })
        .collect::<Result<Vec<_>, _>>()?;

    if algorithms.is_empty() {
        return Err(ConfigError::Invalid("AUTH_ALGORITHMS"));
    }
    Ok(algorithms)
}

fn parse_seconds(value: Option<String>, key: &'static str) -> Result<Option<u64>, ConfigError> {
    value
        .map(|v| v.parse::<u64>().map_err(|_| ConfigError::Invalid(key)))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_vars(|key| vars.get(key).cloned())
    }

    const REQUIRED: [(&str, &str); 2] = [
        ("AUTH_DOMAIN", "casting-agency.test.auth0.com"),
        ("AUTH_AUDIENCE", "casting"),
    ];

    #[test]
    fn defaults() {
        let config = config_from(&REQUIRED).expect("valid config");

        assert_eq!(config.addr.port(), 8080);
        assert_eq!(config.app_env, AppEnv::Development);
        assert!(config.cors_allowed_origins.is_empty());
        assert_eq!(config.issuer(), "https://casting-agency.test.auth0.com/");
        assert_eq!(
            config.jwks_url.as_str(),
            "https://casting-agency.test.auth0.com/.well-known/jwks.json"
        );
        assert_eq!(config.algorithms, vec![Algorithm::RS256]);
        assert_eq!(config.leeway_seconds, 0);

        let policy = config.jwks_cache_policy();
        assert_eq!(policy.fetch_timeout, Duration::from_secs(5));
        assert_eq!(policy.ttl, None);
        assert_eq!(policy.refresh_cooldown, Duration::ZERO);
        assert_eq!(policy.retry_backoff, Duration::from_secs(5));
    }

    #[test]
    fn required_keys() {
        assert_eq!(
            config_from(&[("AUTH_AUDIENCE", "casting")]).unwrap_err(),
            ConfigError::Missing("AUTH_DOMAIN")
        );
        assert_eq!(
            config_from(&[("AUTH_DOMAIN", "idp.example.com"), ("AUTH_AUDIENCE", "  ")])
                .unwrap_err(),
            ConfigError::Missing("AUTH_AUDIENCE")
        );
    }

    #[test]
    fn only_rs256_is_accepted() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("AUTH_ALGORITHMS", "RS256, HS256"));
        assert_eq!(
            config_from(&vars).unwrap_err(),
            ConfigError::Invalid("AUTH_ALGORITHMS")
        );

        let mut vars = REQUIRED.to_vec();
        vars.push(("AUTH_ALGORITHMS", " , "));
        assert_eq!(
            config_from(&vars).unwrap_err(),
            ConfigError::Invalid("AUTH_ALGORITHMS")
        );
    }

    #[test]
    fn overrides() {
        let mut vars = REQUIRED.to_vec();
        vars.extend([
            ("PORT", "3000"),
            ("APP_ENV", "Production"),
            ("CORS_ALLOWED_ORIGINS", "https://a.example, ,https://b.example"),
            ("JWKS_URL", "http://127.0.0.1:9999/jwks.json"),
            ("JWKS_TIMEOUT_SECONDS", "2"),
            ("JWKS_CACHE_TTL_SECONDS", "600"),
            ("JWKS_REFRESH_COOLDOWN_SECONDS", "30"),
            ("JWKS_RETRY_BACKOFF_SECONDS", "15"),
            ("ACCESS_TOKEN_LEEWAY_SECONDS", "10"),
        ]);
        let config = config_from(&vars).expect("valid config");

        assert_eq!(config.addr.port(), 3000);
        assert!(config.app_env.is_production());
        assert_eq!(
            config.cors_allowed_origins,
            vec!["https://a.example", "https://b.example"]
        );
        assert_eq!(config.jwks_url.as_str(), "http://127.0.0.1:9999/jwks.json");
        assert_eq!(config.leeway_seconds, 10);

        let policy = config.jwks_cache_policy();
        assert_eq!(policy.fetch_timeout, Duration::from_secs(2));
        assert_eq!(policy.ttl, Some(Duration::from_secs(600)));
        assert_eq!(policy.refresh_cooldown, Duration::from_secs(30));
        assert_eq!(policy.retry_backoff, Duration::from_secs(15));
    }

    #[test]
    fn invalid_values_fail_startup() {
        for (key, value) in [
            ("PORT", "http"),
            ("JWKS_URL", "not a url"),
            ("JWKS_TIMEOUT_SECONDS", "0"),
            ("JWKS_CACHE_TTL_SECONDS", "-1"),
            ("ACCESS_TOKEN_LEEWAY_SECONDS", "soon"),
        ] {
            let mut vars = REQUIRED.to_vec();
            vars.push((key, value));
            assert_eq!(config_from(&vars).unwrap_err(), ConfigError::Invalid(key));
        }

        assert_eq!(
            config_from(&[
                ("AUTH_DOMAIN", "https://idp.example.com"),
                ("AUTH_AUDIENCE", "casting")
            ])
            .unwrap_err(),
            ConfigError::Invalid("AUTH_DOMAIN")
        );
    }
}
