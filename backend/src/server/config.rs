//! Application configuration object.
//!
//! Everything the server needs from the environment is read once at startup
//! into an [`AppConfig`] and injected from there; business logic never
//! performs ambient lookups, which keeps the codec and exchange testable
//! with fake secrets.

use std::net::SocketAddr;
use std::time::Duration;

use tracing::warn;
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::outbound::oauth::{OauthClientConfig, OauthClientSet};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_BASE_URL: &str = "http://localhost:8080";
const DEFAULT_OUTBOUND_TIMEOUT_SECS: u64 = 10;

/// Errors raised while assembling the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A required variable is absent.
    #[error("missing required environment variable {name}")]
    MissingVar {
        /// Variable name.
        name: &'static str,
    },
    /// A variable is present but unusable.
    #[error("invalid value for {name}: {reason}")]
    InvalidVar {
        /// Variable name.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

/// Startup configuration for the whole application.
pub struct AppConfig {
    /// Socket address the HTTP server binds to.
    pub bind_addr: SocketAddr,
    /// PostgreSQL connection string; absent means in-memory stores.
    pub database_url: Option<String>,
    /// Token-signing secret.
    pub signing_secret: Zeroizing<Vec<u8>>,
    /// Whether session cookies are marked `Secure`.
    pub cookie_secure: bool,
    /// Registered OAuth client credentials.
    pub oauth_clients: OauthClientSet,
    /// Unsplash API access key; blank means the fixture gateway.
    pub unsplash_access_key: String,
    /// Timeout applied to every outbound HTTP request.
    pub outbound_timeout: Duration,
}

impl AppConfig {
    /// Assemble the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Assemble the configuration from an arbitrary variable lookup.
    ///
    /// Tests inject a closure over a map instead of mutating the process
    /// environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind_addr = lookup("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_owned())
            .parse::<SocketAddr>()
            .map_err(|err| ConfigError::InvalidVar {
                name: "BIND_ADDR",
                reason: err.to_string(),
            })?;

        let signing_secret = match lookup("AUTH_SECRET") {
            Some(secret) if !secret.trim().is_empty() => Zeroizing::new(secret.into_bytes()),
            _ => {
                let allow_dev = lookup("AUTH_ALLOW_EPHEMERAL").as_deref() == Some("1");
                if cfg!(debug_assertions) || allow_dev {
                    warn!("AUTH_SECRET not set; using an ephemeral signing secret (dev only)");
                    ephemeral_secret()
                } else {
                    return Err(ConfigError::MissingVar { name: "AUTH_SECRET" });
                }
            }
        };

        let cookie_secure = lookup("SESSION_COOKIE_SECURE")
            .map(|value| value != "0")
            .unwrap_or(true);

        let outbound_timeout = match lookup("OUTBOUND_TIMEOUT_SECS") {
            None => Duration::from_secs(DEFAULT_OUTBOUND_TIMEOUT_SECS),
            Some(raw) => raw
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|err| ConfigError::InvalidVar {
                    name: "OUTBOUND_TIMEOUT_SECS",
                    reason: err.to_string(),
                })?,
        };

        let base_url = lookup("APP_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());
        let base_url = base_url.trim_end_matches('/').to_owned();

        let oauth_clients = OauthClientSet {
            google: provider_config(&lookup, &base_url, "google", "GOOGLE_CLIENT_ID", "GOOGLE_CLIENT_SECRET"),
            facebook: provider_config(&lookup, &base_url, "facebook", "FACEBOOK_APP_ID", "FACEBOOK_APP_SECRET"),
            github: provider_config(&lookup, &base_url, "github", "GITHUB_CLIENT_ID", "GITHUB_CLIENT_SECRET"),
        };

        Ok(Self {
            bind_addr,
            database_url: lookup("DATABASE_URL").filter(|url| !url.is_empty()),
            signing_secret,
            cookie_secure,
            oauth_clients,
            unsplash_access_key: lookup("UNSPLASH_ACCESS_KEY").unwrap_or_default(),
            outbound_timeout,
        })
    }
}

fn provider_config(
    lookup: impl Fn(&str) -> Option<String>,
    base_url: &str,
    provider: &str,
    id_var: &str,
    secret_var: &str,
) -> OauthClientConfig {
    let client_id = lookup(id_var).unwrap_or_default();
    if client_id.is_empty() {
        warn!(provider, "no client id configured; logins with this provider will fail upstream");
    }
    let redirect_var = format!("{}_REDIRECT_URI", id_var.trim_end_matches("_CLIENT_ID").trim_end_matches("_APP_ID"));
    OauthClientConfig {
        client_id,
        client_secret: lookup(secret_var).unwrap_or_default(),
        redirect_uri: lookup(&redirect_var)
            .unwrap_or_else(|| format!("{base_url}/auth/{provider}/callback")),
    }
}

fn ephemeral_secret() -> Zeroizing<Vec<u8>> {
    let mut secret = Vec::with_capacity(32);
    secret.extend_from_slice(Uuid::new_v4().as_bytes());
    secret.extend_from_slice(Uuid::new_v4().as_bytes());
    Zeroizing::new(secret)
}

#[cfg(test)]
mod tests {
    //! Regression coverage for configuration assembly.

    use super::*;
    use std::collections::HashMap;

    fn lookup_from<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_fill_in_for_absent_variables() {
        let config = AppConfig::from_lookup(lookup_from(&[("AUTH_SECRET", "s3cret")]))
            .expect("config builds");

        assert_eq!(config.bind_addr.port(), 8080);
        assert!(config.database_url.is_none());
        assert!(config.cookie_secure);
        assert_eq!(config.outbound_timeout, Duration::from_secs(10));
        assert_eq!(
            config.oauth_clients.google.redirect_uri,
            "http://localhost:8080/auth/google/callback"
        );
    }

    #[test]
    fn explicit_values_override_the_defaults() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("AUTH_SECRET", "s3cret"),
            ("BIND_ADDR", "127.0.0.1:9000"),
            ("SESSION_COOKIE_SECURE", "0"),
            ("OUTBOUND_TIMEOUT_SECS", "5"),
            ("APP_BASE_URL", "https://photos.example.com/"),
            ("GOOGLE_CLIENT_ID", "gid"),
            ("GOOGLE_CLIENT_SECRET", "gsecret"),
            ("DATABASE_URL", "postgres://localhost/photos"),
        ]))
        .expect("config builds");

        assert_eq!(config.bind_addr.port(), 9000);
        assert!(!config.cookie_secure);
        assert_eq!(config.outbound_timeout, Duration::from_secs(5));
        assert_eq!(config.oauth_clients.google.client_id, "gid");
        assert_eq!(
            config.oauth_clients.google.redirect_uri,
            "https://photos.example.com/auth/google/callback"
        );
        assert_eq!(
            config.database_url.as_deref(),
            Some("postgres://localhost/photos")
        );
    }

    #[test]
    fn explicit_redirect_uris_win_over_the_derived_ones() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("AUTH_SECRET", "s3cret"),
            ("GOOGLE_REDIRECT_URI", "https://other.example.com/cb"),
        ]))
        .expect("config builds");
        assert_eq!(
            config.oauth_clients.google.redirect_uri,
            "https://other.example.com/cb"
        );
    }

    #[test]
    fn malformed_bind_addresses_are_rejected() {
        let result = AppConfig::from_lookup(lookup_from(&[
            ("AUTH_SECRET", "s3cret"),
            ("BIND_ADDR", "not-an-address"),
        ]));
        assert!(matches!(
            result,
            Err(ConfigError::InvalidVar { name: "BIND_ADDR", .. })
        ));
    }

    #[test]
    fn missing_secret_falls_back_in_debug_builds() {
        // Debug builds (the test profile) always allow the ephemeral secret.
        let config = AppConfig::from_lookup(lookup_from(&[])).expect("config builds");
        assert_eq!(config.signing_secret.len(), 32);
    }
}
